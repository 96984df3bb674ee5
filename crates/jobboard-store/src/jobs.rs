//! Job repository.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use tracing::info;

use jobboard_models::{CategoryCount, DeleteAck, InsertAck, JobFilter, JobPage, PageWindow, UpdateAck};

use crate::client::{collections, MongoStore};
use crate::error::{StoreError, StoreResult};
use crate::filters::{category_counts, category_stats_pipeline, id_filter, job_filter, job_sort};
use crate::metrics::observe;
use crate::results::{delete_ack, insert_ack, update_ack};

/// Result of a job listing.
#[derive(Debug, Clone)]
pub enum JobListing {
    /// Every matching job.
    All(Vec<Document>),
    /// One page plus the total number of matches.
    Page(JobPage<Document>),
}

/// Access to the jobs collection.
#[async_trait]
pub trait JobRepository: Send + Sync {
    /// List jobs matching `filter`, newest `postedDate` first.
    async fn list(&self, filter: &JobFilter, window: Option<PageWindow>) -> StoreResult<JobListing>;

    /// Insert a job document as supplied.
    async fn create(&self, job: Document) -> StoreResult<InsertAck>;

    /// Fetch one job.
    async fn get(&self, id: &str) -> StoreResult<Option<Document>>;

    /// Overwrite only the supplied fields.
    async fn update(&self, id: &str, fields: Document) -> StoreResult<UpdateAck>;

    /// Remove one job. Deleting an absent id succeeds with a zero count.
    async fn delete(&self, id: &str) -> StoreResult<DeleteAck>;

    /// Job counts per category, largest first.
    async fn count_by_category(&self) -> StoreResult<Vec<CategoryCount>>;
}

/// MongoDB-backed job repository.
#[derive(Clone)]
pub struct MongoJobRepository {
    collection: Collection<Document>,
}

impl MongoJobRepository {
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.collection(collections::JOBS),
        }
    }
}

#[async_trait]
impl JobRepository for MongoJobRepository {
    async fn list(&self, filter: &JobFilter, window: Option<PageWindow>) -> StoreResult<JobListing> {
        let query = job_filter(filter);

        match window {
            Some(window) => {
                observe(collections::JOBS, "find_page", async {
                    let total = self.collection.count_documents(query.clone()).await?;
                    let data: Vec<Document> = self
                        .collection
                        .find(query)
                        .sort(job_sort())
                        .skip(window.skip())
                        .limit(i64::try_from(window.limit).unwrap_or(i64::MAX))
                        .await?
                        .try_collect()
                        .await?;
                    Ok::<_, StoreError>(JobListing::Page(JobPage { data, total }))
                })
                .await
            }
            None => {
                observe(collections::JOBS, "find", async {
                    let data: Vec<Document> = self
                        .collection
                        .find(query)
                        .sort(job_sort())
                        .await?
                        .try_collect()
                        .await?;
                    Ok::<_, StoreError>(JobListing::All(data))
                })
                .await
            }
        }
    }

    async fn create(&self, job: Document) -> StoreResult<InsertAck> {
        let ack = observe(collections::JOBS, "insert_one", async {
            Ok::<_, StoreError>(insert_ack(self.collection.insert_one(job).await?))
        })
        .await?;
        info!(job_id = %ack.inserted_id, "Created job");
        Ok(ack)
    }

    async fn get(&self, id: &str) -> StoreResult<Option<Document>> {
        let filter = id_filter(id)?;
        observe(collections::JOBS, "find_one", async {
            Ok::<_, StoreError>(self.collection.find_one(filter).await?)
        })
        .await
    }

    async fn update(&self, id: &str, fields: Document) -> StoreResult<UpdateAck> {
        let filter = id_filter(id)?;
        let ack = observe(collections::JOBS, "update_one", async {
            let update = doc! { "$set": fields };
            Ok::<_, StoreError>(update_ack(self.collection.update_one(filter, update).await?))
        })
        .await?;
        info!(job_id = %id, matched = ack.matched_count, "Updated job");
        Ok(ack)
    }

    async fn delete(&self, id: &str) -> StoreResult<DeleteAck> {
        let filter = id_filter(id)?;
        let ack = observe(collections::JOBS, "delete_one", async {
            Ok::<_, StoreError>(delete_ack(self.collection.delete_one(filter).await?))
        })
        .await?;
        info!(job_id = %id, deleted = ack.deleted_count, "Deleted job");
        Ok(ack)
    }

    async fn count_by_category(&self) -> StoreResult<Vec<CategoryCount>> {
        let groups: Vec<Document> = observe(collections::JOBS, "aggregate", async {
            let cursor = self.collection.aggregate(category_stats_pipeline()).await?;
            Ok::<_, StoreError>(cursor.try_collect::<Vec<Document>>().await?)
        })
        .await?;
        category_counts(groups)
    }
}
