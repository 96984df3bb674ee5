//! Accepted-job repository.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, Document};
use mongodb::Collection;
use tracing::info;

use jobboard_models::{DeleteAck, InsertAck};

use crate::client::{collections, MongoStore};
use crate::error::{StoreError, StoreResult};
use crate::filters::id_filter;
use crate::metrics::observe;
use crate::results::{delete_ack, insert_ack};

/// Access to the acceptedJob collection.
#[async_trait]
pub trait AcceptedJobRepository: Send + Sync {
    /// Records whose `email` equals the given value. `None` matches records
    /// with a null or missing email.
    async fn list_by_email(&self, email: Option<String>) -> StoreResult<Vec<Document>>;

    /// Insert an acceptance record as supplied. Duplicates are allowed.
    async fn create(&self, record: Document) -> StoreResult<InsertAck>;

    /// Remove one record.
    async fn delete(&self, id: &str) -> StoreResult<DeleteAck>;
}

/// MongoDB-backed accepted-job repository.
#[derive(Clone)]
pub struct MongoAcceptedJobRepository {
    collection: Collection<Document>,
}

impl MongoAcceptedJobRepository {
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.collection(collections::ACCEPTED_JOBS),
        }
    }
}

#[async_trait]
impl AcceptedJobRepository for MongoAcceptedJobRepository {
    async fn list_by_email(&self, email: Option<String>) -> StoreResult<Vec<Document>> {
        let filter = doc! { "email": email };
        observe(collections::ACCEPTED_JOBS, "find", async {
            let cursor = self.collection.find(filter).await?;
            Ok::<_, StoreError>(cursor.try_collect::<Vec<Document>>().await?)
        })
        .await
    }

    async fn create(&self, record: Document) -> StoreResult<InsertAck> {
        let ack = observe(collections::ACCEPTED_JOBS, "insert_one", async {
            Ok::<_, StoreError>(insert_ack(self.collection.insert_one(record).await?))
        })
        .await?;
        info!(accepted_id = %ack.inserted_id, "Accepted job");
        Ok(ack)
    }

    async fn delete(&self, id: &str) -> StoreResult<DeleteAck> {
        let filter = id_filter(id)?;
        let ack = observe(collections::ACCEPTED_JOBS, "delete_one", async {
            Ok::<_, StoreError>(delete_ack(self.collection.delete_one(filter).await?))
        })
        .await?;
        info!(accepted_id = %id, deleted = ack.deleted_count, "Deleted accepted job");
        Ok(ack)
    }
}
