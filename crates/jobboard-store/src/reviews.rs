//! Review repository with owner-scoped writes.
//!
//! Updates and deletes match on both the review id and the owner's email in a
//! single operation, so a non-owner can never modify a review even if it
//! changes hands concurrently. When nothing matches, one extra lookup tells a
//! missing review apart from one owned by someone else.

use async_trait::async_trait;
use futures_util::TryStreamExt;
use mongodb::bson::{doc, to_document, Document};
use mongodb::Collection;
use tracing::{info, warn};

use jobboard_models::{DeleteAck, InsertAck, Review, ReviewChanges, ReviewFilter, UpdateAck};

use crate::client::{collections, MongoStore};
use crate::error::{StoreError, StoreResult};
use crate::filters::{id_filter, owned_filter, review_filter, review_sort, review_update};
use crate::metrics::observe;
use crate::results::{delete_ack, insert_ack, update_ack};

/// Outcome of a write restricted to the record owner.
#[derive(Debug, Clone, PartialEq)]
pub enum OwnedWrite<T> {
    /// The caller owns the record and the write went through.
    Applied(T),
    /// No record has this id.
    NotFound,
    /// The record exists but belongs to another identity. Nothing was written.
    NotOwner,
}

/// Access to the reviews collection.
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    /// Reviews matching `filter`, newest first.
    async fn list(&self, filter: &ReviewFilter) -> StoreResult<Vec<Document>>;

    /// Insert a new review.
    async fn create(&self, review: &Review) -> StoreResult<InsertAck>;

    /// Apply `changes` if `owner` owns the review.
    async fn update_owned(
        &self,
        id: &str,
        owner: &str,
        changes: &ReviewChanges,
    ) -> StoreResult<OwnedWrite<UpdateAck>>;

    /// Delete the review if `owner` owns it.
    async fn delete_owned(&self, id: &str, owner: &str) -> StoreResult<OwnedWrite<DeleteAck>>;
}

/// MongoDB-backed review repository.
#[derive(Clone)]
pub struct MongoReviewRepository {
    collection: Collection<Document>,
}

impl MongoReviewRepository {
    pub fn new(store: &MongoStore) -> Self {
        Self {
            collection: store.collection(collections::REVIEWS),
        }
    }

    /// Classify an owner-scoped write that matched nothing.
    async fn classify_miss<T>(&self, id: &str) -> StoreResult<OwnedWrite<T>> {
        let filter = id_filter(id)?;
        let existing = observe(collections::REVIEWS, "find_one", async {
            Ok::<_, StoreError>(
                self.collection
                    .find_one(filter)
                    .projection(doc! { "_id": 1 })
                    .await?,
            )
        })
        .await?;

        match existing {
            Some(_) => {
                warn!(review_id = %id, "Review write rejected: caller is not the owner");
                Ok(OwnedWrite::NotOwner)
            }
            None => Ok(OwnedWrite::NotFound),
        }
    }
}

#[async_trait]
impl ReviewRepository for MongoReviewRepository {
    async fn list(&self, filter: &ReviewFilter) -> StoreResult<Vec<Document>> {
        let query = review_filter(filter);
        observe(collections::REVIEWS, "find", async {
            let cursor = self.collection.find(query).sort(review_sort()).await?;
            Ok::<_, StoreError>(cursor.try_collect::<Vec<Document>>().await?)
        })
        .await
    }

    async fn create(&self, review: &Review) -> StoreResult<InsertAck> {
        let document = to_document(review)?;
        let ack = observe(collections::REVIEWS, "insert_one", async {
            Ok::<_, StoreError>(insert_ack(self.collection.insert_one(document).await?))
        })
        .await?;
        info!(review_id = %ack.inserted_id, user = %review.user_email, "Created review");
        Ok(ack)
    }

    async fn update_owned(
        &self,
        id: &str,
        owner: &str,
        changes: &ReviewChanges,
    ) -> StoreResult<OwnedWrite<UpdateAck>> {
        let filter = owned_filter(id, owner)?;
        let result = observe(collections::REVIEWS, "update_one", async {
            Ok::<_, StoreError>(self.collection.update_one(filter, review_update(changes)).await?)
        })
        .await?;

        if result.matched_count == 0 {
            return self.classify_miss(id).await;
        }

        info!(review_id = %id, user = %owner, "Updated review");
        Ok(OwnedWrite::Applied(update_ack(result)))
    }

    async fn delete_owned(&self, id: &str, owner: &str) -> StoreResult<OwnedWrite<DeleteAck>> {
        let filter = owned_filter(id, owner)?;
        let result = observe(collections::REVIEWS, "delete_one", async {
            Ok::<_, StoreError>(self.collection.delete_one(filter).await?)
        })
        .await?;

        if result.deleted_count == 0 {
            return self.classify_miss(id).await;
        }

        info!(review_id = %id, user = %owner, "Deleted review");
        Ok(OwnedWrite::Applied(delete_ack(result)))
    }
}
