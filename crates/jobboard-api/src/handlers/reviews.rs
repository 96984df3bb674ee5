//! Review handlers.
//!
//! Creating, updating and deleting a review requires a verified token whose
//! email matches the review owner.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Serialize;
use serde_json::Value;
use tracing::warn;

use jobboard_models::{DeleteAck, NewReview, ReviewChanges, ReviewFilter, ReviewUpdate, UpdateAck};
use jobboard_store::{document_to_json, OwnedWrite};

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CreatedReview {
    pub inserted_id: String,
}

/// Verified email of the caller, required for owner-scoped writes.
fn owner_email(user: &AuthUser) -> ApiResult<&str> {
    user.email.as_deref().filter(|e| !e.is_empty()).ok_or_else(|| {
        warn!(uid = %user.uid, "Token carries no email");
        ApiError::forbidden("Forbidden")
    })
}

fn owned_result<T>(outcome: OwnedWrite<T>) -> ApiResult<Json<T>> {
    match outcome {
        OwnedWrite::Applied(ack) => Ok(Json(ack)),
        OwnedWrite::NotFound => Err(ApiError::not_found("Review not found")),
        OwnedWrite::NotOwner => Err(ApiError::forbidden("Forbidden")),
    }
}

/// List reviews, newest first.
pub async fn list_reviews(
    State(state): State<AppState>,
    Query(filter): Query<ReviewFilter>,
) -> ApiResult<Json<Vec<Value>>> {
    let reviews = state
        .reviews
        .list(&filter)
        .await
        .map_err(ApiError::upstream("Failed to fetch reviews"))?;

    Ok(Json(reviews.into_iter().map(document_to_json).collect()))
}

/// Submit a review as the authenticated user.
pub async fn create_review(
    State(state): State<AppState>,
    user: AuthUser,
    Json(body): Json<NewReview>,
) -> ApiResult<Json<CreatedReview>> {
    let owner = match (body.user_email.as_deref(), user.email.as_deref()) {
        (Some(claimed), Some(verified)) if !claimed.is_empty() && claimed == verified => {
            claimed.to_string()
        }
        _ => {
            warn!(uid = %user.uid, claimed = ?body.user_email, "Review author does not match token");
            return Err(ApiError::forbidden("user mismatch"));
        }
    };

    let review = body.into_review(owner, [user.name.as_deref(), user.email.as_deref()]);
    let ack = state
        .reviews
        .create(&review)
        .await
        .map_err(ApiError::upstream("Failed to submit review"))?;

    Ok(Json(CreatedReview {
        inserted_id: ack.inserted_id,
    }))
}

/// Update text and rating of a review owned by the caller.
pub async fn update_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
    Json(body): Json<ReviewUpdate>,
) -> ApiResult<Json<UpdateAck>> {
    let owner = owner_email(&user)?;
    let changes = ReviewChanges::from(body);

    let outcome = state
        .reviews
        .update_owned(&id, owner, &changes)
        .await
        .map_err(ApiError::rejected("Failed to update review"))?;

    owned_result(outcome)
}

/// Delete a review owned by the caller.
pub async fn delete_review(
    State(state): State<AppState>,
    user: AuthUser,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let owner = owner_email(&user)?;

    let outcome = state
        .reviews
        .delete_owned(&id, owner)
        .await
        .map_err(ApiError::rejected("Failed to delete review"))?;

    owned_result(outcome)
}
