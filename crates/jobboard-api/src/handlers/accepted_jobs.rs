//! Accepted job handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::Deserialize;
use serde_json::{Map, Value};
use tracing::debug;

use jobboard_models::{DeleteAck, InsertAck};
use jobboard_store::document_to_json;

use crate::auth::AuthUser;
use crate::error::{ApiError, ApiResult};
use crate::handlers::jobs::body_document;
use crate::state::AppState;

#[derive(Debug, Default, Deserialize)]
pub struct AcceptedJobQuery {
    pub email: Option<String>,
}

/// List accepted jobs recorded for an email.
pub async fn list_accepted_jobs(
    State(state): State<AppState>,
    user: AuthUser,
    Query(query): Query<AcceptedJobQuery>,
) -> ApiResult<Json<Vec<Value>>> {
    debug!(uid = %user.uid, email = ?query.email, "Listing accepted jobs");

    let records = state
        .accepted_jobs
        .list_by_email(query.email)
        .await
        .map_err(ApiError::upstream("Failed to fetch accepted jobs"))?;

    Ok(Json(records.into_iter().map(document_to_json).collect()))
}

pub async fn create_accepted_job(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<InsertAck>> {
    let on_error = ApiError::upstream("Failed to accept job");
    let record = match body_document(&body) {
        Ok(record) => record,
        Err(e) => return Err(on_error(e)),
    };

    let ack = state.accepted_jobs.create(record).await.map_err(on_error)?;
    Ok(Json(ack))
}

pub async fn delete_accepted_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let ack = state
        .accepted_jobs
        .delete(&id)
        .await
        .map_err(ApiError::rejected("Failed to delete accepted job"))?;

    Ok(Json(ack))
}
