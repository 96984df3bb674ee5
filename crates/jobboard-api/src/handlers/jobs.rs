//! Job listing handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use jobboard_models::{DeleteAck, InsertAck, JobFilter, JobPage, PageWindow, UpdateAck};
use jobboard_store::bson::{self, Document};
use jobboard_store::{document_to_json, JobListing, StoreResult};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Query parameters for `GET /jobs`.
///
/// Kept as raw strings so malformed numbers fall back to defaults instead of
/// rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct ListJobsQuery {
    pub page: Option<String>,
    pub limit: Option<String>,
    pub search: Option<String>,
    pub category: Option<String>,
}

/// Either every matching job or one page of them.
#[derive(Debug, Serialize)]
#[serde(untagged)]
pub enum JobListResponse {
    All(Vec<Value>),
    Page(JobPage<Value>),
}

impl From<JobListing> for JobListResponse {
    fn from(listing: JobListing) -> Self {
        match listing {
            JobListing::All(jobs) => Self::All(jobs.into_iter().map(document_to_json).collect()),
            JobListing::Page(page) => Self::Page(JobPage {
                data: page.data.into_iter().map(document_to_json).collect(),
                total: page.total,
            }),
        }
    }
}

/// Convert a JSON object body into a BSON document, field for field.
pub(crate) fn body_document(body: &Map<String, Value>) -> StoreResult<Document> {
    Ok(bson::to_document(body)?)
}

/// List jobs, optionally filtered and paginated.
pub async fn list_jobs(
    State(state): State<AppState>,
    Query(query): Query<ListJobsQuery>,
) -> ApiResult<Json<JobListResponse>> {
    let filter = JobFilter::new(query.category, query.search);
    let window = PageWindow::from_query(query.page.as_deref(), query.limit.as_deref());

    let listing = state
        .jobs
        .list(&filter, window)
        .await
        .map_err(ApiError::upstream("Failed to fetch jobs"))?;

    Ok(Json(listing.into()))
}

/// Create a job from the request body as given.
pub async fn create_job(
    State(state): State<AppState>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<InsertAck>> {
    let on_error = ApiError::upstream("Failed to create job");
    let job = match body_document(&body) {
        Ok(job) => job,
        Err(e) => return Err(on_error(e)),
    };

    let ack = state.jobs.create(job).await.map_err(on_error)?;
    Ok(Json(ack))
}

/// Get a job by id. Responds with `null` when no job has the id.
pub async fn get_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<Value>> {
    let job = state
        .jobs
        .get(&id)
        .await
        .map_err(ApiError::rejected("Invalid job id"))?;

    Ok(Json(job.map(document_to_json).unwrap_or(Value::Null)))
}

/// Set the supplied fields on a job.
pub async fn update_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<Map<String, Value>>,
) -> ApiResult<Json<UpdateAck>> {
    let on_error = ApiError::rejected("Failed to update job");
    let fields = match body_document(&body) {
        Ok(fields) => fields,
        Err(e) => return Err(on_error(e)),
    };

    let ack = state.jobs.update(&id, fields).await.map_err(on_error)?;
    Ok(Json(ack))
}

/// Delete a job. Deleting an unknown id succeeds with `deletedCount: 0`.
pub async fn delete_job(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> ApiResult<Json<DeleteAck>> {
    let ack = state
        .jobs
        .delete(&id)
        .await
        .map_err(ApiError::rejected("Failed to delete job"))?;

    Ok(Json(ack))
}
