//! Statistics handlers.

use axum::extract::State;
use axum::Json;

use jobboard_models::CategoryCount;

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Number of jobs per category, most common first.
pub async fn jobs_by_category(State(state): State<AppState>) -> ApiResult<Json<Vec<CategoryCount>>> {
    let counts = state
        .jobs
        .count_by_category()
        .await
        .map_err(ApiError::upstream("Failed to fetch stats"))?;

    Ok(Json(counts))
}
