//! API routes.

use std::sync::Arc;

use axum::middleware;
use axum::routing::{delete, get, put};
use axum::Router;
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::limit::RequestBodyLimitLayer;
use tracing::info;

use crate::handlers::{
    create_accepted_job, create_job, create_review, delete_accepted_job, delete_job,
    delete_review, get_job, health, jobs_by_category, list_accepted_jobs, list_jobs,
    list_reviews, ready, root, update_job, update_review,
};
use crate::metrics::metrics_middleware;
use crate::middleware::{
    cors_layer, rate_limit_middleware, request_id, request_logging, security_headers,
    IpRateLimiter,
};
use crate::state::AppState;

/// Create the API router.
pub fn create_router(state: AppState, metrics_handle: Option<PrometheusHandle>) -> Router {
    let job_routes = Router::new()
        .route("/jobs", get(list_jobs).post(create_job))
        .route("/jobs/:id", get(get_job).patch(update_job).delete(delete_job));

    let accepted_job_routes = Router::new()
        .route("/acceptedJob", get(list_accepted_jobs).post(create_accepted_job))
        .route("/acceptedJob/:id", delete(delete_accepted_job));

    let review_routes = Router::new()
        .route("/reviews", get(list_reviews).post(create_review))
        .route("/reviews/:id", put(update_review).delete(delete_review));

    let stats_routes = Router::new().route("/stats/jobs-by-category", get(jobs_by_category));

    let mut api_routes = Router::new()
        .merge(job_routes)
        .merge(accepted_job_routes)
        .merge(review_routes)
        .merge(stats_routes);

    if let Some(limiter) =
        IpRateLimiter::new(state.config.rate_limit_rps, state.config.rate_limit_burst)
    {
        info!(
            rps = state.config.rate_limit_rps,
            burst = state.config.rate_limit_burst,
            "Per-IP rate limiting enabled"
        );
        api_routes = api_routes.layer(middleware::from_fn_with_state(
            Arc::new(limiter),
            rate_limit_middleware,
        ));
    }

    let health_routes = Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/healthz", get(health))
        .route("/ready", get(ready));

    // Metrics endpoint (if enabled)
    let metrics_routes = if let Some(handle) = metrics_handle {
        Router::new().route("/metrics", get(move || async move { handle.render() }))
    } else {
        Router::new()
    };

    Router::new()
        .merge(api_routes)
        .merge(health_routes)
        .merge(metrics_routes)
        .layer(RequestBodyLimitLayer::new(state.config.max_body_size))
        .layer(middleware::from_fn(metrics_middleware))
        .layer(middleware::from_fn(security_headers))
        .layer(middleware::from_fn(request_logging))
        .layer(middleware::from_fn(request_id))
        .layer(cors_layer(&state.config.cors_origins))
        .with_state(state)
}
