//! Axum HTTP API server.
//!
//! This crate provides:
//! - CRUD routes for jobs, accepted jobs and reviews
//! - Firebase ID token verification for protected routes
//! - Rate limiting and security headers
//! - Prometheus metrics

pub mod auth;
pub mod config;
pub mod error;
pub mod handlers;
pub mod metrics;
pub mod middleware;
pub mod routes;
pub mod state;

pub use auth::{AuthUser, FirebaseConfig, JwksCache, TokenVerifier, VerifyError};
pub use config::ApiConfig;
pub use error::{ApiError, ApiResult};
pub use routes::create_router;
pub use state::AppState;
