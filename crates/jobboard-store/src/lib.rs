//! MongoDB document store.
//!
//! This crate provides:
//! - A shared client configured for the Stable API
//! - Repository traits for jobs, accepted jobs and reviews, with MongoDB implementations
//! - Filter and pipeline builders for listing, search and statistics
//! - BSON to JSON rendering for API responses

pub mod accepted_jobs;
pub mod client;
pub mod error;
pub mod filters;
pub mod jobs;
pub mod json;
pub mod metrics;
pub mod results;
pub mod reviews;

pub use accepted_jobs::{AcceptedJobRepository, MongoAcceptedJobRepository};
pub use client::{MongoStore, StoreConfig, StoreHealth};
pub use error::{StoreError, StoreResult};
pub use jobs::{JobListing, JobRepository, MongoJobRepository};
pub use json::{bson_to_json, document_to_json};
pub use reviews::{MongoReviewRepository, OwnedWrite, ReviewRepository};

pub use mongodb::bson;
