//! Shared data models for the job board backend.
//!
//! This crate provides Serde-serializable types for:
//! - Job listing filters and pagination windows
//! - Reviews and their create/update payloads
//! - Per-category job statistics
//! - Write acknowledgments returned to clients

pub mod job;
pub mod review;
pub mod stats;
pub mod utils;
pub mod write;

// Re-export common types
pub use job::{JobFilter, JobPage, PageWindow, DEFAULT_PAGE_LIMIT};
pub use review::{NewReview, Review, ReviewChanges, ReviewFilter, ReviewUpdate, DEFAULT_RATING};
pub use stats::{CategoryCount, UNCATEGORIZED};
pub use utils::{coerce_number, parse_int_prefix, timestamp_now};
pub use write::{DeleteAck, InsertAck, UpdateAck};
