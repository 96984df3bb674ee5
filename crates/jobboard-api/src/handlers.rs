//! Request handlers.

pub mod accepted_jobs;
pub mod health;
pub mod jobs;
pub mod reviews;
pub mod stats;

pub use accepted_jobs::*;
pub use health::*;
pub use jobs::*;
pub use reviews::*;
pub use stats::*;
