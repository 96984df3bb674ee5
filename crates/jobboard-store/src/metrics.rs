//! Store metrics collection.
//!
//! Provides standardized metrics for monitoring MongoDB operations:
//! - Operation counters by collection, operation and outcome
//! - Latency histograms

use std::future::Future;
use std::time::{Duration, Instant};

use metrics::{counter, histogram};
use tracing::{debug_span, Instrument};

use crate::error::StoreResult;

/// Metric name constants for consistency.
pub mod names {
    /// Total store operations by collection, operation and outcome.
    pub const OPERATIONS_TOTAL: &str = "mongo_operations_total";

    /// Operation latency in seconds by collection and operation.
    pub const OPERATION_DURATION_SECONDS: &str = "mongo_operation_duration_seconds";
}

/// Record metrics for a completed store operation.
pub fn record_operation(collection: &str, operation: &str, ok: bool, elapsed: Duration) {
    counter!(
        names::OPERATIONS_TOTAL,
        "collection" => collection.to_string(),
        "operation" => operation.to_string(),
        "outcome" => if ok { "ok" } else { "error" }
    )
    .increment(1);

    histogram!(
        names::OPERATION_DURATION_SECONDS,
        "collection" => collection.to_string(),
        "operation" => operation.to_string()
    )
    .record(elapsed.as_secs_f64());
}

/// Run one store operation inside a span and record its outcome.
pub(crate) async fn observe<T, F>(collection: &'static str, operation: &'static str, fut: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    let start = Instant::now();
    let result = fut
        .instrument(debug_span!("mongo", collection, operation))
        .await;
    record_operation(collection, operation, result.is_ok(), start.elapsed());
    result
}
