//! Job statistics.

use serde::{Deserialize, Serialize};

/// Label used for jobs without a category.
pub const UNCATEGORIZED: &str = "Uncategorized";

/// Number of jobs in one category.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryCount {
    pub category: String,
    pub count: u64,
}

impl CategoryCount {
    /// Create a count, labelling a missing or empty category as [`UNCATEGORIZED`].
    pub fn new(category: Option<String>, count: u64) -> Self {
        Self {
            category: category
                .filter(|c| !c.is_empty())
                .unwrap_or_else(|| UNCATEGORIZED.to_string()),
            count,
        }
    }
}
