//! Store error types.

use thiserror::Error;

/// Result type for store operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// Errors that can occur during store operations.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("Invalid document id: {0}")]
    InvalidId(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Driver error: {0}")]
    Driver(#[from] mongodb::error::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] mongodb::bson::ser::Error),

    #[error("Unexpected document shape: {0}")]
    InvalidDocument(String),
}

impl StoreError {
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    pub fn invalid_document(msg: impl Into<String>) -> Self {
        Self::InvalidDocument(msg.into())
    }

    /// True if the caller supplied an id that is not a valid ObjectId.
    pub fn is_invalid_id(&self) -> bool {
        matches!(self, StoreError::InvalidId(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_id_predicate() {
        assert!(StoreError::InvalidId("nope".into()).is_invalid_id());
        assert!(!StoreError::config("missing uri").is_invalid_id());
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            StoreError::InvalidId("123".into()).to_string(),
            "Invalid document id: 123"
        );
        assert_eq!(
            StoreError::config("MONGO_URI must be set").to_string(),
            "Configuration error: MONGO_URI must be set"
        );
    }
}
