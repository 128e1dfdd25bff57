//! Error types for allotment
//!
//! One error enum for the whole library. The normalizer and the allocator
//! never produce errors; everything here comes from the record store,
//! record decoding, session misuse or configuration.

use thiserror::Error;

/// Main error type for allotment
#[derive(Error, Debug)]
pub enum FinanceError {
    /// Edit session state machine errors
    #[error("Invalid session transition from {from:?} via {event:?}: {reason}")]
    InvalidTransition {
        from: String,
        event: String,
        reason: String,
    },

    /// Reading an entity table from the record store failed
    #[error("Failed to read {entity} from record store: {reason}")]
    StoreRead { entity: String, reason: String },

    /// A single record write was rejected by the record store
    #[error("Failed to write {entity} record {id}: {reason}")]
    StoreWrite {
        entity: String,
        id: String,
        reason: String,
    },

    /// A commit stopped at the first failed write
    ///
    /// Items listed in `written` were already persisted and are not rolled back.
    #[error("Commit failed on budget item {failed_id} after {} successful write(s): {reason}", written.len())]
    CommitFailed {
        failed_id: String,
        written: Vec<String>,
        reason: String,
    },

    /// A record could not be decoded into an entity
    #[error("Malformed {entity} record: {reason}")]
    MalformedRecord { entity: String, reason: String },

    /// No budget plan matched the request
    #[error("Budget plan not found: {0}")]
    PlanNotFound(String),

    /// Working-set operation attempted outside an edit
    #[error("Budget plan {0} is not being edited")]
    NotEditing(String),

    /// The id does not belong to the plan being edited
    #[error("Unknown budget item: {0}")]
    UnknownItem(String),

    /// Time unit string not recognised
    #[error("Invalid time unit '{0}' (expected year, month, day, hour, minute or second)")]
    InvalidTimeUnit(String),

    /// HTTP client errors
    #[error("HTTP request failed: {0}")]
    HttpError(#[from] reqwest::Error),

    /// Serialization errors
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    /// I/O errors
    #[error("I/O error: {0}")]
    IoError(#[from] std::io::Error),

    /// Generic errors with context
    #[error("{0}")]
    Generic(String),
}

/// Result type alias for allotment operations
pub type Result<T> = std::result::Result<T, FinanceError>;

/// Convert anyhow errors to FinanceError
impl From<anyhow::Error> for FinanceError {
    fn from(err: anyhow::Error) -> Self {
        FinanceError::Generic(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_commit_failed_display() {
        let err = FinanceError::CommitFailed {
            failed_id: "bi_3".to_string(),
            written: vec!["bi_1".to_string(), "bi_2".to_string()],
            reason: "quota exceeded".to_string(),
        };
        let msg = err.to_string();
        assert!(msg.contains("bi_3"));
        assert!(msg.contains("2 successful"));
        assert!(msg.contains("quota exceeded"));
    }

    #[test]
    fn test_invalid_transition_error() {
        let err = FinanceError::InvalidTransition {
            from: "Idle".to_string(),
            event: "Save".to_string(),
            reason: "No edit in progress".to_string(),
        };
        assert!(err.to_string().contains("Idle"));
        assert!(err.to_string().contains("Save"));
    }

    #[test]
    fn test_anyhow_conversion() {
        let err: FinanceError = anyhow::anyhow!("boom").into();
        assert_eq!(err.to_string(), "boom");
    }
}
