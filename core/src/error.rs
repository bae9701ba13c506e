//! Error types for Memento stores and storage engines.
//!
//! Callers of the plain [`Store`](crate::Store) operations never see these: failures are logged
//! and replaced by a sentinel (`None`, `false`, `0`). The `try_*` operations return them directly.

use thiserror::Error;

type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Errors reported by a [`StorageEngine`](crate::storage::StorageEngine)
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("table not found: {0}")]
    TableNotFound(String),

    #[error("storage engine is closed")]
    Closed,

    #[error("storage backend error: {0}")]
    Backend(BoxError),
}

impl StorageError {
    pub fn backend(err: impl std::error::Error + Send + Sync + 'static) -> Self { StorageError::Backend(Box::new(err)) }
}

/// Error type for store operations.
///
/// Returned from the `try_*` forms of every [`Store`](crate::Store) operation.
#[derive(Debug, Error)]
pub enum StoreError {
    /// Empty or containing whitespace
    #[error("invalid table name: {0:?}")]
    InvalidTableName(String),

    #[error("table not found: {0}")]
    TableNotFound(String),

    /// The value has no JSON representation; nothing was written
    #[error("value for {id:?} is not JSON encodable: {reason}")]
    Encode { id: String, reason: String },

    /// A stored row could not be decoded back into a record
    #[error("stored row {id:?} in {table} is corrupt: {reason}")]
    Decode { table: String, id: String, reason: String },

    #[error("record {id:?} not found in {table}")]
    NotFound { table: String, id: String },

    #[error("store is closed")]
    Closed,

    #[error("storage engine error: {0}")]
    Engine(BoxError),
}

impl From<StorageError> for StoreError {
    fn from(err: StorageError) -> Self {
        match err {
            StorageError::TableNotFound(table) => StoreError::TableNotFound(table),
            StorageError::Closed => StoreError::Closed,
            StorageError::Backend(e) => StoreError::Engine(e),
        }
    }
}

impl StoreError {
    /// Whether this failure comes from the caller's input or store state rather than the engine.
    ///
    /// Used to pick the log level when the error is downgraded to a sentinel.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            StoreError::InvalidTableName(_)
                | StoreError::TableNotFound(_)
                | StoreError::Encode { .. }
                | StoreError::NotFound { .. }
                | StoreError::Closed
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_storage_error_conversion() {
        assert!(matches!(StoreError::from(StorageError::TableNotFound("t".into())), StoreError::TableNotFound(t) if t == "t"));
        assert!(matches!(StoreError::from(StorageError::Closed), StoreError::Closed));

        let io = std::io::Error::other("disk on fire");
        let err = StoreError::from(StorageError::backend(io));
        assert!(!err.is_caller_error());
        assert!(err.to_string().contains("disk on fire"));
    }
}
