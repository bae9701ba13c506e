//! Error types for SQLite storage engine

use memento_core::StorageError;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum SqliteError {
    #[error("SQLite error: {0}")]
    Rusqlite(#[from] rusqlite::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Connection is closed")]
    Closed,

    #[error("Connection lock poisoned")]
    Poisoned,

    #[error("Home directory is not available")]
    HomeDirUnavailable,
}

impl SqliteError {
    /// The missing table, if SQLite rejected a statement with "no such table"
    pub fn missing_table(&self) -> Option<&str> {
        match self {
            SqliteError::Rusqlite(rusqlite::Error::SqliteFailure(_, Some(message))) => message.strip_prefix("no such table: "),
            _ => None,
        }
    }
}

impl From<SqliteError> for StorageError {
    fn from(err: SqliteError) -> Self {
        if let Some(table) = err.missing_table() {
            return StorageError::TableNotFound(table.to_owned());
        }
        match err {
            SqliteError::Closed => StorageError::Closed,
            e => StorageError::backend(e),
        }
    }
}
