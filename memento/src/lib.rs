//! # Memento
//!
//! Memento is a lightweight key-value store for JSON values, persisted in SQLite.
//!
//! ## Core Concepts
//!
//! - **Table**: a named group of records. Must be created before it is written to.
//! - **Record**: a JSON value stored under a string id, with the time of its last write
//! - **Scalars**: strings and numbers are stored wrapped in a one-element array
//!
//! Operations never fail loudly. Invalid table names, missing tables, absent ids and storage
//! errors are logged through `tracing` and turned into `None`, `false` or `0`. Every operation
//! also has a `try_*` form returning a [`StoreError`] for callers that want to know why.
//!
//! ## Example
//!
//! ```rust
//! use memento::json;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let store = memento::open_in_memory()?;
//! store.create_table("AlarmTable");
//!
//! store.put_object(&json!({"title": "Morning Alarm", "time": "07:30", "enabled": true}), "alarm_001", "AlarmTable");
//! store.put_string("Hello Memento", "greeting", "AlarmTable");
//! store.put_number(42.0, "answer", "AlarmTable");
//!
//! assert_eq!(store.get_string("greeting", "AlarmTable").as_deref(), Some("Hello Memento"));
//! assert_eq!(store.get_object("answer", "AlarmTable"), Some(json!([42.0])));
//! assert_eq!(store.get_count("AlarmTable"), 3);
//!
//! store.delete_records_by_prefix("alarm_", "AlarmTable");
//! store.close();
//! # Ok(())
//! # }
//! ```

use std::path::Path;

use tracing::info;

pub use memento_core as core;
pub use memento_storage_sqlite as sqlite;

// Re-export commonly used types
pub use memento_core::{Record, StorageEngine, Store, StoreError, TableName, Value};
pub use memento_storage_sqlite::{SqliteConfig, SqliteError, SqliteStorageEngine};
pub use serde_json::json;

/// A store backed by SQLite
pub type SqliteStore = Store<SqliteStorageEngine>;

/// Open (or create) a store in the SQLite database file at `path`
pub fn open(path: impl AsRef<Path>) -> Result<SqliteStore, SqliteError> { with_engine(SqliteStorageEngine::open(path)?) }

/// Open a store that lives only as long as the returned value
pub fn open_in_memory() -> Result<SqliteStore, SqliteError> { Ok(Store::new(SqliteStorageEngine::open_in_memory()?)) }

/// Open the store at `~/.memento/database.sqlite`
pub fn open_default() -> Result<SqliteStore, SqliteError> { with_engine(SqliteStorageEngine::new()?) }

/// Open the store named `name` inside `~/.memento`
pub fn open_named(name: &str) -> Result<SqliteStore, SqliteError> { with_engine(SqliteStorageEngine::named(name)?) }

fn with_engine(engine: SqliteStorageEngine) -> Result<SqliteStore, SqliteError> {
    if let Some(path) = engine.config().path() {
        info!("Opened store at {}", path.display());
    }
    Ok(Store::new(engine))
}
