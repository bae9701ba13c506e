//! SQLite storage engine for Memento
//!
//! Each Memento table is a SQLite table with three text columns:
//!
//! - `id`: primary key
//! - `json`: the JSON-encoded value
//! - `createdTime`: RFC 3339 UTC time of the last write
//!
//! The engine owns a single connection. Statements are serialized through a mutex, so one
//! engine can be shared freely between threads.
//!
//! # Example
//!
//! ```rust,no_run
//! use memento_core::Store;
//! use memento_storage_sqlite::SqliteStorageEngine;
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! // Open a file-based database
//! let store = Store::new(SqliteStorageEngine::open("myapp.sqlite")?);
//!
//! // Or use an in-memory database for testing
//! let store = Store::new(SqliteStorageEngine::open_in_memory()?);
//! store.create_table("AlarmTable");
//! store.put_string("Hello", "greeting", "AlarmTable");
//! # Ok(())
//! # }
//! ```

mod connection;
mod engine;
mod error;
pub mod sql_builder;

pub use connection::{SqliteConfig, SqliteConnection, DEFAULT_BUSY_TIMEOUT};
pub use engine::{default_path, SqliteStorageEngine, DEFAULT_DB_NAME, DEFAULT_FOLDER};
pub use error::SqliteError;
