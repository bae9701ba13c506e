//! Core of Memento, a table-oriented key-value store for JSON values.
//!
//! A [`Store`] maps string ids to JSON values inside named tables, on top of any
//! [`StorageEngine`]. Each record carries the time of its most recent write.

pub mod error;
pub mod record;
pub mod storage;
pub mod store;
pub mod table;
pub mod value;

pub use error::{StorageError, StoreError};
pub use record::{Record, StoredRow};
pub use storage::StorageEngine;
pub use store::Store;
pub use table::TableName;
pub use value::Value;
