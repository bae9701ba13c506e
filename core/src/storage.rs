use std::path::Path;

use crate::error::StorageError;
use crate::record::StoredRow;
use crate::table::TableName;

/// A durable engine holding tables of [`StoredRow`]s keyed by id.
///
/// Implementations own their connection and must serialize access to it: a [`Store`](crate::Store)
/// is shared across threads and calls these methods concurrently. Operations against a table
/// that does not exist fail with [`StorageError::TableNotFound`]; every operation after
/// [`close`](StorageEngine::close) fails with [`StorageError::Closed`].
pub trait StorageEngine: Send + Sync {
    /// Create the table if it does not exist
    fn create_table(&self, table: &TableName) -> Result<(), StorageError>;

    fn table_exists(&self, table: &TableName) -> Result<bool, StorageError>;

    /// Delete every row, keeping the table
    fn clear_table(&self, table: &TableName) -> Result<(), StorageError>;

    fn drop_table(&self, table: &TableName) -> Result<(), StorageError>;

    /// Insert the row, replacing any existing row with the same id
    fn put_row(&self, table: &TableName, row: &StoredRow) -> Result<(), StorageError>;

    fn get_row(&self, table: &TableName, id: &str) -> Result<Option<StoredRow>, StorageError>;

    /// Every row in the table, in no particular order
    fn all_rows(&self, table: &TableName) -> Result<Vec<StoredRow>, StorageError>;

    fn count_rows(&self, table: &TableName) -> Result<u64, StorageError>;

    // The delete operations return the number of rows removed.
    fn delete_row(&self, table: &TableName, id: &str) -> Result<usize, StorageError>;

    /// Delete all listed ids in a single statement
    fn delete_rows(&self, table: &TableName, ids: &[String]) -> Result<usize, StorageError>;

    /// Delete rows whose id starts with `prefix`, compared literally
    fn delete_rows_with_prefix(&self, table: &TableName, prefix: &str) -> Result<usize, StorageError>;

    /// Release the underlying connection. Closing twice is not an error.
    fn close(&self) -> Result<(), StorageError>;

    fn is_closed(&self) -> bool;

    /// Location of the database file, if there is one
    fn path(&self) -> Option<&Path> { None }
}
