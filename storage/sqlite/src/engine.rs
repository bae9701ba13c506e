//! SQLite storage engine implementation

use std::path::{Path, PathBuf};

use memento_core::{StorageEngine, StorageError, StoredRow, TableName};
use rusqlite::{params_from_iter, OptionalExtension, Row};
use tracing::debug;

use crate::connection::{SqliteConfig, SqliteConnection};
use crate::error::SqliteError;
use crate::sql_builder::SqlBuilder;

/// Folder under the home directory used when no path is given
pub const DEFAULT_FOLDER: &str = ".memento";

/// File name of the default database
pub const DEFAULT_DB_NAME: &str = "database.sqlite";

/// SQLite storage engine
pub struct SqliteStorageEngine {
    conn: SqliteConnection,
    config: SqliteConfig,
}

impl SqliteStorageEngine {
    /// Open a database described by `config`
    pub fn with_config(config: SqliteConfig) -> Result<Self, SqliteError> {
        let conn = SqliteConnection::open(&config)?;
        Ok(Self { conn, config })
    }

    /// Open a file-based SQLite database, creating it and any missing parent directories
    pub fn open(path: impl AsRef<Path>) -> Result<Self, SqliteError> { Self::with_config(SqliteConfig::file(path.as_ref())) }

    /// Open an in-memory SQLite database (for testing)
    pub fn open_in_memory() -> Result<Self, SqliteError> { Self::with_config(SqliteConfig::Memory) }

    /// Open the database file `name` inside `folder_name` under the home directory
    pub fn with_homedir_folder(folder_name: &str, name: &str) -> Result<Self, SqliteError> {
        let dir = dirs::home_dir().ok_or(SqliteError::HomeDirUnavailable)?.join(folder_name);
        Self::open(dir.join(name))
    }

    /// Open `~/.memento/database.sqlite`
    pub fn new() -> Result<Self, SqliteError> { Self::with_homedir_folder(DEFAULT_FOLDER, DEFAULT_DB_NAME) }

    /// Open a named database file next to the default one
    pub fn named(name: &str) -> Result<Self, SqliteError> { Self::with_homedir_folder(DEFAULT_FOLDER, name) }

    pub fn config(&self) -> &SqliteConfig { &self.config }

    /// Get a reference to the connection (for testing/diagnostics)
    pub fn connection(&self) -> &SqliteConnection { &self.conn }

    fn execute(&self, statement: SqlBuilder) -> Result<usize, SqliteError> {
        let (sql, params) = statement.build();
        debug!("execute: {}", sql);
        self.conn.with_connection(|c| Ok(c.execute(&sql, params_from_iter(params.iter()))?))
    }

    fn query_count(&self, statement: SqlBuilder) -> Result<i64, SqliteError> {
        let (sql, params) = statement.build();
        debug!("query: {}", sql);
        self.conn.with_connection(|c| Ok(c.query_row(&sql, params_from_iter(params.iter()), |row| row.get(0))?))
    }
}

fn read_row(row: &Row<'_>) -> rusqlite::Result<StoredRow> {
    Ok(StoredRow { id: row.get("id")?, json: row.get("json")?, created_time: row.get("createdTime")? })
}

impl StorageEngine for SqliteStorageEngine {
    fn create_table(&self, table: &TableName) -> Result<(), StorageError> {
        self.execute(SqlBuilder::create_table(table))?;
        Ok(())
    }

    fn table_exists(&self, table: &TableName) -> Result<bool, StorageError> { Ok(self.query_count(SqlBuilder::table_exists(table))? > 0) }

    fn clear_table(&self, table: &TableName) -> Result<(), StorageError> {
        let removed = self.execute(SqlBuilder::clear_table(table))?;
        debug!("Cleared {} rows from {}", removed, table);
        Ok(())
    }

    fn drop_table(&self, table: &TableName) -> Result<(), StorageError> {
        self.execute(SqlBuilder::drop_table(table))?;
        Ok(())
    }

    fn put_row(&self, table: &TableName, row: &StoredRow) -> Result<(), StorageError> {
        self.execute(SqlBuilder::upsert(table, row))?;
        Ok(())
    }

    fn get_row(&self, table: &TableName, id: &str) -> Result<Option<StoredRow>, StorageError> {
        let (sql, params) = SqlBuilder::select_row(table, id).build();
        debug!("query: {}", sql);
        let row = self.conn.with_connection(|c| Ok(c.query_row(&sql, params_from_iter(params.iter()), read_row).optional()?))?;
        Ok(row)
    }

    fn all_rows(&self, table: &TableName) -> Result<Vec<StoredRow>, StorageError> {
        let (sql, params) = SqlBuilder::select_all(table).build();
        debug!("query: {}", sql);
        let rows = self.conn.with_connection(|c| {
            let mut stmt = c.prepare(&sql)?;
            let rows = stmt.query_map(params_from_iter(params.iter()), read_row)?.collect::<rusqlite::Result<Vec<_>>>()?;
            Ok(rows)
        })?;
        Ok(rows)
    }

    fn count_rows(&self, table: &TableName) -> Result<u64, StorageError> {
        let count = self.query_count(SqlBuilder::count(table))?;
        Ok(count.max(0) as u64)
    }

    fn delete_row(&self, table: &TableName, id: &str) -> Result<usize, StorageError> { Ok(self.execute(SqlBuilder::delete_row(table, id))?) }

    fn delete_rows(&self, table: &TableName, ids: &[String]) -> Result<usize, StorageError> {
        if ids.is_empty() {
            return Ok(0);
        }
        let ids_json = serde_json::to_string(ids).map_err(SqliteError::from)?;
        Ok(self.execute(SqlBuilder::delete_rows(table, &ids_json))?)
    }

    fn delete_rows_with_prefix(&self, table: &TableName, prefix: &str) -> Result<usize, StorageError> {
        Ok(self.execute(SqlBuilder::delete_rows_with_prefix(table, prefix))?)
    }

    fn close(&self) -> Result<(), StorageError> {
        self.conn.close()?;
        debug!("Closed SQLite connection: {:?}", self.config);
        Ok(())
    }

    fn is_closed(&self) -> bool { self.conn.is_closed() }

    fn path(&self) -> Option<&Path> { self.config.path() }
}

/// Where [`SqliteStorageEngine::new`] keeps its database, if there is a home directory
pub fn default_path() -> Option<PathBuf> { dirs::home_dir().map(|home| home.join(DEFAULT_FOLDER).join(DEFAULT_DB_NAME)) }
