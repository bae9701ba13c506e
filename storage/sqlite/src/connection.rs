//! Connection handling for rusqlite

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::Connection;
use tracing::debug;

use crate::error::SqliteError;

/// How long a statement waits on a locked database file before failing
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// Configuration for SQLite connections
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum SqliteConfig {
    /// File-based database
    File(PathBuf),
    /// In-memory database (for testing)
    Memory,
}

impl SqliteConfig {
    pub fn file(path: impl Into<PathBuf>) -> Self { Self::File(path.into()) }

    pub fn path(&self) -> Option<&Path> {
        match self {
            SqliteConfig::File(path) => Some(path),
            SqliteConfig::Memory => None,
        }
    }

    pub(crate) fn connect(&self) -> Result<Connection, SqliteError> {
        let conn = match self {
            SqliteConfig::File(path) => {
                if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                    std::fs::create_dir_all(parent)?;
                }
                Connection::open(path)?
            }
            SqliteConfig::Memory => Connection::open_in_memory()?,
        };

        conn.busy_timeout(DEFAULT_BUSY_TIMEOUT)?;
        // journal_mode returns a row, so it can't go through execute_batch
        if matches!(self, SqliteConfig::File(_)) {
            let _mode: String = conn.query_row("PRAGMA journal_mode=WAL", [], |row| row.get(0))?;
        }
        conn.execute_batch(
            "PRAGMA synchronous=NORMAL;
             PRAGMA cache_size=-16000;
             PRAGMA temp_store=MEMORY;",
        )?;

        debug!("Opened SQLite connection: {:?}", self);
        Ok(conn)
    }
}

/// A single SQLite connection behind a mutex.
///
/// Every statement runs inside [`with_connection`](Self::with_connection), so at most one statement
/// touches the connection at a time. After [`close`](Self::close) the slot is empty and every call
/// fails with [`SqliteError::Closed`].
pub struct SqliteConnection {
    inner: Mutex<Option<Connection>>,
}

impl SqliteConnection {
    pub fn new(conn: Connection) -> Self { Self { inner: Mutex::new(Some(conn)) } }

    pub fn open(config: &SqliteConfig) -> Result<Self, SqliteError> { config.connect().map(Self::new) }

    /// Execute a function with exclusive access to the connection
    pub fn with_connection<F, T>(&self, f: F) -> Result<T, SqliteError>
    where F: FnOnce(&Connection) -> Result<T, SqliteError> {
        let guard = self.inner.lock().map_err(|_| SqliteError::Poisoned)?;
        match guard.as_ref() {
            Some(conn) => f(conn),
            None => Err(SqliteError::Closed),
        }
    }

    /// Close the connection. Closing an already closed connection does nothing.
    pub fn close(&self) -> Result<(), SqliteError> {
        let mut guard = self.inner.lock().map_err(|_| SqliteError::Poisoned)?;
        match guard.take() {
            Some(conn) => conn.close().map_err(|(_, e)| SqliteError::Rusqlite(e)),
            None => Ok(()),
        }
    }

    pub fn is_closed(&self) -> bool {
        match self.inner.lock() {
            Ok(guard) => guard.is_none(),
            // A poisoned connection is unusable
            Err(_) => true,
        }
    }
}
