use std::str::FromStr;

use memento_core::Store;
use memento_storage_sqlite::SqliteStorageEngine;
use tracing::Level;

pub type SqliteStore = Store<SqliteStorageEngine>;

// Initialize tracing for tests
#[ctor::ctor]
fn init_tracing() {
    // if LOG_LEVEL env var is set, use it
    if let Ok(level) = std::env::var("LOG_LEVEL") {
        tracing_subscriber::fmt().with_max_level(Level::from_str(&level).unwrap()).with_test_writer().init();
    } else {
        tracing_subscriber::fmt().with_max_level(Level::INFO).with_test_writer().init();
    }
}

/// An in-memory store with `table` already created
#[allow(unused)]
pub fn store_with_table(table: &str) -> anyhow::Result<SqliteStore> {
    let store = Store::new(SqliteStorageEngine::open_in_memory()?);
    anyhow::ensure!(store.create_table(table), "failed to create {}", table);
    Ok(store)
}

/// Ids of every record in the table, sorted
#[allow(unused)]
pub fn sorted_ids(store: &SqliteStore, table: &str) -> Vec<String> {
    let mut ids: Vec<String> = store.get_all_items(table).unwrap_or_default().into_iter().map(|r| r.id).collect();
    ids.sort();
    ids
}
