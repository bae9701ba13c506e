//! The table-oriented key-value store.
//!
//! Every operation comes in two forms. The `try_*` form validates the table name, encodes or
//! decodes the payload and talks to the engine, returning a [`StoreError`] on any failure. The
//! plain form calls it and, on failure, logs the error through `tracing` and returns a sentinel
//! (`None`, `false` or `0`) instead. Nothing is ever partially written.

use std::path::Path;

use serde::de::DeserializeOwned;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, error, warn};

use crate::error::StoreError;
use crate::record::{Record, StoredRow};
use crate::storage::StorageEngine;
use crate::table::TableName;
use crate::value;

/// A key-value store of JSON values, grouped into tables and addressed by string id
pub struct Store<E: StorageEngine> {
    engine: E,
}

impl<E: StorageEngine> Store<E> {
    pub fn new(engine: E) -> Self { Self { engine } }

    pub fn engine(&self) -> &E { &self.engine }

    /// Location of the database file, `None` for in-memory databases
    pub fn path(&self) -> Option<&Path> { self.engine.path() }

    pub fn is_closed(&self) -> bool { self.engine.is_closed() }

    /// Release the storage connection. Every later operation is a no-op.
    pub fn close(&self) {
        match self.engine.close() {
            Ok(()) => debug!("store closed"),
            Err(e) => error!(error = %e, "failed to close storage engine"),
        }
    }

    /// Validate the name before touching storage, then refuse if closed
    fn table(&self, name: &str) -> Result<TableName, StoreError> {
        let table = TableName::new(name)?;
        if self.engine.is_closed() {
            return Err(StoreError::Closed);
        }
        Ok(table)
    }

    // Table lifecycle

    pub fn try_create_table(&self, table: &str) -> Result<(), StoreError> {
        let table = self.table(table)?;
        self.engine.create_table(&table)?;
        debug!(table = %table, "table created");
        Ok(())
    }

    /// Ensure the table exists. Returns false if it could not be created.
    pub fn create_table(&self, table: &str) -> bool { soften("create_table", table, self.try_create_table(table).map(|_| true), false) }

    pub fn try_table_exists(&self, table: &str) -> Result<bool, StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.table_exists(&table)?)
    }

    pub fn table_exists(&self, table: &str) -> bool { soften("table_exists", table, self.try_table_exists(table), false) }

    pub fn try_clear_table(&self, table: &str) -> Result<(), StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.clear_table(&table)?)
    }

    /// Delete every record, keeping the table
    pub fn clear_table(&self, table: &str) -> bool { soften("clear_table", table, self.try_clear_table(table).map(|_| true), false) }

    pub fn try_drop_table(&self, table: &str) -> Result<(), StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.drop_table(&table)?)
    }

    /// Remove the table and all of its records
    pub fn drop_table(&self, table: &str) -> bool { soften("drop_table", table, self.try_drop_table(table).map(|_| true), false) }

    // Writes

    pub fn try_put_object(&self, value: &Value, id: &str, table: &str) -> Result<(), StoreError> {
        let table = self.table(table)?;
        let row = StoredRow::encode(id, value)?;
        self.engine.put_row(&table, &row)?;
        Ok(())
    }

    /// Store `value` under `id`, replacing any existing record. Returns false if nothing was written.
    pub fn put_object(&self, value: &Value, id: &str, table: &str) -> bool {
        soften("put_object", table, self.try_put_object(value, id, table).map(|_| true), false)
    }

    /// Store any serializable value as its JSON representation
    pub fn try_put<T: Serialize + ?Sized>(&self, value: &T, id: &str, table: &str) -> Result<(), StoreError> {
        // Validate the table first so a bad name is reported as such
        self.table(table)?;
        self.try_put_object(&value::to_value(id, value)?, id, table)
    }

    pub fn put<T: Serialize + ?Sized>(&self, value: &T, id: &str, table: &str) -> bool {
        soften("put", table, self.try_put(value, id, table).map(|_| true), false)
    }

    /// Stored as the one-element array `[string]`
    pub fn put_string(&self, string: &str, id: &str, table: &str) -> bool { self.put_object(&value::wrap_scalar(string), id, table) }

    pub fn try_put_number(&self, number: f64, id: &str, table: &str) -> Result<(), StoreError> {
        self.table(table)?;
        let number = value::finite_number(id, number)?;
        self.try_put_object(&value::wrap_scalar(number), id, table)
    }

    /// Stored as the one-element array `[number]`. NaN and infinities are rejected.
    pub fn put_number(&self, number: f64, id: &str, table: &str) -> bool {
        soften("put_number", table, self.try_put_number(number, id, table).map(|_| true), false)
    }

    /// Like [`put_number`](Self::put_number), without the round trip through `f64`
    pub fn put_integer(&self, integer: i64, id: &str, table: &str) -> bool { self.put_object(&value::wrap_scalar(integer), id, table) }

    // Reads

    /// Fails with [`StoreError::NotFound`] if there is no record with this id
    pub fn try_get_record(&self, id: &str, table: &str) -> Result<Record, StoreError> {
        let table = self.table(table)?;
        match self.engine.get_row(&table, id)? {
            Some(row) => row.decode(&table),
            None => Err(StoreError::NotFound { table: table.to_string(), id: id.to_owned() }),
        }
    }

    /// The full record, or `None` if it is absent or cannot be decoded
    pub fn get_record(&self, id: &str, table: &str) -> Option<Record> { soften("get_record", table, self.try_get_record(id, table).map(Some), None) }

    /// The stored value. Scalars written with the typed setters come back as one-element arrays.
    pub fn get_object(&self, id: &str, table: &str) -> Option<Value> { self.get_record(id, table).map(|record| record.value) }

    pub fn try_get<T: DeserializeOwned>(&self, id: &str, table: &str) -> Result<T, StoreError> {
        let record = self.try_get_record(id, table)?;
        serde_json::from_value(record.value).map_err(|e| StoreError::Decode { table: table.to_owned(), id: id.to_owned(), reason: e.to_string() })
    }

    /// The stored value deserialized as `T`, or `None` if absent or of another shape
    pub fn get<T: DeserializeOwned>(&self, id: &str, table: &str) -> Option<T> { soften("get", table, self.try_get(id, table).map(Some), None) }

    /// A string written by [`put_string`](Self::put_string)
    pub fn get_string(&self, id: &str, table: &str) -> Option<String> {
        let value = self.get_object(id, table)?;
        value::unwrap_scalar(&value)?.as_str().map(str::to_owned)
    }

    /// A number written by [`put_number`](Self::put_number) or [`put_integer`](Self::put_integer)
    pub fn get_number(&self, id: &str, table: &str) -> Option<f64> {
        let value = self.get_object(id, table)?;
        value::unwrap_scalar(&value)?.as_f64()
    }

    /// An integer written by [`put_integer`](Self::put_integer), or a [`put_number`](Self::put_number)
    /// with no fractional part that fits in an `i64`
    pub fn get_integer(&self, id: &str, table: &str) -> Option<i64> {
        let value = self.get_object(id, table)?;
        let number = value::unwrap_scalar(&value)?;
        number.as_i64().or_else(|| {
            let n = number.as_f64()?;
            // i64::MAX as f64 rounds up to 2^63, which is out of range
            (n.fract() == 0.0 && n >= i64::MIN as f64 && n < i64::MAX as f64).then_some(n as i64)
        })
    }

    /// Every record in the table, in no particular order. Rows that cannot be decoded are skipped.
    pub fn try_get_all_items(&self, table: &str) -> Result<Vec<Record>, StoreError> {
        let table = self.table(table)?;
        let rows = self.engine.all_rows(&table)?;

        let mut records = Vec::with_capacity(rows.len());
        for row in rows {
            match row.decode(&table) {
                Ok(record) => records.push(record),
                Err(e) => error!(table = %table, error = %e, "skipping undecodable row"),
            }
        }
        Ok(records)
    }

    /// `None` if the table name is invalid or the table does not exist; an existing empty table
    /// yields an empty vector.
    pub fn get_all_items(&self, table: &str) -> Option<Vec<Record>> { soften("get_all_items", table, self.try_get_all_items(table).map(Some), None) }

    pub fn try_get_count(&self, table: &str) -> Result<u64, StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.count_rows(&table)?)
    }

    /// Number of records in the table, 0 if it does not exist
    pub fn get_count(&self, table: &str) -> u64 { soften("get_count", table, self.try_get_count(table), 0) }

    // Deletes. Each returns the number of records removed; deleting absent ids is not an error.

    pub fn try_delete_record(&self, id: &str, table: &str) -> Result<usize, StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.delete_row(&table, id)?)
    }

    pub fn delete_record(&self, id: &str, table: &str) -> usize { soften("delete_record", table, self.try_delete_record(id, table), 0) }

    pub fn try_delete_records<S: AsRef<str>>(&self, ids: &[S], table: &str) -> Result<usize, StoreError> {
        let table = self.table(table)?;
        if ids.is_empty() {
            return Ok(0);
        }
        let ids: Vec<String> = ids.iter().map(|id| id.as_ref().to_owned()).collect();
        Ok(self.engine.delete_rows(&table, &ids)?)
    }

    /// Delete all listed ids at once
    pub fn delete_records<S: AsRef<str>>(&self, ids: &[S], table: &str) -> usize { soften("delete_records", table, self.try_delete_records(ids, table), 0) }

    pub fn try_delete_records_by_prefix(&self, prefix: &str, table: &str) -> Result<usize, StoreError> {
        let table = self.table(table)?;
        Ok(self.engine.delete_rows_with_prefix(&table, prefix)?)
    }

    /// Delete every record whose id starts with `prefix`. An empty prefix clears the table.
    pub fn delete_records_by_prefix(&self, prefix: &str, table: &str) -> usize {
        soften("delete_records_by_prefix", table, self.try_delete_records_by_prefix(prefix, table), 0)
    }
}

/// Downgrade a failed operation to its sentinel, logging why.
///
/// Absent records are expected and only traced; caller mistakes warn; engine failures and corrupt
/// data are errors.
fn soften<T>(op: &'static str, table: &str, result: Result<T, StoreError>, sentinel: T) -> T {
    match result {
        Ok(value) => value,
        Err(err) => {
            match &err {
                StoreError::NotFound { .. } => debug!(op, table, "{}", err),
                e if e.is_caller_error() => warn!(op, table, error = %e, "store operation ignored"),
                e => error!(op, table, error = %e, "store operation failed"),
            }
            sentinel
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::BTreeMap;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::sync::Mutex;

    use serde_json::json;

    use super::*;
    use crate::error::StorageError;

    type Tables = BTreeMap<String, BTreeMap<String, StoredRow>>;

    /// Map-backed engine with a switch to make every call fail
    #[derive(Default)]
    struct MapEngine {
        tables: Mutex<Tables>,
        closed: AtomicBool,
        failing: AtomicBool,
    }

    impl MapEngine {
        fn with_tables<T>(&self, table: &TableName, f: impl FnOnce(&mut BTreeMap<String, StoredRow>) -> T) -> Result<T, StorageError> {
            if self.closed.load(Ordering::SeqCst) {
                return Err(StorageError::Closed);
            }
            if self.failing.load(Ordering::SeqCst) {
                return Err(StorageError::backend(std::io::Error::other("disk I/O error")));
            }
            let mut tables = self.tables.lock().unwrap();
            let rows = tables.get_mut(table.as_str()).ok_or_else(|| StorageError::TableNotFound(table.to_string()))?;
            Ok(f(rows))
        }
    }

    impl StorageEngine for MapEngine {
        fn create_table(&self, table: &TableName) -> Result<(), StorageError> {
            self.tables.lock().unwrap().entry(table.to_string()).or_default();
            Ok(())
        }
        fn table_exists(&self, table: &TableName) -> Result<bool, StorageError> { Ok(self.tables.lock().unwrap().contains_key(table.as_str())) }
        fn clear_table(&self, table: &TableName) -> Result<(), StorageError> { self.with_tables(table, |rows| rows.clear()) }
        fn drop_table(&self, table: &TableName) -> Result<(), StorageError> {
            self.tables.lock().unwrap().remove(table.as_str()).map(|_| ()).ok_or_else(|| StorageError::TableNotFound(table.to_string()))
        }
        fn put_row(&self, table: &TableName, row: &StoredRow) -> Result<(), StorageError> {
            self.with_tables(table, |rows| {
                rows.insert(row.id.clone(), row.clone());
            })
        }
        fn get_row(&self, table: &TableName, id: &str) -> Result<Option<StoredRow>, StorageError> { self.with_tables(table, |rows| rows.get(id).cloned()) }
        fn all_rows(&self, table: &TableName) -> Result<Vec<StoredRow>, StorageError> { self.with_tables(table, |rows| rows.values().cloned().collect()) }
        fn count_rows(&self, table: &TableName) -> Result<u64, StorageError> { self.with_tables(table, |rows| rows.len() as u64) }
        fn delete_row(&self, table: &TableName, id: &str) -> Result<usize, StorageError> {
            self.with_tables(table, |rows| rows.remove(id).map_or(0, |_| 1))
        }
        fn delete_rows(&self, table: &TableName, ids: &[String]) -> Result<usize, StorageError> {
            self.with_tables(table, |rows| ids.iter().filter(|id| rows.remove(id.as_str()).is_some()).count())
        }
        fn delete_rows_with_prefix(&self, table: &TableName, prefix: &str) -> Result<usize, StorageError> {
            self.with_tables(table, |rows| {
                let before = rows.len();
                rows.retain(|id, _| !id.starts_with(prefix));
                before - rows.len()
            })
        }
        fn close(&self) -> Result<(), StorageError> {
            self.closed.store(true, Ordering::SeqCst);
            Ok(())
        }
        fn is_closed(&self) -> bool { self.closed.load(Ordering::SeqCst) }
    }

    fn store() -> Store<MapEngine> {
        let store = Store::new(MapEngine::default());
        assert!(store.create_table("t"));
        store
    }

    #[test]
    fn test_scalar_wrapping_round_trip() {
        let store = store();
        assert!(store.put_string("hi", "k", "t"));
        assert_eq!(store.get_string("k", "t").as_deref(), Some("hi"));
        assert_eq!(store.get_object("k", "t"), Some(json!(["hi"])));
        // Wrong scalar type
        assert_eq!(store.get_number("k", "t"), None);

        assert!(store.put_number(2.5, "n", "t"));
        assert_eq!(store.get_number("n", "t"), Some(2.5));
        assert_eq!(store.get_string("n", "t"), None);

        assert!(store.put_integer(i64::MAX, "i", "t"));
        assert_eq!(store.get_integer("i", "t"), Some(i64::MAX));
    }

    #[test]
    fn test_unwrapped_values_are_not_scalars() {
        let store = store();
        assert!(store.put_object(&json!("bare"), "bare", "t"));
        assert_eq!(store.get_string("bare", "t"), None);
        assert!(store.put_object(&json!(["a", "b"]), "pair", "t"));
        assert_eq!(store.get_string("pair", "t"), None);
        assert_eq!(store.get_string("missing", "t"), None);
    }

    #[test]
    fn test_non_finite_numbers_write_nothing() {
        let store = store();
        assert!(!store.put_number(f64::NAN, "nan", "t"));
        assert!(!store.put_number(f64::INFINITY, "inf", "t"));
        assert!(matches!(store.try_put_number(f64::NEG_INFINITY, "ninf", "t"), Err(StoreError::Encode { .. })));
        assert_eq!(store.get_count("t"), 0);
    }

    #[test]
    fn test_typed_put_rejects_non_finite_floats() {
        #[derive(serde::Serialize)]
        struct Sensor {
            name: String,
            reading: f64,
        }

        let store = store();
        assert!(!store.put(&f64::NAN, "nan", "t"));
        assert!(!store.put(&vec![f64::INFINITY], "inf", "t"));
        assert!(!store.put(&Sensor { name: "boiler".into(), reading: f64::NAN }, "sensor", "t"));
        assert!(matches!(store.try_put(&[1.0, f64::NEG_INFINITY], "ninf", "t"), Err(StoreError::Encode { .. })));
        assert_eq!(store.get_count("t"), 0);

        assert!(store.put(&Sensor { name: "boiler".into(), reading: 0.25 }, "sensor", "t"));
        assert_eq!(store.get_object("sensor", "t"), Some(json!({"name": "boiler", "reading": 0.25})));
    }

    #[test]
    fn test_integral_numbers_read_as_integers() {
        let store = store();
        assert!(store.put_number(2.0, "two", "t"));
        assert_eq!(store.get_integer("two", "t"), Some(2));
        assert!(store.put_number(-0.0, "zero", "t"));
        assert_eq!(store.get_integer("zero", "t"), Some(0));
        assert!(store.put_number(2.5, "half", "t"));
        assert_eq!(store.get_integer("half", "t"), None);
        assert!(store.put_number(1e19, "huge", "t"));
        assert_eq!(store.get_integer("huge", "t"), None);
    }

    #[test]
    fn test_invalid_table_checked_before_encoding() {
        let store = store();
        assert!(matches!(store.try_put_number(f64::NAN, "x", "bad name"), Err(StoreError::InvalidTableName(_))));
    }

    #[test]
    fn test_corrupt_row_reads_as_absent() {
        let store = store();
        assert!(store.put_string("fine", "good", "t"));
        let table = TableName::new("t").unwrap();
        store.engine().put_row(&table, &StoredRow { id: "bad".into(), json: "{oops".into(), created_time: "2025-10-30T12:00:00Z".into() }).unwrap();

        assert_eq!(store.get_record("bad", "t"), None);
        assert!(matches!(store.try_get_record("bad", "t"), Err(StoreError::Decode { .. })));

        let items = store.get_all_items("t").unwrap();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].id, "good");
        assert_eq!(store.get_count("t"), 2);
    }

    #[test]
    fn test_engine_failures_become_sentinels() {
        let store = store();
        assert!(store.put_string("v", "k", "t"));
        store.engine().failing.store(true, Ordering::SeqCst);

        assert!(!store.put_string("v2", "k", "t"));
        assert_eq!(store.get_record("k", "t"), None);
        assert_eq!(store.get_all_items("t"), None);
        assert_eq!(store.get_count("t"), 0);
        assert_eq!(store.delete_record("k", "t"), 0);
        assert!(matches!(store.try_get_count("t"), Err(StoreError::Engine(_))));

        store.engine().failing.store(false, Ordering::SeqCst);
        assert_eq!(store.get_string("k", "t").as_deref(), Some("v"));
    }

    #[test]
    fn test_typed_get() {
        #[derive(serde::Serialize, serde::Deserialize, Debug, PartialEq)]
        struct Alarm {
            title: String,
            enabled: bool,
        }

        let store = store();
        let alarm = Alarm { title: "Morning Alarm".into(), enabled: true };
        assert!(store.put(&alarm, "alarm_001", "t"));
        assert_eq!(store.get::<Alarm>("alarm_001", "t"), Some(alarm));
        assert_eq!(store.get_object("alarm_001", "t"), Some(json!({"title": "Morning Alarm", "enabled": true})));

        // Shape mismatch
        assert!(store.put_string("nope", "s", "t"));
        assert_eq!(store.get::<Alarm>("s", "t"), None);
    }

    #[test]
    fn test_not_found_is_typed() {
        let store = store();
        match store.try_get_record("ghost", "t") {
            Err(StoreError::NotFound { table, id }) => {
                assert_eq!(table, "t");
                assert_eq!(id, "ghost");
            }
            other => panic!("expected NotFound, got {:?}", other),
        }
        assert!(matches!(store.try_get_record("ghost", "missing"), Err(StoreError::TableNotFound(_))));
    }

    #[test]
    fn test_empty_id_list_is_a_no_op() {
        let store = store();
        store.engine().failing.store(true, Ordering::SeqCst);
        // Never reaches the engine
        assert!(matches!(store.try_delete_records::<&str>(&[], "t"), Ok(0)));
    }

    #[test]
    fn test_closed_store() {
        let store = store();
        assert!(store.put_string("v", "k", "t"));
        store.close();
        assert!(store.is_closed());
        assert!(matches!(store.try_get_record("k", "t"), Err(StoreError::Closed)));
        assert_eq!(store.get_string("k", "t"), None);
        assert!(!store.table_exists("t"));
        store.close();
    }
}
