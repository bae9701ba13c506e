//! SQL builder for SQLite statements
//!
//! Table names are spliced in through [`TableName::quoted`]; every other value is a bound parameter.

use memento_core::{StoredRow, TableName};
use rusqlite::types::Value;

/// SQL builder for SQLite statements
#[derive(Debug, Default)]
pub struct SqlBuilder {
    sql: String,
    params: Vec<Value>,
}

impl SqlBuilder {
    pub fn new() -> Self { Self::default() }

    fn push_sql(&mut self, s: &str) -> &mut Self {
        self.sql.push_str(s);
        self
    }

    fn push_table(&mut self, table: &TableName) -> &mut Self { self.push_sql(&table.quoted()) }

    fn push_param(&mut self, text: &str) -> &mut Self {
        self.sql.push('?');
        self.params.push(Value::Text(text.to_owned()));
        self
    }

    pub fn build(self) -> (String, Vec<Value>) { (self.sql, self.params) }

    pub fn create_table(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql("CREATE TABLE IF NOT EXISTS ")
            .push_table(table)
            .push_sql(r#" ("id" TEXT NOT NULL PRIMARY KEY, "json" TEXT NOT NULL, "createdTime" TEXT NOT NULL)"#);
        b
    }

    /// SQLite table names are case-insensitive, so the lookup is too
    pub fn table_exists(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql("SELECT count(*) FROM sqlite_master WHERE type = 'table' AND name = ").push_param(table.as_str()).push_sql(" COLLATE NOCASE");
        b
    }

    pub fn clear_table(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql("DELETE FROM ").push_table(table);
        b
    }

    pub fn drop_table(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql("DROP TABLE ").push_table(table);
        b
    }

    /// Insert, replacing the row with the same id
    pub fn upsert(table: &TableName, row: &StoredRow) -> Self {
        let mut b = Self::new();
        b.push_sql("INSERT OR REPLACE INTO ")
            .push_table(table)
            .push_sql(r#" ("id", "json", "createdTime") VALUES ("#)
            .push_param(&row.id)
            .push_sql(", ")
            .push_param(&row.json)
            .push_sql(", ")
            .push_param(&row.created_time)
            .push_sql(")");
        b
    }

    pub fn select_row(table: &TableName, id: &str) -> Self {
        let mut b = Self::select(table);
        b.push_sql(r#" WHERE "id" = "#).push_param(id).push_sql(" LIMIT 1");
        b
    }

    pub fn select_all(table: &TableName) -> Self { Self::select(table) }

    fn select(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql(r#"SELECT "id", "json", "createdTime" FROM "#).push_table(table);
        b
    }

    pub fn count(table: &TableName) -> Self {
        let mut b = Self::new();
        b.push_sql("SELECT count(*) FROM ").push_table(table);
        b
    }

    pub fn delete_row(table: &TableName, id: &str) -> Self {
        let mut b = Self::new();
        b.push_sql("DELETE FROM ").push_table(table).push_sql(r#" WHERE "id" = "#).push_param(id);
        b
    }

    /// One statement for the whole id list, bound as a single JSON array so the list is not
    /// limited by the number of bound variables.
    pub fn delete_rows(table: &TableName, ids_json: &str) -> Self {
        let mut b = Self::new();
        b.push_sql("DELETE FROM ").push_table(table).push_sql(r#" WHERE "id" IN (SELECT value FROM json_each("#).push_param(ids_json).push_sql("))");
        b
    }

    /// Literal, case-sensitive prefix match. LIKE would treat `%` and `_` as wildcards.
    pub fn delete_rows_with_prefix(table: &TableName, prefix: &str) -> Self {
        let mut b = Self::new();
        b.push_sql("DELETE FROM ")
            .push_table(table)
            .push_sql(r#" WHERE substr("id", 1, length("#)
            .push_param(prefix)
            .push_sql(")) = ")
            .push_param(prefix);
        b
    }
}
