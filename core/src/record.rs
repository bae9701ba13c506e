//! Records and their persisted form

use chrono::{DateTime, SecondsFormat, Utc};
use serde_json::Value;

use crate::error::StoreError;
use crate::table::TableName;
use crate::value;

/// One stored entry, decoded
#[derive(Clone, Debug, PartialEq)]
pub struct Record {
    pub id: String,
    pub value: Value,
    /// Time of the most recent write to this id
    pub created_time: DateTime<Utc>,
}

/// A row exactly as the storage engine persists it: the `id`, `json` and `createdTime` columns
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StoredRow {
    pub id: String,
    pub json: String,
    pub created_time: String,
}

impl StoredRow {
    /// Encode `value` for writing under `id`, stamped with the current time
    pub fn encode(id: &str, value: &Value) -> Result<Self, StoreError> { Self::encode_at(id, value, Utc::now()) }

    pub fn encode_at(id: &str, value: &Value, at: DateTime<Utc>) -> Result<Self, StoreError> {
        Ok(Self { id: id.to_owned(), json: value::encode(id, value)?, created_time: format_timestamp(&at) })
    }

    /// Decode into a [`Record`]. Both the JSON text and the timestamp must parse.
    pub fn decode(self, table: &TableName) -> Result<Record, StoreError> {
        let corrupt = |reason: String| StoreError::Decode { table: table.to_string(), id: self.id.clone(), reason };

        let value = value::decode(&self.json).map_err(|e| corrupt(format!("json: {}", e)))?;
        let created_time = parse_timestamp(&self.created_time).map_err(|e| corrupt(format!("createdTime {:?}: {}", self.created_time, e)))?;

        Ok(Record { id: self.id, value, created_time })
    }
}

/// RFC 3339 in UTC with millisecond precision, e.g. `2025-10-30T12:00:00.000Z`.
///
/// Fixed width, so text order matches time order.
pub fn format_timestamp(time: &DateTime<Utc>) -> String { time.to_rfc3339_opts(SecondsFormat::Millis, true) }

/// Parse any RFC 3339 timestamp, normalized to UTC
pub fn parse_timestamp(text: &str) -> Result<DateTime<Utc>, chrono::ParseError> {
    DateTime::parse_from_rfc3339(text).map(|t| t.with_timezone(&Utc))
}
