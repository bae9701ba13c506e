//! Table names and identifier quoting

use std::fmt;

use crate::error::StoreError;

/// A validated table name.
///
/// Any non-empty string without whitespace is accepted. Table names cannot be bound as
/// statement parameters, so engines splice them into SQL through [`TableName::quoted`].
#[derive(Clone, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TableName(String);

impl TableName {
    /// Validate `name` as a table name
    pub fn new(name: impl Into<String>) -> Result<Self, StoreError> {
        let name = name.into();
        if Self::is_valid(&name) {
            Ok(Self(name))
        } else {
            Err(StoreError::InvalidTableName(name))
        }
    }

    /// Non-empty and free of whitespace
    pub fn is_valid(name: &str) -> bool { !name.is_empty() && !name.chars().any(char::is_whitespace) }

    pub fn as_str(&self) -> &str { &self.0 }

    /// The name as a double-quoted SQL identifier, with embedded quotes doubled
    pub fn quoted(&self) -> String { format!("\"{}\"", self.0.replace('"', "\"\"")) }
}

impl fmt::Display for TableName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result { f.write_str(&self.0) }
}

impl AsRef<str> for TableName {
    fn as_ref(&self) -> &str { &self.0 }
}

impl TryFrom<&str> for TableName {
    type Error = StoreError;
    fn try_from(name: &str) -> Result<Self, Self::Error> { Self::new(name) }
}

impl TryFrom<String> for TableName {
    type Error = StoreError;
    fn try_from(name: String) -> Result<Self, Self::Error> { Self::new(name) }
}
