//! Declared column types.
//!
//! A `SqlType` is the dialect-neutral declaration attached to every column a
//! mapping tree emits. Dialects translate it to their own type vocabulary when
//! rendering DDL; `sql_name` is the ANSI-ish default used by the generic dialect.

use serde::{Deserialize, Serialize};

/// Dialect-neutral SQL column type.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SqlType {
    Boolean,
    SmallInt,
    Integer,
    BigInt,
    Real,
    Double,
    Decimal { precision: u8, scale: u8 },
    Char(u32),
    /// Variable-length text with an optional length limit
    VarChar(Option<u32>),
    Text,
    Blob,
    Date,
    Time,
    Timestamp,
    Uuid,
    Json,
    /// Product-specific type name, rendered verbatim
    Custom(String),
}

impl SqlType {
    /// Get the generic SQL type name for this type.
    pub fn sql_name(&self) -> String {
        match self {
            SqlType::Boolean => "BOOLEAN".to_string(),
            SqlType::SmallInt => "SMALLINT".to_string(),
            SqlType::Integer => "INTEGER".to_string(),
            SqlType::BigInt => "BIGINT".to_string(),
            SqlType::Real => "REAL".to_string(),
            SqlType::Double => "DOUBLE PRECISION".to_string(),
            SqlType::Decimal { precision, scale } => format!("DECIMAL({}, {})", precision, scale),
            SqlType::Char(len) => format!("CHAR({})", len),
            SqlType::VarChar(Some(len)) => format!("VARCHAR({})", len),
            SqlType::VarChar(None) => "VARCHAR".to_string(),
            SqlType::Text => "TEXT".to_string(),
            SqlType::Blob => "BLOB".to_string(),
            SqlType::Date => "DATE".to_string(),
            SqlType::Time => "TIME".to_string(),
            SqlType::Timestamp => "TIMESTAMP".to_string(),
            SqlType::Uuid => "UUID".to_string(),
            SqlType::Json => "JSON".to_string(),
            SqlType::Custom(name) => name.clone(),
        }
    }

    /// Apply a declared length to a text type.
    ///
    /// Unbounded `VarChar`/`Text` become `VARCHAR(length)`; other types are unchanged.
    #[must_use]
    pub fn with_length(self, length: Option<u32>) -> SqlType {
        match (self, length) {
            (SqlType::VarChar(_) | SqlType::Text, Some(len)) => SqlType::VarChar(Some(len)),
            (ty, _) => ty,
        }
    }
}
