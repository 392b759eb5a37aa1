//! Flat row representation.
//!
//! A `Row` is an ordered sequence of named, optionally declared, typed values.
//! Lookup by name is case-insensitive; order is significant, because the
//! reverse mapping pass consumes columns in exactly the order the forward pass
//! produced them.

use crate::Result;
use crate::error::{Error, MappingErrorKind, TypeError};
use crate::types::SqlType;
use crate::value::{FromValue, Value};
use std::collections::HashMap;
use std::sync::Arc;

/// Column metadata shared across all rows in a result set.
#[derive(Debug, Clone, Default)]
pub struct ColumnInfo {
    names: Vec<String>,
    types: Vec<Option<SqlType>>,
    /// Lowercased name -> first index
    name_to_index: HashMap<String, usize>,
}

impl ColumnInfo {
    /// Create column info from undeclared column names.
    pub fn new(names: Vec<String>) -> Self {
        let mut info = Self::default();
        for name in names {
            info.push(name, None);
        }
        info
    }

    /// Append a column.
    pub fn push(&mut self, name: String, sql_type: Option<SqlType>) {
        self.name_to_index
            .entry(name.to_ascii_lowercase())
            .or_insert(self.names.len());
        self.names.push(name);
        self.types.push(sql_type);
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    /// Index of a column, ignoring ASCII case.
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.name_to_index.get(&name.to_ascii_lowercase()).copied()
    }

    pub fn name_at(&self, index: usize) -> Option<&str> {
        self.names.get(index).map(String::as_str)
    }

    /// Declared type of the column at `index`, if one was recorded.
    pub fn type_at(&self, index: usize) -> Option<&SqlType> {
        self.types.get(index).and_then(Option::as_ref)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.index_of(name).is_some()
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }
}

/// A single flat row.
///
/// Column metadata is shared via `Arc` so rows from one result set can share it.
#[derive(Debug, Clone, Default)]
pub struct Row {
    values: Vec<Value>,
    columns: Arc<ColumnInfo>,
}

impl Row {
    /// Create a row from column names and values.
    pub fn new(column_names: Vec<String>, values: Vec<Value>) -> Self {
        Self {
            values,
            columns: Arc::new(ColumnInfo::new(column_names)),
        }
    }

    /// Create a row over shared column metadata.
    pub fn with_columns(columns: Arc<ColumnInfo>, values: Vec<Value>) -> Self {
        Self { values, columns }
    }

    /// Append one named, declared column.
    pub fn push(&mut self, name: impl Into<String>, sql_type: Option<SqlType>, value: Value) {
        Arc::make_mut(&mut self.columns).push(name.into(), sql_type);
        self.values.push(value);
    }

    pub fn column_info(&self) -> Arc<ColumnInfo> {
        Arc::clone(&self.columns)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Value> {
        self.values.get(index)
    }

    /// Get a value by column name, ignoring ASCII case.
    pub fn get_by_name(&self, name: &str) -> Option<&Value> {
        self.columns.index_of(name).and_then(|i| self.values.get(i))
    }

    pub fn contains_column(&self, name: &str) -> bool {
        self.columns.contains(name)
    }

    /// Get a typed, non-null value by column index.
    pub fn get_as<T: FromValue>(&self, index: usize) -> Result<T> {
        let value = self.get(index).ok_or_else(|| {
            Error::type_mismatch(
                T::EXPECTED,
                format!("index {} out of bounds (row has {} columns)", index, self.len()),
            )
        })?;
        T::try_from_value(value)
    }

    /// Get a typed, non-null value by column name.
    pub fn get_named<T: FromValue>(&self, name: &str) -> Result<T> {
        let value = self.get_by_name(name).ok_or_else(|| {
            Error::Type(TypeError {
                expected: T::EXPECTED,
                actual: format!("column '{}' not found", name),
                column: Some(name.to_string()),
            })
        })?;
        T::try_from_value(value).map_err(|e| with_column(e, name))
    }

    /// Like [`Row::get_named`] but maps SQL NULL to `None`.
    pub fn get_named_opt<T: FromValue>(&self, name: &str) -> Result<Option<T>> {
        match self.get_by_name(name) {
            Some(Value::Null) => Ok(None),
            _ => self.get_named(name).map(Some),
        }
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.names().iter().map(String::as_str)
    }

    pub fn values(&self) -> impl Iterator<Item = &Value> {
        self.values.iter()
    }

    /// Iterate over (column_name, value) pairs.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.column_names().zip(self.values.iter())
    }

    /// Consume the row into its values.
    pub fn into_values(self) -> Vec<Value> {
        self.values
    }

    /// An ordered cursor for reverse mapping.
    pub fn cursor(&self) -> RowCursor<'_> {
        RowCursor { row: self, pos: 0 }
    }
}

fn with_column(err: Error, name: &str) -> Error {
    match err {
        Error::Type(mut te) => {
            te.column = Some(name.to_string());
            Error::Type(te)
        }
        e => e,
    }
}

/// Sequential reader over a row's columns.
#[derive(Debug)]
pub struct RowCursor<'a> {
    row: &'a Row,
    pos: usize,
}

impl<'a> RowCursor<'a> {
    /// Consume the next column, which is expected to be named `expected`.
    ///
    /// The name is only checked in debug builds.
    pub fn take(&mut self, expected: &str) -> Result<&'a Value> {
        let index = self.pos;
        let value = self.row.get(index).ok_or_else(|| {
            Error::mapping(
                MappingErrorKind::MissingColumn,
                format!("row ended before column {} (position {})", expected, index),
            )
        })?;
        if cfg!(debug_assertions) {
            let actual = self.row.columns.name_at(index).unwrap_or_default();
            if !actual.eq_ignore_ascii_case(expected) {
                return Err(Error::mapping(
                    MappingErrorKind::ColumnMismatch,
                    format!(
                        "expected column {} at position {}, found {}",
                        expected, index, actual
                    ),
                ));
            }
        }
        tracing::trace!(column = expected, position = index, "consume column");
        self.pos += 1;
        Ok(value)
    }

    /// Number of columns consumed so far.
    pub fn position(&self) -> usize {
        self.pos
    }

    pub fn remaining(&self) -> usize {
        self.row.len().saturating_sub(self.pos)
    }
}

/// Reduce a result to at most one row.
///
/// More than one row is a [`Error::NonUniqueResult`], so callers can fall
/// back to a multi-row query.
pub fn at_most_one(rows: Vec<Row>) -> Result<Option<Row>> {
    match rows.len() {
        0 | 1 => Ok(rows.into_iter().next()),
        count => Err(Error::NonUniqueResult { count }),
    }
}
