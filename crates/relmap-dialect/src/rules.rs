//! The vocabulary of one database product.

use relmap_core::identifiers::quote_ident;
use relmap_core::value::{format_date, format_hex, format_time, format_timestamp, format_uuid};
use relmap_core::{BindingStyle, NamingStrategy, SqlType, Value};
use relmap_mapping::TypeMappingTable;
use std::fmt;

/// Pieces of an UPSERT, already rendered.
#[derive(Debug, Clone, Copy)]
pub struct UpsertParts<'a> {
    pub table: &'a str,
    pub columns: &'a [String],
    pub keys: &'a [String],
    pub values: &'a [String],
}

impl UpsertParts<'_> {
    /// Columns that are not part of the conflict key.
    pub fn updates(&self) -> impl Iterator<Item = &String> {
        self.columns.iter().filter(|c| !self.keys.contains(c))
    }

    /// `INSERT INTO t(a, b) VALUES (x, y)`
    pub fn insert(&self) -> String {
        format!(
            "INSERT INTO {}({}) VALUES ({})",
            self.table,
            self.columns.join(", "),
            self.values.join(", ")
        )
    }
}

/// Dialect-specific rendering rules.
///
/// Defaults describe a standard-SQL database; each dialect overrides what
/// its product does differently. Rules are stateless and shared between
/// threads.
pub trait DialectRules: Send + Sync + fmt::Debug {
    /// Registry id (`postgres`, `mysql`, ...)
    fn id(&self) -> &'static str;

    /// Regular expressions matched against connection URLs.
    fn url_patterns(&self) -> &'static [&'static str];

    fn max_identifier_length(&self) -> Option<usize> {
        None
    }

    fn naming(&self) -> NamingStrategy {
        match self.max_identifier_length() {
            Some(max) => NamingStrategy::with_max_length(max),
            None => NamingStrategy::default(),
        }
    }

    fn binding(&self) -> BindingStyle {
        BindingStyle::Indexed
    }

    /// Reserved words beyond the common SQL set.
    fn reserved_words(&self) -> &'static [&'static str] {
        &[]
    }

    fn quote_fn(&self) -> fn(&str) -> String {
        quote_ident
    }

    /// Placeholder for the parameter at 1-based `position`.
    fn placeholder(&self, _position: usize) -> String {
        "?".to_string()
    }

    fn type_mappings(&self) -> TypeMappingTable {
        TypeMappingTable::standard()
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        sql_type.sql_name()
    }

    fn literal(&self, value: &Value) -> String {
        standard_literal(value)
    }

    /// Render an extension expression; `None` if `kind` is unknown here.
    fn render_extension(&self, _kind: &str, _operands: &[String]) -> Option<String> {
        None
    }

    fn render_upsert(&self, parts: &UpsertParts<'_>) -> String {
        format!(
            "MERGE INTO {}({}) KEY({}) VALUES ({})",
            parts.table,
            parts.columns.join(", "),
            parts.keys.join(", "),
            parts.values.join(", ")
        )
    }

    /// ALTER TABLE fragment changing a column's type; `None` if unsupported.
    fn modify_column(&self, column: &str, type_name: &str, nullable: bool) -> Option<String> {
        let mut out = format!("MODIFY COLUMN {} {}", column, type_name);
        if !nullable {
            out.push_str(" NOT NULL");
        }
        Some(out)
    }

    fn supports_constraint_alteration(&self) -> bool {
        true
    }

    /// Can one ALTER TABLE carry several operations?
    fn supports_multiple_alterations(&self) -> bool {
        true
    }

    fn supports_nulls_order(&self) -> bool {
        true
    }

    fn render_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (Some(l), Some(o)) => format!("LIMIT {} OFFSET {}", l, o),
            (Some(l), None) => format!("LIMIT {}", l),
            (None, Some(o)) => format!("OFFSET {}", o),
            (None, None) => String::new(),
        }
    }

    fn drop_index(&self, index: &str, _table: &str) -> String {
        format!("DROP INDEX {}", index)
    }

    /// Aliased target of an UPDATE or DELETE, both parts already quoted.
    fn dml_target(&self, table: &str, alias: &str) -> String {
        format!("{} {}", table, alias)
    }
}

/// Standard SQL literal text.
pub fn standard_literal(value: &Value) -> String {
    match value {
        Value::Null => "NULL".to_string(),
        Value::Default => "DEFAULT".to_string(),
        Value::Bool(true) => "TRUE".to_string(),
        Value::Bool(false) => "FALSE".to_string(),
        Value::SmallInt(v) => v.to_string(),
        Value::Int(v) => v.to_string(),
        Value::BigInt(v) => v.to_string(),
        Value::Float(v) => float_literal(f64::from(*v)),
        Value::Double(v) => float_literal(*v),
        Value::Decimal(v) => v.clone(),
        Value::Text(v) => quote_string(v),
        Value::Bytes(v) => format!("X'{}'", format_hex(v)),
        Value::Date(v) => format!("DATE '{}'", format_date(*v)),
        Value::Time(v) => format!("TIME '{}'", format_time(*v)),
        Value::Timestamp(v) => format!("TIMESTAMP '{}'", format_timestamp(*v)),
        Value::Uuid(v) => quote_string(&format_uuid(v)),
        Value::Json(v) => quote_string(&v.to_string()),
    }
}

/// `'text'` with embedded quotes doubled.
pub fn quote_string(text: &str) -> String {
    format!("'{}'", text.replace('\'', "''"))
}

fn float_literal(v: f64) -> String {
    if v.is_finite() {
        v.to_string()
    } else {
        quote_string(&v.to_string())
    }
}
