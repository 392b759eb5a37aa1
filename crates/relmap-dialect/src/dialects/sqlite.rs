use crate::dialects::postgres::on_conflict;
use crate::rules::{DialectRules, UpsertParts, quote_string, standard_literal};
use relmap_core::value::{format_date, format_time, format_timestamp};
use relmap_core::{SqlType, Value};
use relmap_mapping::{
    BooleanAsIntegerConverter, JsonTextConverter, TypeMappingTable, UuidTextConverter,
};

/// SQLite.
///
/// No boolean, UUID or JSON column types: these are stored as integers and
/// text. ALTER TABLE is limited to one column operation per statement.
#[derive(Debug, Clone, Copy, Default)]
pub struct Sqlite;

impl DialectRules for Sqlite {
    fn id(&self) -> &'static str {
        "sqlite"
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &[r"^(jdbc:)?sqlite:"]
    }

    fn placeholder(&self, position: usize) -> String {
        format!("?{}", position)
    }

    fn type_mappings(&self) -> TypeMappingTable {
        TypeMappingTable::standard()
            .with_column::<bool>(BooleanAsIntegerConverter, SqlType::Integer)
            .with_column::<[u8; 16]>(UuidTextConverter, SqlType::Text)
            .with_column::<serde_json::Value>(JsonTextConverter, SqlType::Text)
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Boolean | SqlType::SmallInt | SqlType::Integer | SqlType::BigInt => {
                "INTEGER".to_string()
            }
            SqlType::Real | SqlType::Double => "REAL".to_string(),
            SqlType::Decimal { .. } => "NUMERIC".to_string(),
            SqlType::Char(_)
            | SqlType::VarChar(_)
            | SqlType::Text
            | SqlType::Uuid
            | SqlType::Json
            | SqlType::Date
            | SqlType::Time
            | SqlType::Timestamp => "TEXT".to_string(),
            SqlType::Blob => "BLOB".to_string(),
            SqlType::Custom(name) => name.clone(),
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Bool(v) => String::from(if *v { "1" } else { "0" }),
            Value::Date(v) => quote_string(&format_date(*v)),
            Value::Time(v) => quote_string(&format_time(*v)),
            Value::Timestamp(v) => quote_string(&format_timestamp(*v)),
            other => standard_literal(other),
        }
    }

    fn render_upsert(&self, parts: &UpsertParts<'_>) -> String {
        on_conflict(parts)
    }

    fn modify_column(&self, _column: &str, _type_name: &str, _nullable: bool) -> Option<String> {
        None
    }

    fn supports_constraint_alteration(&self) -> bool {
        false
    }

    fn supports_multiple_alterations(&self) -> bool {
        false
    }

    fn render_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (None, Some(o)) => format!("LIMIT -1 OFFSET {}", o),
            (l, o) => crate::dialects::Generic.render_limit(l, o),
        }
    }

    /// `UPDATE t a` is a syntax error in SQLite; the alias needs `AS`.
    fn dml_target(&self, table: &str, alias: &str) -> String {
        format!("{} AS {}", table, alias)
    }
}
