use crate::rules::{DialectRules, UpsertParts, quote_string, standard_literal};
use relmap_core::value::format_hex;
use relmap_core::{SqlType, Value};

/// PostgreSQL.
#[derive(Debug, Clone, Copy, Default)]
pub struct Postgres;

impl DialectRules for Postgres {
    fn id(&self) -> &'static str {
        "postgres"
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &[r"^(jdbc:)?postgres(ql)?:"]
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(63)
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &["ANALYSE", "ANALYZE", "ARRAY", "LATERAL", "ONLY", "USER"]
    }

    fn placeholder(&self, position: usize) -> String {
        format!("${}", position)
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Blob => "BYTEA".to_string(),
            SqlType::Json => "JSONB".to_string(),
            other => other.sql_name(),
        }
    }

    fn literal(&self, value: &Value) -> String {
        match value {
            Value::Bytes(v) => format!("'\\x{}'::bytea", format_hex(v)),
            Value::Json(v) => format!("{}::jsonb", quote_string(&v.to_string())),
            Value::Uuid(_) => format!("{}::uuid", standard_literal(value)),
            other => standard_literal(other),
        }
    }

    fn render_extension(&self, kind: &str, operands: &[String]) -> Option<String> {
        match (kind, operands) {
            ("ilike", [a, b]) => Some(format!("{} ILIKE {}", a, b)),
            ("regex_match", [a, b]) => Some(format!("{} ~ {}", a, b)),
            _ => None,
        }
    }

    fn render_upsert(&self, parts: &UpsertParts<'_>) -> String {
        on_conflict(parts)
    }

    fn modify_column(&self, column: &str, type_name: &str, _nullable: bool) -> Option<String> {
        Some(format!("ALTER COLUMN {} TYPE {}", column, type_name))
    }
}

/// `INSERT ... ON CONFLICT (keys) DO UPDATE SET c = EXCLUDED.c`, shared with SQLite.
pub(crate) fn on_conflict(parts: &UpsertParts<'_>) -> String {
    let updates: Vec<String> = parts
        .updates()
        .map(|c| format!("{} = EXCLUDED.{}", c, c))
        .collect();
    let action = if updates.is_empty() {
        "DO NOTHING".to_string()
    } else {
        format!("DO UPDATE SET {}", updates.join(", "))
    };
    format!(
        "{} ON CONFLICT ({}) {}",
        parts.insert(),
        parts.keys.join(", "),
        action
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn numbered_placeholders() {
        assert_eq!(Postgres.placeholder(1), "$1");
        assert_eq!(Postgres.placeholder(12), "$12");
    }

    #[test]
    fn native_type_names() {
        assert_eq!(Postgres.type_name(&SqlType::Blob), "BYTEA");
        assert_eq!(Postgres.type_name(&SqlType::Double), "DOUBLE PRECISION");
        assert_eq!(Postgres.literal(&Value::Bytes(vec![1, 255])), "'\\x01FF'::bytea");
    }

    #[test]
    fn known_extensions() {
        let ops = ["NAME".to_string(), "$1".to_string()];
        assert_eq!(
            Postgres.render_extension("ilike", &ops).as_deref(),
            Some("NAME ILIKE $1")
        );
        assert_eq!(
            Postgres.render_extension("regex_match", &ops).as_deref(),
            Some("NAME ~ $1")
        );
        assert!(Postgres.render_extension("soundex", &ops).is_none());
    }

    #[test]
    fn upsert_on_conflict() {
        let columns = ["ID".to_string(), "NAME".to_string()];
        let keys = ["ID".to_string()];
        let values = ["$1".to_string(), "$2".to_string()];
        let parts = UpsertParts {
            table: "CITY",
            columns: &columns,
            keys: &keys,
            values: &values,
        };
        assert_eq!(
            Postgres.render_upsert(&parts),
            "INSERT INTO CITY(ID, NAME) VALUES ($1, $2) ON CONFLICT (ID) DO UPDATE SET NAME = EXCLUDED.NAME"
        );
        let keys_only = UpsertParts {
            columns: &columns[..1],
            values: &values[..1],
            ..parts
        };
        assert_eq!(
            Postgres.render_upsert(&keys_only),
            "INSERT INTO CITY(ID) VALUES ($1) ON CONFLICT (ID) DO NOTHING"
        );
    }
}
