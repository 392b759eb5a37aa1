use crate::rules::{DialectRules, UpsertParts};
use relmap_core::SqlType;
use relmap_core::identifiers::quote_ident_mysql;
use relmap_mapping::{TypeMappingTable, UuidTextConverter};

/// MySQL and MariaDB.
#[derive(Debug, Clone, Copy, Default)]
pub struct MySql;

impl DialectRules for MySql {
    fn id(&self) -> &'static str {
        "mysql"
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &[r"^(jdbc:)?(mysql|mariadb):"]
    }

    fn max_identifier_length(&self) -> Option<usize> {
        Some(64)
    }

    fn reserved_words(&self) -> &'static [&'static str] {
        &["DUAL", "KEYS", "RANGE", "RANK", "READ", "WRITE"]
    }

    fn quote_fn(&self) -> fn(&str) -> String {
        quote_ident_mysql
    }

    fn type_mappings(&self) -> TypeMappingTable {
        TypeMappingTable::standard().with_column::<[u8; 16]>(UuidTextConverter, SqlType::Char(36))
    }

    fn type_name(&self, sql_type: &SqlType) -> String {
        match sql_type {
            SqlType::Double => "DOUBLE".to_string(),
            SqlType::Timestamp => "DATETIME(6)".to_string(),
            SqlType::Uuid => "CHAR(36)".to_string(),
            SqlType::VarChar(None) => "VARCHAR(255)".to_string(),
            other => other.sql_name(),
        }
    }

    fn render_extension(&self, kind: &str, operands: &[String]) -> Option<String> {
        match (kind, operands) {
            ("regex_match", [a, b]) => Some(format!("{} REGEXP {}", a, b)),
            _ => None,
        }
    }

    fn render_upsert(&self, parts: &UpsertParts<'_>) -> String {
        let mut updates: Vec<String> = parts
            .updates()
            .map(|c| format!("{} = VALUES({})", c, c))
            .collect();
        if updates.is_empty() {
            updates = parts.keys.iter().map(|k| format!("{} = {}", k, k)).collect();
        }
        format!("{} ON DUPLICATE KEY UPDATE {}", parts.insert(), updates.join(", "))
    }

    fn supports_nulls_order(&self) -> bool {
        false
    }

    fn render_limit(&self, limit: Option<u64>, offset: Option<u64>) -> String {
        match (limit, offset) {
            (None, Some(o)) => format!("LIMIT {} OFFSET {}", u64::MAX, o),
            (l, o) => crate::dialects::Generic.render_limit(l, o),
        }
    }

    fn drop_index(&self, index: &str, table: &str) -> String {
        format!("DROP INDEX {} ON {}", index, table)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn backtick_quoting() {
        assert_eq!((MySql.quote_fn())("order"), "`order`");
    }

    #[test]
    fn upsert_on_duplicate_key() {
        let columns = ["ID".to_string(), "NAME".to_string()];
        let keys = ["ID".to_string()];
        let values = ["?".to_string(), "?".to_string()];
        let parts = UpsertParts {
            table: "CITY",
            columns: &columns,
            keys: &keys,
            values: &values,
        };
        assert_eq!(
            MySql.render_upsert(&parts),
            "INSERT INTO CITY(ID, NAME) VALUES (?, ?) ON DUPLICATE KEY UPDATE NAME = VALUES(NAME)"
        );
    }

    #[test]
    fn offset_without_limit() {
        assert_eq!(
            MySql.render_limit(None, Some(5)),
            "LIMIT 18446744073709551615 OFFSET 5"
        );
        assert_eq!(MySql.render_limit(Some(1), None), "LIMIT 1");
        assert_eq!(MySql.drop_index("IX_CITY_NAME", "CITY"), "DROP INDEX IX_CITY_NAME ON CITY");
    }
}
