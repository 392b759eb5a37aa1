use crate::rules::DialectRules;
use relmap_core::SqlType;
use relmap_mapping::{JsonTextConverter, TypeMappingTable};

/// Standard SQL with H2-style `MERGE ... KEY` upserts.
#[derive(Debug, Clone, Copy, Default)]
pub struct Generic;

impl DialectRules for Generic {
    fn id(&self) -> &'static str {
        "generic"
    }

    fn url_patterns(&self) -> &'static [&'static str] {
        &[r"^(jdbc:)?h2:", r"^generic:"]
    }

    fn type_mappings(&self) -> TypeMappingTable {
        TypeMappingTable::standard()
            .with_column::<serde_json::Value>(JsonTextConverter, SqlType::Text)
    }
}
