//! Physical name derivation.
//!
//! A [`NamingStrategy`] turns logical entity and property names into table,
//! column, index and constraint names. Every derived name is clipped to the
//! maximum identifier length by plain truncation, after all parts have been
//! concatenated. Two long names sharing a prefix can therefore clip to the
//! same identifier; no collision detection is performed.

use crate::config::NamingConfig;
use serde::{Deserialize, Serialize};

/// Letter case applied to derived identifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IdentifierCase {
    /// `GeoLocation` -> `GEO_LOCATION`
    #[default]
    Upper,
    /// `GeoLocation` -> `geo_location`
    Lower,
    /// Names are used verbatim
    Preserve,
}

/// Derived constraint categories, with their name prefixes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConstraintKind {
    PrimaryKey,
    ForeignKey,
    NotNull,
    Unique,
    Check,
}

impl ConstraintKind {
    pub const fn prefix(self) -> &'static str {
        match self {
            ConstraintKind::PrimaryKey => "PK_",
            ConstraintKind::ForeignKey => "FK_",
            ConstraintKind::NotNull => "NN_",
            ConstraintKind::Unique => "UK_",
            ConstraintKind::Check => "CK_",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NamingStrategy {
    pub case: IdentifierCase,
    /// Hard limit on identifier length; `None` means unlimited
    pub max_length: Option<usize>,
    /// Joins the segments of an embedded property path
    pub path_separator: String,
    /// Joins table and column names inside index and constraint names
    pub index_infix: String,
    pub unique_index_prefix: String,
    pub index_prefix: String,
}

impl Default for NamingStrategy {
    fn default() -> Self {
        Self {
            case: IdentifierCase::Upper,
            max_length: None,
            path_separator: "$".to_string(),
            index_infix: "_".to_string(),
            unique_index_prefix: "UX_".to_string(),
            index_prefix: "IX_".to_string(),
        }
    }
}

impl NamingStrategy {
    /// Default strategy with a maximum identifier length.
    pub fn with_max_length(max_length: usize) -> Self {
        Self {
            max_length: Some(max_length),
            ..Self::default()
        }
    }

    /// Overlay the fields set in `config`.
    #[must_use]
    pub fn apply(&self, config: &NamingConfig) -> Self {
        let mut next = self.clone();
        if let Some(case) = config.case {
            next.case = case;
        }
        if let Some(max) = config.max_identifier_length {
            next.max_length = Some(max);
        }
        if let Some(sep) = &config.path_separator {
            next.path_separator.clone_from(sep);
        }
        if let Some(infix) = &config.index_infix {
            next.index_infix.clone_from(infix);
        }
        next
    }

    /// Apply the configured case to one logical name, without clipping.
    pub fn convert_case(&self, name: &str) -> String {
        match self.case {
            IdentifierCase::Upper => to_snake_case(name).to_ascii_uppercase(),
            IdentifierCase::Lower => to_snake_case(name),
            IdentifierCase::Preserve => name.to_string(),
        }
    }

    /// Clip a name to the maximum identifier length.
    pub fn clip(&self, name: String) -> String {
        match self.max_length {
            Some(max) if name.chars().count() > max => {
                let clipped: String = name.chars().take(max).collect();
                tracing::trace!(from = %name, to = %clipped, max, "clip identifier");
                clipped
            }
            _ => name,
        }
    }

    /// Table name for an entity, honoring an explicit override.
    pub fn table_name(&self, entity: &str, explicit: Option<&str>) -> String {
        match explicit {
            Some(name) => name.to_string(),
            None => self.clip(self.convert_case(entity)),
        }
    }

    /// Path segment for one property, honoring an explicit column override.
    pub fn property_segment(&self, property: &str, explicit: Option<&str>) -> String {
        explicit.map_or_else(|| self.convert_case(property), str::to_string)
    }

    /// Column name for an already-converted property path.
    ///
    /// `["GEO_LOCATION", "LATITUDE"]` becomes `GEO_LOCATION$LATITUDE`.
    pub fn join_path<S: AsRef<str>>(&self, segments: &[S]) -> String {
        let joined = segments
            .iter()
            .map(AsRef::as_ref)
            .collect::<Vec<_>>()
            .join(&self.path_separator);
        self.clip(joined)
    }

    /// Column name for a logical property path.
    pub fn column_name(&self, path: &[&str]) -> String {
        let segments: Vec<String> = path.iter().map(|p| self.convert_case(p)).collect();
        self.join_path(&segments)
    }

    /// Index name: prefix + table + columns, joined by the infix.
    pub fn index_name<S: AsRef<str>>(&self, unique: bool, table: &str, columns: &[S]) -> String {
        let prefix = if unique {
            &self.unique_index_prefix
        } else {
            &self.index_prefix
        };
        self.prefixed(prefix, table, columns)
    }

    /// Constraint name, e.g. `FK_CITY_COUNTRY$ID` or `PK_CITY`.
    pub fn constraint_name<S: AsRef<str>>(
        &self,
        kind: ConstraintKind,
        table: &str,
        columns: &[S],
    ) -> String {
        if kind == ConstraintKind::PrimaryKey {
            return self.prefixed(kind.prefix(), table, &[] as &[&str]);
        }
        self.prefixed(kind.prefix(), table, columns)
    }

    fn prefixed<S: AsRef<str>>(&self, prefix: &str, table: &str, columns: &[S]) -> String {
        let mut name = format!("{}{}", prefix, table);
        for column in columns {
            name.push_str(&self.index_infix);
            name.push_str(column.as_ref());
        }
        self.clip(name)
    }
}

/// `GeoLocation` / `geoLocation` / `geo_location` -> `geo_location`,
/// `HTTPServer` -> `http_server`.
pub fn to_snake_case(name: &str) -> String {
    let chars: Vec<char> = name.chars().collect();
    let mut out = String::with_capacity(name.len() + 4);
    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() && i > 0 {
            let prev = chars[i - 1];
            let next_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            if prev != '_' && (prev.is_lowercase() || prev.is_ascii_digit() || (prev.is_uppercase() && next_lower)) {
                out.push('_');
            }
        }
        out.extend(c.to_lowercase());
    }
    out
}
