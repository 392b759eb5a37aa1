//! Mapping configuration.
//!
//! The core never picks a dialect on its own: callers describe the dialect
//! (by id or by connection URL) and any overrides in a [`MappingConfig`], and
//! hand it to the dialect layer.

use crate::error::{ConfigError, Error, Result};
use crate::naming::IdentifierCase;
use serde::{Deserialize, Serialize};

/// How literal values reach the database.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "style", rename_all = "snake_case")]
pub enum BindingStyle {
    /// Positional placeholders (`?`, `$1`, ...)
    #[default]
    Indexed,
    /// `:name` placeholders derived from the enclosing property
    Named {
        /// Reuse an existing parameter when name and value are equal
        #[serde(default)]
        merge: bool,
    },
    /// Literals rendered as dialect literal text; no parameters
    Inline,
}

/// Naming overrides applied on top of a dialect's naming strategy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct NamingConfig {
    pub case: Option<IdentifierCase>,
    pub max_identifier_length: Option<usize>,
    pub path_separator: Option<String>,
    pub index_infix: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct MappingConfig {
    /// Explicit dialect id (`postgres`, `mysql`, ...)
    pub dialect: Option<String>,
    /// Connection URL matched against registered dialect patterns
    pub url: Option<String>,
    pub naming: NamingConfig,
    /// Overrides the dialect's default binding style when set
    pub binding: Option<BindingStyle>,
    pub quote_all_identifiers: bool,
}

impl MappingConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse from JSON text.
    pub fn from_json(text: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Select the dialect by id.
    pub fn dialect(mut self, id: impl Into<String>) -> Self {
        self.dialect = Some(id.into());
        self
    }

    /// Select the dialect by connection URL.
    pub fn url(mut self, url: impl Into<String>) -> Self {
        self.url = Some(url.into());
        self
    }

    pub fn naming(mut self, naming: NamingConfig) -> Self {
        self.naming = naming;
        self
    }

    pub fn max_identifier_length(mut self, max: usize) -> Self {
        self.naming.max_identifier_length = Some(max);
        self
    }

    pub fn binding(mut self, binding: BindingStyle) -> Self {
        self.binding = Some(binding);
        self
    }

    pub fn quote_all_identifiers(mut self, quote: bool) -> Self {
        self.quote_all_identifiers = quote;
        self
    }

    /// Check the configuration for contradictions.
    pub fn validate(&self) -> Result<()> {
        if self.dialect.is_none() && self.url.is_none() {
            return Err(config_error("either 'dialect' or 'url' must be set"));
        }
        if self.naming.max_identifier_length == Some(0) {
            return Err(config_error("max_identifier_length must be positive"));
        }
        if self.naming.path_separator.as_deref() == Some("") {
            return Err(config_error("path_separator must not be empty"));
        }
        Ok(())
    }
}

fn config_error(message: &str) -> Error {
    Error::Config(ConfigError {
        message: message.to_string(),
        source: None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_json() {
        let config = MappingConfig::from_json(
            r#"{
                "dialect": "postgres",
                "naming": { "case": "lower", "max_identifier_length": 30 },
                "binding": { "style": "named", "merge": true }
            }"#,
        )
        .unwrap();
        assert_eq!(config.dialect.as_deref(), Some("postgres"));
        assert_eq!(config.naming.case, Some(IdentifierCase::Lower));
        assert_eq!(config.naming.max_identifier_length, Some(30));
        assert_eq!(config.binding, Some(BindingStyle::Named { merge: true }));
        assert!(!config.quote_all_identifiers);
    }

    #[test]
    fn builder_setters() {
        let config = MappingConfig::new()
            .url("mysql://localhost/app")
            .binding(BindingStyle::Inline)
            .max_identifier_length(64)
            .quote_all_identifiers(true);
        assert!(config.validate().is_ok());
        assert_eq!(config.naming.max_identifier_length, Some(64));
    }

    #[test]
    fn rejects_missing_selection() {
        let err = MappingConfig::from_json("{}").unwrap_err();
        assert!(matches!(err, Error::Config(_)));
        assert!(MappingConfig::from_json("{ not json").is_err());
    }

    #[test]
    fn rejects_zero_length() {
        let config = MappingConfig::new().dialect("generic").max_identifier_length(0);
        assert!(config.validate().is_err());
    }
}
