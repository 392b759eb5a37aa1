//! Dialect lookup by id or connection URL.
//!
//! The process-wide registry is populated with the built-in dialects on
//! first use and is immutable afterwards; lookups need no locking.

use crate::dialect::Dialect;
use crate::dialects::{Generic, MySql, Postgres, Sqlite};
use crate::rules::DialectRules;
use regex::Regex;
use relmap_core::error::{ConfigError, DialectError, DialectErrorKind};
use relmap_core::{Error, Result};
use std::sync::{Arc, OnceLock};

static REGISTRY: OnceLock<DialectRegistry> = OnceLock::new();

/// The process-wide registry of built-in dialects.
pub fn registry() -> Result<&'static DialectRegistry> {
    if let Some(registry) = REGISTRY.get() {
        return Ok(registry);
    }
    let built = DialectRegistry::builtin()?;
    Ok(REGISTRY.get_or_init(|| built))
}

#[derive(Debug)]
struct Entry {
    rules: Arc<dyn DialectRules>,
    patterns: Vec<Regex>,
}

#[derive(Debug, Default)]
pub struct DialectRegistry {
    entries: Vec<Entry>,
}

impl DialectRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    /// Generic, PostgreSQL, MySQL and SQLite.
    pub fn builtin() -> Result<Self> {
        Ok(Self::builder()
            .register(Generic)?
            .register(Postgres)?
            .register(MySql)?
            .register(Sqlite)?
            .build())
    }

    /// Registered ids, in registration order.
    pub fn ids(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.entries.iter().map(|e| e.rules.id())
    }

    pub fn by_id(&self, id: &str) -> Result<Dialect> {
        self.entries
            .iter()
            .find(|e| e.rules.id().eq_ignore_ascii_case(id))
            .map(|e| Dialect::from_rules(Arc::clone(&e.rules)))
            .ok_or_else(|| {
                Error::Dialect(DialectError {
                    kind: DialectErrorKind::NotFound,
                    key: id.to_string(),
                    candidates: self.ids().map(str::to_string).collect(),
                })
            })
    }

    /// The single dialect whose URL patterns match `url`.
    pub fn for_url(&self, url: &str) -> Result<Dialect> {
        let matches: Vec<&Entry> = self
            .entries
            .iter()
            .filter(|e| e.patterns.iter().any(|p| p.is_match(url)))
            .collect();
        match matches.as_slice() {
            [entry] => Ok(Dialect::from_rules(Arc::clone(&entry.rules))),
            [] => {
                tracing::warn!(url = %url, "no dialect matches url");
                Err(Error::Dialect(DialectError {
                    kind: DialectErrorKind::NotFound,
                    key: url.to_string(),
                    candidates: Vec::new(),
                }))
            }
            several => Err(Error::Dialect(DialectError {
                kind: DialectErrorKind::Ambiguous,
                key: url.to_string(),
                candidates: several.iter().map(|e| e.rules.id().to_string()).collect(),
            })),
        }
    }
}

#[derive(Debug, Default)]
pub struct RegistryBuilder {
    entries: Vec<Entry>,
}

impl RegistryBuilder {
    /// Add a dialect; its URL patterns are compiled here.
    pub fn register(self, rules: impl DialectRules + 'static) -> Result<Self> {
        self.register_arc(Arc::new(rules))
    }

    pub fn register_arc(mut self, rules: Arc<dyn DialectRules>) -> Result<Self> {
        let patterns = rules
            .url_patterns()
            .iter()
            .map(|p| {
                Regex::new(p).map_err(|e| {
                    Error::Config(ConfigError {
                        message: format!("invalid URL pattern for dialect '{}': {}", rules.id(), p),
                        source: Some(Box::new(e)),
                    })
                })
            })
            .collect::<Result<Vec<_>>>()?;
        if let Some(existing) = self.entries.iter_mut().find(|e| e.rules.id() == rules.id()) {
            existing.rules = rules;
            existing.patterns = patterns;
        } else {
            self.entries.push(Entry { rules, patterns });
        }
        Ok(self)
    }

    pub fn build(self) -> DialectRegistry {
        tracing::debug!(
            dialects = self.entries.len(),
            "populated dialect registry"
        );
        DialectRegistry {
            entries: self.entries,
        }
    }
}
