//! The dialect handle.

use crate::dialects::{Generic, MySql, Postgres, Sqlite};
use crate::format::{FormattedStatement, Formatter};
use crate::registry::registry;
use crate::rules::DialectRules;
use relmap_core::identifiers::quote_if_needed;
use relmap_core::{
    BindingStyle, Entity, Error, MappingConfig, NamingStrategy, Result, SqlType,
};
use relmap_mapping::{BeanMapper, TypeMappingTable};
use relmap_query::Statement;
use std::sync::Arc;

/// Rules of one database product plus the naming, binding and type mapping
/// in effect.
///
/// Cheap to clone. `with_*` methods return a modified copy and leave the
/// original untouched, so a shared dialect can be specialized per use.
#[derive(Debug, Clone)]
pub struct Dialect {
    rules: Arc<dyn DialectRules>,
    naming: NamingStrategy,
    binding: BindingStyle,
    quote_all: bool,
    type_mappings: Arc<TypeMappingTable>,
}

impl Dialect {
    pub fn new(rules: impl DialectRules + 'static) -> Self {
        Self::from_rules(Arc::new(rules))
    }

    pub fn from_rules(rules: Arc<dyn DialectRules>) -> Self {
        Self {
            naming: rules.naming(),
            binding: rules.binding(),
            quote_all: false,
            type_mappings: Arc::new(rules.type_mappings()),
            rules,
        }
    }

    pub fn generic() -> Self {
        Self::new(Generic)
    }

    pub fn postgres() -> Self {
        Self::new(Postgres)
    }

    pub fn mysql() -> Self {
        Self::new(MySql)
    }

    pub fn sqlite() -> Self {
        Self::new(Sqlite)
    }

    /// Look the dialect up in the registry (by id, else by URL) and apply the
    /// configured overrides.
    pub fn from_config(config: &MappingConfig) -> Result<Self> {
        config.validate()?;
        let registry = registry()?;
        // validate() guarantees one of the two is set
        let base = match &config.dialect {
            Some(id) => registry.by_id(id)?,
            None => registry.for_url(config.url.as_deref().unwrap_or_default())?,
        };
        Ok(base.configure(config))
    }

    /// Copy with the naming, binding and quoting overrides of `config`.
    #[must_use]
    pub fn configure(&self, config: &MappingConfig) -> Self {
        let mut next = self.with_naming_strategy(self.naming.apply(&config.naming));
        if let Some(binding) = config.binding {
            next.binding = binding;
        }
        next.quote_all = config.quote_all_identifiers;
        next
    }

    pub fn id(&self) -> &'static str {
        self.rules.id()
    }

    pub fn rules(&self) -> &dyn DialectRules {
        self.rules.as_ref()
    }

    pub fn naming(&self) -> &NamingStrategy {
        &self.naming
    }

    pub fn binding(&self) -> BindingStyle {
        self.binding
    }

    pub fn type_mappings(&self) -> &TypeMappingTable {
        &self.type_mappings
    }

    #[must_use]
    pub fn with_naming_strategy(&self, naming: NamingStrategy) -> Self {
        Self {
            naming,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_binding(&self, binding: BindingStyle) -> Self {
        Self {
            binding,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_quote_all(&self, quote_all: bool) -> Self {
        Self {
            quote_all,
            ..self.clone()
        }
    }

    #[must_use]
    pub fn with_type_mappings(&self, type_mappings: TypeMappingTable) -> Self {
        Self {
            type_mappings: Arc::new(type_mappings),
            ..self.clone()
        }
    }

    /// Quote `name` if it is irregular or reserved (always, with quote-all).
    pub fn quote(&self, name: &str) -> String {
        let quote = self.rules.quote_fn();
        if self.quote_all {
            quote(name)
        } else {
            quote_if_needed(name, self.rules.reserved_words(), quote)
        }
    }

    pub fn type_name(&self, sql_type: &SqlType) -> String {
        self.rules.type_name(sql_type)
    }

    /// A fresh formatter with a fresh parameter collector.
    pub fn create_formatter(&self) -> Formatter<'_> {
        Formatter::new(self)
    }

    #[tracing::instrument(level = "debug", skip_all, fields(dialect = self.id(), kind = statement.kind().as_str()))]
    pub fn format(&self, statement: &Statement) -> Result<FormattedStatement> {
        self.create_formatter().format(statement)
    }

    /// Statement text with every literal inlined.
    pub fn to_inline_sql(&self, statement: &Statement) -> Result<String> {
        let (sql, _) = self
            .with_binding(BindingStyle::Inline)
            .format(statement)?
            .into_parts();
        Ok(sql)
    }

    /// Bean mapper for `E` under this dialect's type mapping and naming.
    pub fn bean_mapper<E: Entity>(&self) -> Result<BeanMapper<E>> {
        BeanMapper::new(&self.type_mappings, &self.naming).map_err(|err| match err {
            Error::UnmappedType(mut unmapped) => {
                unmapped.dialect = Some(self.id().to_string());
                Error::UnmappedType(unmapped)
            }
            other => other,
        })
    }
}
