//! Table references and alias assignment.
//!
//! A [`TableRef`] is a handle for one occurrence of a table in a statement.
//! Two handles for the same table are different occurrences and receive
//! different aliases. Aliases are assigned by [`AliasMap::resolve`]: explicit
//! aliases first, then generated ones in registration order, so the result is
//! deterministic for a given statement.

use crate::expr::{Expr, split_path};
use relmap_core::error::StatementErrorKind;
use relmap_core::identifiers::is_reserved;
use relmap_core::{Entity, Error, NamingStrategy, PropertyInfo, Result};
use std::collections::HashSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};

static NEXT_REF: AtomicU64 = AtomicU64::new(1);

/// Physical or entity-derived table name.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum TableName {
    /// Rendered verbatim
    Explicit(String),
    /// Derived from the entity name by the naming strategy at format time
    Entity(&'static str),
}

impl TableName {
    /// Resolve against a naming strategy.
    pub fn resolve(&self, naming: &NamingStrategy) -> String {
        match self {
            TableName::Explicit(name) => name.clone(),
            TableName::Entity(entity) => naming.table_name(entity, None),
        }
    }

    /// Name used for alias generation.
    pub fn logical(&self) -> &str {
        match self {
            TableName::Explicit(name) => name.rsplit('.').next().unwrap_or(name),
            TableName::Entity(entity) => entity,
        }
    }

    pub fn of<E: Entity>() -> Self {
        E::TABLE.map_or(TableName::Entity(E::NAME), |t| TableName::Explicit(t.to_string()))
    }
}

#[derive(Debug, Clone)]
struct RefInner {
    id: u64,
    table: TableName,
    alias: Option<String>,
    /// Property list of the entity behind the table, for path resolution
    properties: Option<fn() -> &'static [PropertyInfo]>,
}

/// One occurrence of a table in a statement.
#[derive(Debug, Clone)]
pub struct TableRef(Arc<RefInner>);

impl TableRef {
    /// Reference a physical table.
    pub fn new(table: impl Into<String>) -> Self {
        Self::with_name(TableName::Explicit(table.into()))
    }

    /// Reference the table of an entity type.
    ///
    /// Property paths on this reference resolve through the entity's
    /// properties, honoring column overrides and id flattening.
    pub fn entity<E: Entity>() -> Self {
        Self::build(TableName::of::<E>(), Some(E::properties))
    }

    /// Reference a table by name. Property paths map through the naming
    /// strategy alone.
    pub fn with_name(table: TableName) -> Self {
        Self::build(table, None)
    }

    fn build(table: TableName, properties: Option<fn() -> &'static [PropertyInfo]>) -> Self {
        Self(Arc::new(RefInner {
            id: NEXT_REF.fetch_add(1, Ordering::Relaxed),
            table,
            alias: None,
            properties,
        }))
    }

    /// Same occurrence with an explicit alias.
    #[must_use]
    pub fn alias(self, alias: impl Into<String>) -> Self {
        let mut inner = (*self.0).clone();
        inner.alias = Some(alias.into());
        Self(Arc::new(inner))
    }

    pub fn id(&self) -> u64 {
        self.0.id
    }

    pub fn table(&self) -> &TableName {
        &self.0.table
    }

    pub fn explicit_alias(&self) -> Option<&str> {
        self.0.alias.as_deref()
    }

    /// Properties of the entity this table stores, if it was referenced
    /// through [`TableRef::entity`].
    pub fn properties(&self) -> Option<&'static [PropertyInfo]> {
        self.0.properties.map(|properties| properties())
    }

    /// Qualified property path.
    pub fn prop(&self, path: &str) -> Expr {
        Expr::Property {
            qualifier: Some(self.clone()),
            path: split_path(path),
        }
    }

    /// Qualified physical column.
    pub fn col(&self, name: impl Into<String>) -> Expr {
        Expr::Column {
            qualifier: Some(self.clone()),
            name: name.into(),
        }
    }

    /// `alias.*`
    pub fn all(&self) -> Expr {
        Expr::All {
            qualifier: Some(self.clone()),
        }
    }
}

/// Identity is the occurrence, not the table name.
impl PartialEq for TableRef {
    fn eq(&self, other: &Self) -> bool {
        self.0.id == other.0.id
    }
}

impl Eq for TableRef {}

impl std::hash::Hash for TableRef {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.0.id.hash(state);
    }
}

#[derive(Debug, Clone, PartialEq)]
struct AliasEntry {
    table: TableRef,
    alias: Option<String>,
    aliasable: bool,
}

/// Table occurrences of one statement, with their aliases.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct AliasMap {
    entries: Vec<AliasEntry>,
}

impl AliasMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an occurrence that may carry an alias.
    pub fn register(&mut self, table: &TableRef) {
        self.insert(table, true);
    }

    /// Register an occurrence that must never be aliased (an INSERT target).
    pub fn register_unaliased(&mut self, table: &TableRef) {
        self.insert(table, false);
    }

    fn insert(&mut self, table: &TableRef, aliasable: bool) {
        if self.position(table).is_some() {
            return;
        }
        self.entries.push(AliasEntry {
            table: table.clone(),
            alias: table.explicit_alias().map(str::to_string),
            aliasable,
        });
    }

    fn position(&self, table: &TableRef) -> Option<usize> {
        self.entries.iter().position(|e| e.table == *table)
    }

    pub fn contains(&self, table: &TableRef) -> bool {
        self.position(table).is_some()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn tables(&self) -> impl Iterator<Item = &TableRef> {
        self.entries.iter().map(|e| &e.table)
    }

    /// Set the alias of a registered occurrence.
    pub fn rename(&mut self, table: &TableRef, alias: impl Into<String>) -> Result<()> {
        let index = self.position(table).ok_or_else(|| {
            Error::statement(
                StatementErrorKind::Incomplete,
                format!("table {} is not part of this statement", table.table().logical()),
            )
        })?;
        let entry = &mut self.entries[index];
        if !entry.aliasable {
            return Err(Error::statement(
                StatementErrorKind::NotAliasable,
                format!(
                    "INSERT target {} cannot carry an alias",
                    entry.table.table().logical()
                ),
            ));
        }
        entry.alias = Some(alias.into());
        Ok(())
    }

    /// Compute the alias of every occurrence, avoiding the `reserved` names
    /// (aliases of enclosing statements).
    ///
    /// Unaliasable occurrences resolve to `None`.
    pub fn resolve(&self, reserved: &HashSet<String>) -> Vec<(TableRef, Option<String>)> {
        let mut taken: HashSet<String> = reserved.clone();
        for entry in &self.entries {
            if let Some(alias) = &entry.alias {
                taken.insert(alias.to_ascii_lowercase());
            }
        }
        self.entries
            .iter()
            .map(|entry| {
                let alias = if !entry.aliasable {
                    None
                } else if let Some(explicit) = &entry.alias {
                    Some(explicit.clone())
                } else {
                    let generated = generate_alias(entry.table.table().logical(), &taken);
                    taken.insert(generated.clone());
                    Some(generated)
                };
                (entry.table.clone(), alias)
            })
            .collect()
    }
}

/// Shortest unused lowercase prefix of `name`, then `name1`, `name2`, ...
fn generate_alias(name: &str, taken: &HashSet<String>) -> String {
    let base: String = name
        .chars()
        .filter(char::is_ascii_alphanumeric)
        .map(|c| c.to_ascii_lowercase())
        .skip_while(char::is_ascii_digit)
        .collect();
    let base = if base.is_empty() { "t".to_string() } else { base };
    let usable = |candidate: &str| !taken.contains(candidate) && !is_reserved(candidate, &[]);

    for end in 1..=base.len() {
        let candidate = &base[..end];
        if usable(candidate) {
            return candidate.to_string();
        }
    }
    (1..)
        .map(|n| format!("{}{}", base, n))
        .find(|candidate| usable(candidate))
        .unwrap_or(base)
}
