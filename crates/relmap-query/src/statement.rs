//! Statement root.

use crate::alias::{AliasMap, TableRef};
use crate::builder::{DeleteBuilder, InsertBuilder, MergeBuilder, UpdateBuilder, UpsertBuilder};
use crate::clause::{Clause, OrderBy};
use crate::ddl::{IndexSpec, TableOperation, TableSpec};
use crate::expr::Expr;
use crate::select::SelectBuilder;
use crate::table::{AlterTableBuilder, CreateTableBuilder, DropTableBuilder};
use relmap_core::error::StatementErrorKind;
use relmap_core::{Error, Result};

/// Which SQL statement a [`Statement`] is.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StatementKind {
    Select,
    Insert,
    Update,
    Delete,
    Merge,
    Upsert,
    CreateTable,
    AlterTable,
    DropTable,
    CreateIndex,
    DropIndex,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatementCategory {
    Query,
    Dml,
    Ddl,
}

impl StatementKind {
    pub const fn category(self) -> StatementCategory {
        match self {
            StatementKind::Select => StatementCategory::Query,
            StatementKind::Insert
            | StatementKind::Update
            | StatementKind::Delete
            | StatementKind::Merge
            | StatementKind::Upsert => StatementCategory::Dml,
            StatementKind::CreateTable
            | StatementKind::AlterTable
            | StatementKind::DropTable
            | StatementKind::CreateIndex
            | StatementKind::DropIndex => StatementCategory::Ddl,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            StatementKind::Select => "select",
            StatementKind::Insert => "insert",
            StatementKind::Update => "update",
            StatementKind::Delete => "delete",
            StatementKind::Merge => "merge",
            StatementKind::Upsert => "upsert",
            StatementKind::CreateTable => "create_table",
            StatementKind::AlterTable => "alter_table",
            StatementKind::DropTable => "drop_table",
            StatementKind::CreateIndex => "create_index",
            StatementKind::DropIndex => "drop_index",
        }
    }
}

/// One complete statement: a start clause, body clauses in canonical order,
/// and the table occurrences it references.
///
/// Formatting never mutates a statement; the same statement can be rendered
/// any number of times, by any dialect.
#[derive(Debug, Clone, PartialEq)]
pub struct Statement {
    kind: StatementKind,
    clauses: Vec<Clause>,
    aliases: AliasMap,
}

impl Statement {
    pub(crate) fn new(kind: StatementKind, start: Clause) -> Self {
        let mut statement = Self {
            kind,
            clauses: Vec::new(),
            aliases: AliasMap::new(),
        };
        statement.push(start);
        statement
    }

    // ==================== Entry points ====================

    /// `SELECT items`; an empty item list selects `*`.
    pub fn select<I>(items: I) -> SelectBuilder
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        SelectBuilder::new(items.into_iter().map(Into::into).collect())
    }

    /// `SELECT *`
    pub fn select_all() -> SelectBuilder {
        SelectBuilder::new(Vec::new())
    }

    pub fn insert_into(target: TableRef) -> InsertBuilder {
        InsertBuilder::new(target)
    }

    pub fn update(target: TableRef) -> UpdateBuilder {
        UpdateBuilder::new(target)
    }

    pub fn delete_from(target: TableRef) -> DeleteBuilder {
        DeleteBuilder::new(target)
    }

    pub fn merge_into(target: TableRef, source: TableRef, on: Expr) -> MergeBuilder {
        MergeBuilder::new(target, source, on)
    }

    pub fn upsert(target: TableRef) -> UpsertBuilder {
        UpsertBuilder::new(target)
    }

    pub fn create_table(table: TableSpec) -> CreateTableBuilder {
        CreateTableBuilder::new(table)
    }

    pub fn alter_table(table: TableSpec) -> AlterTableBuilder {
        AlterTableBuilder::new(table)
    }

    pub fn drop_table(table: TableSpec) -> DropTableBuilder {
        DropTableBuilder::new(table)
    }

    pub fn create_index(index: IndexSpec) -> Self {
        Self::new(StatementKind::CreateIndex, Clause::CreateIndex(index))
    }

    pub fn drop_index(index: IndexSpec) -> Self {
        Self::new(StatementKind::DropIndex, Clause::DropIndex(index))
    }

    // ==================== Accessors ====================

    pub fn kind(&self) -> StatementKind {
        self.kind
    }

    pub fn category(&self) -> StatementCategory {
        self.kind.category()
    }

    /// Clauses in render order; the start clause comes first.
    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    pub fn aliases(&self) -> &AliasMap {
        &self.aliases
    }

    pub fn where_clause(&self) -> Option<&Expr> {
        self.clauses.iter().find_map(|c| match c {
            Clause::Where(e) => Some(e),
            _ => None,
        })
    }

    /// Operations of an ALTER TABLE, in accumulation order.
    pub fn table_operations(&self) -> &[TableOperation] {
        match self.clauses.first() {
            Some(Clause::AlterTable { operations, .. }) => operations,
            _ => &[],
        }
    }

    // ==================== Optional clauses ====================

    /// Add a clause at its canonical position, after existing clauses of the
    /// same rank.
    pub(crate) fn push(&mut self, clause: Clause) {
        match &clause {
            Clause::Insert { target, .. } | Clause::Upsert { target, .. } => {
                self.aliases.register_unaliased(target);
            }
            Clause::Update { target } | Clause::Delete { target } => self.aliases.register(target),
            Clause::Merge { target, source, .. } => {
                self.aliases.register(target);
                self.aliases.register(source);
            }
            Clause::From(tables) => {
                for table in tables {
                    self.aliases.register(table);
                }
            }
            Clause::Join { table, .. } => self.aliases.register(table),
            _ => {}
        }
        let rank = clause.rank();
        let position = self.clauses.partition_point(|c| c.rank() <= rank);
        tracing::trace!(kind = self.kind.as_str(), clause = clause.name(), position, "add clause");
        self.clauses.insert(position, clause);
    }

    /// Add a WHERE condition, ANDed with any existing one.
    pub fn add_where(&mut self, condition: Expr) -> &mut Self {
        let existing = self.clauses.iter_mut().find_map(|c| match c {
            Clause::Where(e) => Some(e),
            _ => None,
        });
        match existing {
            Some(current) => {
                let previous = std::mem::replace(current, Expr::Raw(String::new()));
                *current = previous.and(condition);
            }
            None => self.push(Clause::Where(condition)),
        }
        self
    }

    /// Add a HAVING condition, ANDed with any existing one.
    pub fn add_having(&mut self, condition: Expr) -> &mut Self {
        let existing = self.clauses.iter_mut().find_map(|c| match c {
            Clause::Having(e) => Some(e),
            _ => None,
        });
        match existing {
            Some(current) => {
                let previous = std::mem::replace(current, Expr::Raw(String::new()));
                *current = previous.and(condition);
            }
            None => self.push(Clause::Having(condition)),
        }
        self
    }

    pub fn add_order_by(&mut self, order: OrderBy) -> &mut Self {
        match self.clauses.iter_mut().find_map(|c| match c {
            Clause::OrderBy(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(order),
            None => self.push(Clause::OrderBy(vec![order])),
        }
        self
    }

    pub fn add_group_by(&mut self, expr: Expr) -> &mut Self {
        match self.clauses.iter_mut().find_map(|c| match c {
            Clause::GroupBy(items) => Some(items),
            _ => None,
        }) {
            Some(items) => items.push(expr),
            None => self.push(Clause::GroupBy(vec![expr])),
        }
        self
    }

    pub fn set_limit(&mut self, limit: u64) -> &mut Self {
        self.clauses.retain(|c| !matches!(c, Clause::Limit(_)));
        self.push(Clause::Limit(limit));
        self
    }

    pub fn set_offset(&mut self, offset: u64) -> &mut Self {
        self.clauses.retain(|c| !matches!(c, Clause::Offset(_)));
        self.push(Clause::Offset(offset));
        self
    }

    /// Rename the alias of a table occurrence of this statement.
    ///
    /// INSERT and UPSERT targets are never aliased and fail with
    /// `NotAliasable`.
    pub fn set_alias(&mut self, table: &TableRef, alias: impl Into<String>) -> Result<()> {
        self.aliases.rename(table, alias)
    }

    /// Append an ALTER TABLE operation. Operations render in the order they
    /// were added; duplicates are kept.
    pub fn add_table_operation(&mut self, operation: TableOperation) -> Result<&mut Self> {
        match self.clauses.first_mut() {
            Some(Clause::AlterTable { operations, .. }) => {
                operations.push(operation);
                Ok(self)
            }
            _ => Err(Error::statement(
                StatementErrorKind::Incomplete,
                format!("{} statement has no table operations", self.kind.as_str()),
            )),
        }
    }
}
