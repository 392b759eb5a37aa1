//! Statement clauses.
//!
//! A statement is a list of clauses kept in canonical order (see
//! [`Clause::rank`]), so optional clauses can be added in any order after the
//! skeleton exists and still render where SQL expects them.

use crate::alias::TableRef;
use crate::ddl::{IndexSpec, TableOperation, TableSpec};
use crate::expr::Expr;

/// Sort direction.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OrderDirection {
    #[default]
    Asc,
    Desc,
}

/// NULLS FIRST/LAST ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NullsOrder {
    First,
    Last,
}

/// One ORDER BY item.
#[derive(Debug, Clone, PartialEq)]
pub struct OrderBy {
    pub expr: Expr,
    pub direction: OrderDirection,
    pub nulls: Option<NullsOrder>,
}

impl OrderBy {
    pub fn asc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: OrderDirection::Asc,
            nulls: None,
        }
    }

    pub fn desc(expr: impl Into<Expr>) -> Self {
        Self {
            expr: expr.into(),
            direction: OrderDirection::Desc,
            nulls: None,
        }
    }

    pub fn nulls_first(mut self) -> Self {
        self.nulls = Some(NullsOrder::First);
        self
    }

    pub fn nulls_last(mut self) -> Self {
        self.nulls = Some(NullsOrder::Last);
        self
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JoinKind {
    Inner,
    Left,
}

impl JoinKind {
    pub const fn keyword(self) -> &'static str {
        match self {
            JoinKind::Inner => "JOIN",
            JoinKind::Left => "LEFT JOIN",
        }
    }
}

/// `column = value` in SET and MERGE ... UPDATE SET.
#[derive(Debug, Clone, PartialEq)]
pub struct Assignment {
    pub column: Expr,
    pub value: Expr,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Clause {
    // ---- start clauses ----
    Select {
        distinct: bool,
        items: Vec<Expr>,
    },
    Insert {
        target: TableRef,
        columns: Vec<Expr>,
    },
    Update {
        target: TableRef,
    },
    Delete {
        target: TableRef,
    },
    Merge {
        target: TableRef,
        source: TableRef,
        on: Expr,
    },
    Upsert {
        target: TableRef,
        keys: Vec<Expr>,
        columns: Vec<Expr>,
    },
    CreateTable(TableSpec),
    AlterTable {
        table: TableSpec,
        operations: Vec<TableOperation>,
    },
    DropTable {
        table: TableSpec,
        if_exists: bool,
    },
    CreateIndex(IndexSpec),
    DropIndex(IndexSpec),

    // ---- body ----
    Set(Vec<Assignment>),
    Values(Vec<Vec<Expr>>),
    From(Vec<TableRef>),
    Join {
        kind: JoinKind,
        table: TableRef,
        on: Expr,
    },
    Where(Expr),
    GroupBy(Vec<Expr>),
    Having(Expr),
    OrderBy(Vec<OrderBy>),
    Limit(u64),
    Offset(u64),
    WhenMatched(Vec<Assignment>),
    WhenNotMatched {
        columns: Vec<Expr>,
        values: Vec<Expr>,
    },
}

impl Clause {
    /// Canonical position; clauses are kept sorted by rank (stable).
    pub const fn rank(&self) -> u8 {
        match self {
            Clause::Select { .. }
            | Clause::Insert { .. }
            | Clause::Update { .. }
            | Clause::Delete { .. }
            | Clause::Merge { .. }
            | Clause::Upsert { .. }
            | Clause::CreateTable(_)
            | Clause::AlterTable { .. }
            | Clause::DropTable { .. }
            | Clause::CreateIndex(_)
            | Clause::DropIndex(_) => 0,
            Clause::From(_) => 1,
            Clause::Join { .. } => 2,
            Clause::Set(_) => 3,
            Clause::Values(_) => 4,
            Clause::WhenMatched(_) => 5,
            Clause::WhenNotMatched { .. } => 6,
            Clause::Where(_) => 7,
            Clause::GroupBy(_) => 8,
            Clause::Having(_) => 9,
            Clause::OrderBy(_) => 10,
            Clause::Limit(_) => 11,
            Clause::Offset(_) => 12,
        }
    }

    /// Clause name for diagnostics.
    pub const fn name(&self) -> &'static str {
        match self {
            Clause::Select { .. } => "SELECT",
            Clause::Insert { .. } => "INSERT",
            Clause::Update { .. } => "UPDATE",
            Clause::Delete { .. } => "DELETE",
            Clause::Merge { .. } => "MERGE",
            Clause::Upsert { .. } => "UPSERT",
            Clause::CreateTable(_) => "CREATE TABLE",
            Clause::AlterTable { .. } => "ALTER TABLE",
            Clause::DropTable { .. } => "DROP TABLE",
            Clause::CreateIndex(_) => "CREATE INDEX",
            Clause::DropIndex(_) => "DROP INDEX",
            Clause::Set(_) => "SET",
            Clause::Values(_) => "VALUES",
            Clause::From(_) => "FROM",
            Clause::Join { .. } => "JOIN",
            Clause::Where(_) => "WHERE",
            Clause::GroupBy(_) => "GROUP BY",
            Clause::Having(_) => "HAVING",
            Clause::OrderBy(_) => "ORDER BY",
            Clause::Limit(_) => "LIMIT",
            Clause::Offset(_) => "OFFSET",
            Clause::WhenMatched(_) => "WHEN MATCHED",
            Clause::WhenNotMatched { .. } => "WHEN NOT MATCHED",
        }
    }

    /// Expressions directly owned by this clause, in render order.
    pub fn expressions(&self) -> Vec<&Expr> {
        match self {
            Clause::Select { items, .. } | Clause::GroupBy(items) => items.iter().collect(),
            Clause::Insert { columns, .. } => columns.iter().collect(),
            Clause::Upsert { keys, columns, .. } => keys.iter().chain(columns).collect(),
            Clause::Merge { on, .. } | Clause::Join { on, .. } => vec![on],
            Clause::Set(assignments) | Clause::WhenMatched(assignments) => assignments
                .iter()
                .flat_map(|a| [&a.column, &a.value])
                .collect(),
            Clause::Values(rows) => rows.iter().flatten().collect(),
            Clause::WhenNotMatched { columns, values } => columns.iter().chain(values).collect(),
            Clause::Where(e) | Clause::Having(e) => vec![e],
            Clause::OrderBy(items) => items.iter().map(|o| &o.expr).collect(),
            _ => Vec::new(),
        }
    }
}
