//! SELECT builder.
//!
//! `Statement::select(..)` yields a [`SelectBuilder`], whose only way forward
//! is [`SelectBuilder::from`]; the optional clauses hang off the resulting
//! [`SelectFrom`].

use crate::alias::TableRef;
use crate::clause::{Clause, JoinKind, OrderBy};
use crate::expr::Expr;
use crate::statement::{Statement, StatementKind};
use relmap_core::Result;

#[derive(Debug, Clone)]
pub struct SelectBuilder {
    distinct: bool,
    items: Vec<Expr>,
}

impl SelectBuilder {
    pub(crate) fn new(items: Vec<Expr>) -> Self {
        Self {
            distinct: false,
            items,
        }
    }

    pub fn distinct(mut self) -> Self {
        self.distinct = true;
        self
    }

    pub fn from(self, table: TableRef) -> SelectFrom {
        SelectFrom {
            select: self,
            tables: vec![table],
            joins: Vec::new(),
            condition: None,
            group_by: Vec::new(),
            having: None,
            order_by: Vec::new(),
            limit: None,
            offset: None,
        }
    }
}

/// A SELECT with its FROM clause; everything else is optional.
#[derive(Debug, Clone)]
pub struct SelectFrom {
    select: SelectBuilder,
    tables: Vec<TableRef>,
    joins: Vec<(JoinKind, TableRef, Expr)>,
    condition: Option<Expr>,
    group_by: Vec<Expr>,
    having: Option<Expr>,
    order_by: Vec<OrderBy>,
    limit: Option<u64>,
    offset: Option<u64>,
}

impl SelectFrom {
    /// Add another table to the FROM list (cross join).
    pub fn from(mut self, table: TableRef) -> Self {
        self.tables.push(table);
        self
    }

    pub fn join(mut self, table: TableRef, on: Expr) -> Self {
        self.joins.push((JoinKind::Inner, table, on));
        self
    }

    pub fn left_join(mut self, table: TableRef, on: Expr) -> Self {
        self.joins.push((JoinKind::Left, table, on));
        self
    }

    /// Add a WHERE condition, ANDed with earlier ones.
    pub fn filter(mut self, condition: Expr) -> Self {
        self.condition = Some(match self.condition {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn group_by<I>(mut self, items: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.group_by.extend(items);
        self
    }

    pub fn having(mut self, condition: Expr) -> Self {
        self.having = Some(match self.having {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn order_by(mut self, order: OrderBy) -> Self {
        self.order_by.push(order);
        self
    }

    pub fn limit(mut self, n: u64) -> Self {
        self.limit = Some(n);
        self
    }

    pub fn offset(mut self, n: u64) -> Self {
        self.offset = Some(n);
        self
    }

    pub fn build(self) -> Result<Statement> {
        let mut statement = Statement::new(
            StatementKind::Select,
            Clause::Select {
                distinct: self.select.distinct,
                items: self.select.items,
            },
        );
        statement.push(Clause::From(self.tables));
        for (kind, table, on) in self.joins {
            statement.push(Clause::Join { kind, table, on });
        }
        if let Some(condition) = self.condition {
            statement.add_where(condition);
        }
        if !self.group_by.is_empty() {
            statement.push(Clause::GroupBy(self.group_by));
        }
        if let Some(having) = self.having {
            statement.add_having(having);
        }
        if !self.order_by.is_empty() {
            statement.push(Clause::OrderBy(self.order_by));
        }
        if let Some(limit) = self.limit {
            statement.set_limit(limit);
        }
        if let Some(offset) = self.offset {
            statement.set_offset(offset);
        }
        Ok(statement)
    }
}
