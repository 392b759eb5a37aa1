//! Fluent builders for INSERT, UPDATE, DELETE, MERGE and UPSERT.
//!
//! Each builder starts from the statement's mandatory target and checks in
//! `build()` that the remaining mandatory clauses were supplied.

use crate::alias::TableRef;
use crate::clause::{Assignment, Clause};
use crate::expr::Expr;
use crate::statement::{Statement, StatementKind};
use relmap_core::error::StatementErrorKind;
use relmap_core::{Error, Result};

fn incomplete(what: &str) -> Error {
    Error::statement(StatementErrorKind::Incomplete, what.to_string())
}

fn check_row_widths(columns: &[Expr], rows: &[Vec<Expr>]) -> Result<()> {
    if let Some(row) = rows.iter().find(|r| r.len() != columns.len()) {
        return Err(Error::statement(
            StatementErrorKind::Arity,
            format!(
                "VALUES row has {} entries for {} columns",
                row.len(),
                columns.len()
            ),
        ));
    }
    Ok(())
}

/// INSERT builder.
///
/// Either assign columns one by one with [`InsertBuilder::set`], or give a
/// column list and any number of value rows.
#[derive(Debug, Clone)]
pub struct InsertBuilder {
    target: TableRef,
    columns: Vec<Expr>,
    rows: Vec<Vec<Expr>>,
}

impl InsertBuilder {
    pub fn new(target: TableRef) -> Self {
        Self {
            target,
            columns: Vec::new(),
            rows: Vec::new(),
        }
    }

    /// Add one `column = value` pair to the single VALUES row.
    pub fn set(mut self, column: Expr, value: impl Into<Expr>) -> Self {
        self.columns.push(column);
        match self.rows.first_mut() {
            Some(row) => row.push(value.into()),
            None => self.rows.push(vec![value.into()]),
        }
        self
    }

    pub fn columns<I>(mut self, columns: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.columns.extend(columns);
        self
    }

    /// Add one VALUES row.
    pub fn values<I>(mut self, row: I) -> Self
    where
        I: IntoIterator,
        I::Item: Into<Expr>,
    {
        self.rows.push(row.into_iter().map(Into::into).collect());
        self
    }

    pub fn build(self) -> Result<Statement> {
        if let Some(alias) = self.target.explicit_alias() {
            return Err(Error::statement(
                StatementErrorKind::NotAliasable,
                format!(
                    "INSERT target {} cannot carry alias {}",
                    self.target.table().logical(),
                    alias
                ),
            ));
        }
        if self.columns.is_empty() || self.rows.is_empty() {
            return Err(incomplete("INSERT needs at least one column and one VALUES row"));
        }
        check_row_widths(&self.columns, &self.rows)?;
        let mut statement = Statement::new(
            StatementKind::Insert,
            Clause::Insert {
                target: self.target,
                columns: self.columns,
            },
        );
        statement.push(Clause::Values(self.rows));
        Ok(statement)
    }
}

#[derive(Debug, Clone)]
pub struct UpdateBuilder {
    target: TableRef,
    assignments: Vec<Assignment>,
    condition: Option<Expr>,
}

impl UpdateBuilder {
    pub fn new(target: TableRef) -> Self {
        Self {
            target,
            assignments: Vec::new(),
            condition: None,
        }
    }

    pub fn set(mut self, column: Expr, value: impl Into<Expr>) -> Self {
        self.assignments.push(Assignment {
            column,
            value: value.into(),
        });
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

    pub fn build(self) -> Result<Statement> {
        if self.assignments.is_empty() {
            return Err(incomplete("UPDATE needs at least one SET assignment"));
        }
        let mut statement = Statement::new(
            StatementKind::Update,
            Clause::Update {
                target: self.target,
            },
        );
        statement.push(Clause::Set(self.assignments));
        if let Some(condition) = self.condition {
            statement.add_where(condition);
        }
        Ok(statement)
    }
}

#[derive(Debug, Clone)]
pub struct DeleteBuilder {
    target: TableRef,
    condition: Option<Expr>,
}

impl DeleteBuilder {
    pub fn new(target: TableRef) -> Self {
        Self {
            target,
            condition: None,
        }
    }

    pub fn filter(mut self, condition: Expr) -> Self {
        self.condition = Some(match self.condition {
            Some(existing) => existing.and(condition),
            None => condition,
        });
        self
    }

    pub fn build(self) -> Result<Statement> {
        let mut statement = Statement::new(
            StatementKind::Delete,
            Clause::Delete {
                target: self.target,
            },
        );
        if let Some(condition) = self.condition {
            statement.add_where(condition);
        }
        Ok(statement)
    }
}

/// `MERGE INTO target USING source ON ... WHEN [NOT] MATCHED ...`
#[derive(Debug, Clone)]
pub struct MergeBuilder {
    target: TableRef,
    source: TableRef,
    on: Expr,
    matched: Vec<Assignment>,
    not_matched: Option<(Vec<Expr>, Vec<Expr>)>,
}

impl MergeBuilder {
    pub fn new(target: TableRef, source: TableRef, on: Expr) -> Self {
        Self {
            target,
            source,
            on,
            matched: Vec::new(),
            not_matched: None,
        }
    }

    /// `WHEN MATCHED THEN UPDATE SET column = value`
    pub fn when_matched_set(mut self, column: Expr, value: impl Into<Expr>) -> Self {
        self.matched.push(Assignment {
            column,
            value: value.into(),
        });
        self
    }

    /// `WHEN NOT MATCHED THEN INSERT (columns) VALUES (values)`
    pub fn when_not_matched_insert<C, V>(mut self, columns: C, values: V) -> Self
    where
        C: IntoIterator<Item = Expr>,
        V: IntoIterator,
        V::Item: Into<Expr>,
    {
        self.not_matched = Some((
            columns.into_iter().collect(),
            values.into_iter().map(Into::into).collect(),
        ));
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.matched.is_empty() && self.not_matched.is_none() {
            return Err(incomplete("MERGE needs a WHEN MATCHED or WHEN NOT MATCHED action"));
        }
        let mut statement = Statement::new(
            StatementKind::Merge,
            Clause::Merge {
                target: self.target,
                source: self.source,
                on: self.on,
            },
        );
        if !self.matched.is_empty() {
            statement.push(Clause::WhenMatched(self.matched));
        }
        if let Some((columns, values)) = self.not_matched {
            check_row_widths(&columns, std::slice::from_ref(&values))?;
            statement.push(Clause::WhenNotMatched { columns, values });
        }
        Ok(statement)
    }
}

/// Insert-or-update keyed on `keys`. Rendering is dialect specific.
#[derive(Debug, Clone)]
pub struct UpsertBuilder {
    target: TableRef,
    keys: Vec<Expr>,
    columns: Vec<Expr>,
    values: Vec<Expr>,
}

impl UpsertBuilder {
    pub fn new(target: TableRef) -> Self {
        Self {
            target,
            keys: Vec::new(),
            columns: Vec::new(),
            values: Vec::new(),
        }
    }

    /// Conflict key columns. They must also be assigned with `set`.
    pub fn keys<I>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = Expr>,
    {
        self.keys.extend(keys);
        self
    }

    pub fn set(mut self, column: Expr, value: impl Into<Expr>) -> Self {
        self.columns.push(column);
        self.values.push(value.into());
        self
    }

    pub fn build(self) -> Result<Statement> {
        if self.keys.is_empty() || self.columns.is_empty() {
            return Err(incomplete("UPSERT needs key columns and assignments"));
        }
        if let Some(key) = self.keys.iter().find(|k| !self.columns.contains(k)) {
            return Err(incomplete(&format!("UPSERT key {key:?} is not assigned")));
        }
        let mut statement = Statement::new(
            StatementKind::Upsert,
            Clause::Upsert {
                target: self.target,
                keys: self.keys,
                columns: self.columns,
            },
        );
        statement.push(Clause::Values(vec![self.values]));
        Ok(statement)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn is_kind(err: &Error, kind: StatementErrorKind) -> bool {
        matches!(err, Error::Statement(s) if s.kind == kind)
    }

    #[test]
    fn insert_collects_one_row_from_assignments() {
        let statement = Statement::insert_into(TableRef::new("Person"))
            .set(Expr::col("Name"), "John Doe")
            .set(Expr::col("Single"), true)
            .build()
            .unwrap();
        assert_eq!(statement.kind(), StatementKind::Insert);
        match &statement.clauses()[1] {
            Clause::Values(rows) => {
                assert_eq!(rows.len(), 1);
                assert_eq!(rows[0], vec![Expr::lit("John Doe"), Expr::lit(true)]);
            }
            other => panic!("unexpected {other:?}"),
        }
    }

    #[test]
    fn insert_rejects_aliases_and_ragged_rows() {
        let aliased = Statement::insert_into(TableRef::new("Person").alias("p"))
            .set(Expr::col("Name"), "x")
            .build()
            .unwrap_err();
        assert!(is_kind(&aliased, StatementErrorKind::NotAliasable));

        let ragged = Statement::insert_into(TableRef::new("Person"))
            .columns([Expr::col("A"), Expr::col("B")])
            .values([1, 2])
            .values([3])
            .build()
            .unwrap_err();
        assert!(is_kind(&ragged, StatementErrorKind::Arity));

        let empty = Statement::insert_into(TableRef::new("Person")).build().unwrap_err();
        assert!(is_kind(&empty, StatementErrorKind::Incomplete));
    }

    #[test]
    fn update_requires_assignments() {
        let err = Statement::update(TableRef::new("Person"))
            .filter(Expr::col("ID").eq(1))
            .build()
            .unwrap_err();
        assert!(is_kind(&err, StatementErrorKind::Incomplete));

        let person = TableRef::new("Person");
        let statement = Statement::update(person.clone())
            .set(Expr::col("Name"), "x")
            .filter(person.col("ID").eq(1))
            .filter(person.col("REV").eq(2))
            .build()
            .unwrap();
        let names: Vec<_> = statement.clauses().iter().map(Clause::name).collect();
        assert_eq!(names, ["UPDATE", "SET", "WHERE"]);
    }

    #[test]
    fn merge_needs_an_action() {
        let target = TableRef::new("Person");
        let source = TableRef::new("Staging");
        let on = target.col("ID").eq(source.col("ID"));
        assert!(
            Statement::merge_into(target.clone(), source.clone(), on.clone())
                .build()
                .is_err()
        );
        let statement = Statement::merge_into(target, source.clone(), on)
            .when_matched_set(Expr::col("Name"), source.col("Name"))
            .when_not_matched_insert([Expr::col("ID")], [source.col("ID")])
            .build()
            .unwrap();
        assert_eq!(statement.aliases().len(), 2);
        assert_eq!(statement.clauses().len(), 3);
    }

    #[test]
    fn upsert_keys_must_be_assigned() {
        let err = Statement::upsert(TableRef::new("City"))
            .keys([Expr::col("ID")])
            .set(Expr::col("NAME"), "Bern")
            .build()
            .unwrap_err();
        assert!(is_kind(&err, StatementErrorKind::Incomplete));

        let ok = Statement::upsert(TableRef::new("City"))
            .keys([Expr::col("ID")])
            .set(Expr::col("ID"), 1)
            .set(Expr::col("NAME"), "Bern")
            .build();
        assert!(ok.is_ok());
    }
}
