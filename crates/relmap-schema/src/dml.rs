//! Row-level statements for one entity value.

use crate::schema::EntitySchema;
use relmap_core::error::StatementErrorKind;
use relmap_core::{Entity, Error, Result};
use relmap_query::{Expr, SelectFrom, Statement};

impl<E: Entity> EntitySchema<E> {
    /// `INSERT INTO t(every column) VALUES (...)`
    pub fn insert(&self, entity: &E) -> Result<Statement> {
        self.column_values(entity)?
            .into_iter()
            .fold(Statement::insert_into(self.table_ref()), |insert, (column, value)| {
                insert.set(Expr::col(column.name.as_str()), value)
            })
            .build()
    }

    /// Optimistic-lock update: every non-id column is assigned, the revision
    /// column (if any) is incremented, and the row must still carry the
    /// entity's id and revision.
    pub fn update(&self, entity: &E) -> Result<Statement> {
        self.id_mapping()?;
        let revision = self.revision_column();
        let mut update = Statement::update(self.table_ref());
        let mut keys = Vec::new();
        for (column, value) in self.column_values(entity)? {
            if self.is_id_column(&column.name) {
                keys.push(Expr::col(column.name.as_str()).eq(value));
            } else {
                update = update.set(Expr::col(column.name.as_str()), value);
            }
        }
        if let Some(rev) = revision {
            update = update.set(Expr::col(rev.as_str()), Expr::col(rev.as_str()).add(Expr::raw("1")));
        }
        keys.into_iter()
            .fold(update, |update, key| update.filter(key))
            .build()
    }

    /// `DELETE FROM t WHERE ID = ?`
    pub fn delete(&self, entity: &E) -> Result<Statement> {
        let key = self.key_condition(entity)?;
        Statement::delete_from(self.table_ref()).filter(key).build()
    }

    /// `SELECT` of every mapped column, in row order, from the entity's table.
    ///
    /// The result rows feed straight into [`relmap_mapping::BeanMapper::from_row`].
    pub fn select(&self) -> SelectFrom {
        let table = self.table_ref();
        let columns: Vec<Expr> = self
            .mapper()
            .column_names()
            .map(|name| table.col(name))
            .collect();
        Statement::select(columns).from(table)
    }

    /// `SELECT ... WHERE ID = ?` for the entity's current id.
    pub fn select_by_id(&self, entity: &E) -> Result<Statement> {
        let key = self.key_condition(entity)?;
        self.select().filter(key).build()
    }

    /// The second id column, when the id carries a revision.
    fn revision_column(&self) -> Option<String> {
        self.id_columns().get(1).map(|c| c.name.clone())
    }

    fn key_condition(&self, entity: &E) -> Result<Expr> {
        let key = self.id_mapping()?.columns().first().map(|c| c.name.clone());
        self.column_values(entity)?
            .into_iter()
            .find(|(column, _)| Some(&column.name) == key.as_ref())
            .map(|(column, value)| Expr::col(column.name.as_str()).eq(value))
            .ok_or_else(|| {
                Error::statement(
                    StatementErrorKind::Incomplete,
                    format!("entity {} has no id column", E::NAME),
                )
            })
    }
}
