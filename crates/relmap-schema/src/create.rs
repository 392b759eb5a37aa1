//! Table and index DDL derived from an entity.

use crate::schema::{EntitySchema, column_spec};
use relmap_core::{Entity, Result};
use relmap_query::{
    ColumnSpec, ConstraintSpec, DropTableBuilder, IndexSpec, Statement, TableSpec,
};

impl<E: Entity> EntitySchema<E> {
    /// Columns in mapper order, then constraints: foreign keys, not-null
    /// checks, primary key.
    ///
    /// Id columns carry an inline `NOT NULL`; every other non-nullable column
    /// gets a named `NN_` constraint instead.
    pub fn table_spec(&self) -> Result<TableSpec> {
        let naming = self.dialect().naming();
        let mut spec = TableSpec::new(self.table_name());
        for column in self.mapper().columns() {
            let id = self.is_id_column(&column.name);
            spec = spec.column(column_spec(column).nullable(!id && column.nullable));
        }

        for mapping in self.mapper().properties() {
            let Some(references) = Self::referenced_table(mapping) else {
                continue;
            };
            let Some(key) = mapping.columns().first().copied() else {
                continue;
            };
            let referenced = ColumnSpec::named(naming.column_name(&["id"]), key.sql_type.clone());
            spec = spec.constraint(ConstraintSpec::foreign_key(
                vec![column_spec(key)],
                references,
                vec![referenced],
            ));
        }

        for column in self.mapper().columns() {
            if !column.nullable && !self.is_id_column(&column.name) {
                spec = spec.constraint(ConstraintSpec::not_null(column_spec(column)));
            }
        }

        if let Some(key) = self.id_mapping()?.columns().first().copied() {
            spec = spec.constraint(ConstraintSpec::primary_key(vec![
                column_spec(key).not_null(),
            ]));
        }
        tracing::trace!(
            entity = E::NAME,
            columns = spec.columns.len(),
            constraints = spec.constraints.len(),
            "derived table"
        );
        Ok(spec)
    }

    pub fn create_table(&self) -> Result<Statement> {
        Statement::create_table(self.table_spec()?).build()
    }

    pub fn drop_table(&self) -> DropTableBuilder {
        Statement::drop_table(TableSpec::new(self.table_name()))
    }

    /// One index per property flagged unique or indexed, over all of the
    /// property's columns.
    pub fn indices(&self) -> Vec<IndexSpec> {
        self.mapper()
            .properties()
            .iter()
            .filter(|m| m.property.unique || m.property.indexed)
            .map(|m| {
                IndexSpec::new(
                    self.table_name(),
                    m.columns().into_iter().map(column_spec).collect(),
                    m.property.unique,
                )
            })
            .collect()
    }

    pub fn create_indices(&self) -> Vec<Statement> {
        self.indices()
            .into_iter()
            .map(Statement::create_index)
            .collect()
    }

    pub fn drop_indices(&self) -> Vec<Statement> {
        self.indices()
            .into_iter()
            .map(Statement::drop_index)
            .collect()
    }
}
