//! Physical layout of one entity under one dialect.

use relmap_core::error::StatementErrorKind;
use relmap_core::{Entity, Error, Result, TypeShape, Value};
use relmap_dialect::Dialect;
use relmap_mapping::{BeanMapper, ColumnDescriptor, PropertyMapping};
use relmap_query::{ColumnSpec, Expr, TableName, TableRef};

/// An entity's table, columns and mapping tree, resolved against a dialect.
///
/// Statements derived from it use physical column names, so they should be
/// formatted with the same dialect.
#[derive(Debug, Clone)]
pub struct EntitySchema<E> {
    dialect: Dialect,
    mapper: BeanMapper<E>,
}

impl<E: Entity> EntitySchema<E> {
    pub fn new(dialect: &Dialect) -> Result<Self> {
        let mapper = dialect.bean_mapper::<E>()?;
        tracing::debug!(
            entity = E::NAME,
            dialect = dialect.id(),
            columns = mapper.columns().len(),
            "resolved entity schema"
        );
        Ok(Self {
            dialect: dialect.clone(),
            mapper,
        })
    }

    pub fn dialect(&self) -> &Dialect {
        &self.dialect
    }

    pub fn mapper(&self) -> &BeanMapper<E> {
        &self.mapper
    }

    pub fn table_name(&self) -> TableName {
        TableName::of::<E>()
    }

    /// A fresh occurrence of the entity's table.
    pub fn table_ref(&self) -> TableRef {
        TableRef::entity::<E>()
    }

    /// Physical table name under the dialect's naming strategy.
    pub fn physical_table(&self) -> String {
        self.table_name().resolve(self.dialect.naming())
    }

    /// Mapping of the id property; an entity without one cannot be updated,
    /// deleted or given a primary key.
    pub(crate) fn id_mapping(&self) -> Result<&PropertyMapping> {
        self.mapper.id_property().ok_or_else(|| {
            Error::statement(
                StatementErrorKind::Incomplete,
                format!("entity {} declares no id property", E::NAME),
            )
        })
    }

    /// Column names of the id property (`ID`, or `ID` and `REV`).
    pub(crate) fn id_columns(&self) -> Vec<&ColumnDescriptor> {
        self.mapper
            .id_property()
            .map(PropertyMapping::columns)
            .unwrap_or_default()
    }

    pub(crate) fn is_id_column(&self, name: &str) -> bool {
        self.id_columns().iter().any(|c| c.name == name)
    }

    /// Referenced table of a foreign-key property, if it is one.
    pub(crate) fn referenced_table(mapping: &PropertyMapping) -> Option<TableName> {
        match mapping.property.descriptor().shape {
            TypeShape::Reference { entity, table, .. } => Some(
                table.map_or(TableName::Entity(entity), |t| {
                    TableName::Explicit(t.to_string())
                }),
            ),
            TypeShape::Scalar | TypeShape::Embedded(_) => None,
        }
    }

    /// Each column of `entity` with its value, in mapper order, as typed
    /// literals.
    pub(crate) fn column_values(&self, entity: &E) -> Result<Vec<(&ColumnDescriptor, Expr)>> {
        let row = self.mapper.to_row(entity)?;
        Ok(self
            .mapper
            .columns()
            .iter()
            .zip(row.into_values())
            .map(|(column, value)| (column, literal(column, value)))
            .collect())
    }
}

/// DDL column for a mapped column. Nullability is left to the caller.
pub(crate) fn column_spec(column: &ColumnDescriptor) -> ColumnSpec {
    ColumnSpec::named(column.name.clone(), column.sql_type.clone())
}

fn literal(column: &ColumnDescriptor, value: Value) -> Expr {
    if value.is_null() {
        Expr::null()
    } else {
        Expr::typed(value, column.sql_type.clone())
    }
}
