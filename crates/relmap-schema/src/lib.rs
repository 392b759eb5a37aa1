//! Entity-driven statement derivation for relmap.
//!
//! Given an [`Entity`] and a [`Dialect`], this crate derives the statements
//! an application needs to keep the entity's table and rows in sync:
//!
//! - **DDL**: `CREATE TABLE` with foreign-key, not-null and primary-key
//!   constraints (in that order), one index per `unique`/`indexed` property,
//!   `DROP TABLE`.
//! - **DML**: insert, optimistic-lock update, delete by id and a select of
//!   every mapped column in row order.
//!
//! The free functions below build an [`EntitySchema`] for a single call;
//! keep one around when deriving several statements for the same entity.

pub mod create;
pub mod dml;
pub mod schema;

#[cfg(test)]
pub(crate) mod fixtures;

pub use schema::EntitySchema;

use relmap_core::{Entity, Result};
use relmap_dialect::Dialect;
use relmap_query::{SelectFrom, Statement, TableName, TableSpec};

/// `CREATE TABLE` for `E`, with derived constraints.
pub fn create_table<E: Entity>(dialect: &Dialect) -> Result<Statement> {
    EntitySchema::<E>::new(dialect)?.create_table()
}

/// `DROP TABLE` for `E`.
pub fn drop_table<E: Entity>(if_exists: bool) -> Result<Statement> {
    let builder = Statement::drop_table(TableSpec::new(TableName::of::<E>()));
    if if_exists {
        builder.if_exists().build()
    } else {
        builder.build()
    }
}

/// `CREATE [UNIQUE] INDEX` for each unique or indexed property of `E`.
pub fn create_indices<E: Entity>(dialect: &Dialect) -> Result<Vec<Statement>> {
    Ok(EntitySchema::<E>::new(dialect)?.create_indices())
}

pub fn insert_entity<E: Entity>(dialect: &Dialect, entity: &E) -> Result<Statement> {
    EntitySchema::<E>::new(dialect)?.insert(entity)
}

pub fn update_entity<E: Entity>(dialect: &Dialect, entity: &E) -> Result<Statement> {
    EntitySchema::<E>::new(dialect)?.update(entity)
}

pub fn delete_entity<E: Entity>(dialect: &Dialect, entity: &E) -> Result<Statement> {
    EntitySchema::<E>::new(dialect)?.delete(entity)
}

/// `SELECT` of every column of `E`; add filters, ordering or paging before
/// building.
pub fn select_entities<E: Entity>(dialect: &Dialect) -> Result<SelectFrom> {
    Ok(EntitySchema::<E>::new(dialect)?.select())
}
