//! relmap - database-agnostic statement construction and object-relational
//! mapping.
//!
//! relmap builds SQL statements as typed trees, renders them for a chosen
//! database dialect with bound parameters, and converts entity values to flat
//! rows and back through a per-dialect type-mapping tree. Executing the SQL is
//! left to whatever driver the application uses: a [`FormattedStatement`]
//! exposes the text and the parameters in binding order, and rows come back
//! as [`Row`]s.
//!
//! - **Entities**: `#[derive(Entity)]` / `#[derive(Embeddable)]` describe
//!   persistent structs without runtime reflection.
//! - **Statements**: [`Statement`] builders for DML and DDL over [`Expr`]
//!   criteria, with deterministic table aliases.
//! - **Dialects**: generic, PostgreSQL, MySQL and SQLite, selected by id or
//!   connection URL through [`Dialect::from_config`].
//! - **Mapping**: [`BeanMapper`] flattens embedded values, ids with
//!   revisions and foreign-key references into columns.
//! - **Schema**: [`EntitySchema`] derives CREATE TABLE, indices and row-level
//!   statements from an entity.
//!
//! # Quick Start
//!
//! ```
//! use relmap::prelude::*;
//!
//! let person = TableRef::new("Person");
//! let statement = Statement::insert_into(person.clone())
//!     .set(person.col("Name"), "John Doe")
//!     .set(person.col("Single"), true)
//!     .build()
//!     .unwrap();
//!
//! let dialect = Dialect::generic();
//! assert_eq!(
//!     dialect.to_inline_sql(&statement).unwrap(),
//!     "INSERT INTO Person(Name, Single) VALUES ('John Doe', TRUE)"
//! );
//!
//! let formatted = Dialect::postgres().format(&statement).unwrap();
//! assert_eq!(formatted.sql(), "INSERT INTO Person(Name, Single) VALUES ($1, $2)");
//! assert_eq!(formatted.parameters().len(), 2);
//! ```
//!
//! Deriving code refers to `relmap_core`, so crates using the derives also
//! depend on `relmap-core`.

pub use relmap_core::{
    BindingStyle, ColumnInfo, ConstraintKind, Datum, Entity, Error, FromValue, IdentifierCase,
    Mappable, MappingConfig, NamingConfig, NamingStrategy, ObjectId, PropertyInfo, Ref, Result,
    Row, RowCursor, SqlType, TypeDescriptor, TypeKey, TypeShape, Value,
};
pub use relmap_core::error::{
    ConfigError, DialectError, DialectErrorKind, FormatError, FormatErrorKind, MappingError,
    MappingErrorKind, StatementError, StatementErrorKind, TypeError, UnmappedTypeError,
};
pub use relmap_core::row::at_most_one;

pub use relmap_macros::{Embeddable, Entity};

pub use relmap_query::{
    AliasMap, AlterTableBuilder, Assignment, Clause, ColumnName, ColumnSpec, ConstraintDef,
    ConstraintSpec, CreateTableBuilder, DeleteBuilder, DropTableBuilder, Expr, IndexSpec,
    InsertBuilder, JoinKind, MergeBuilder, NullsOrder, Operator, OrderBy, OrderDirection,
    ReferentialAction, SelectBuilder, SelectFrom, Statement, StatementCategory, StatementKind,
    TableName, TableOperation, TableRef, TableSpec, UpdateBuilder, UpsertBuilder,
};

pub use relmap_mapping::{
    BeanMapper, ColumnDescriptor, Converter, MappingRule, PropertyMapping, Segment,
    TypeMappingTable,
};

pub use relmap_dialect::{
    Dialect, DialectRegistry, DialectRules, FormattedStatement, Formatter, Parameter,
    ParameterCollector, registry,
};

pub use relmap_schema::{
    EntitySchema, create_indices, create_table, delete_entity, drop_table, insert_entity,
    select_entities, update_entity,
};

/// The types most applications need.
pub mod prelude {
    pub use crate::{
        BeanMapper, BindingStyle, Datum, Dialect, Embeddable, Entity, EntitySchema, Error, Expr,
        FormattedStatement, Mappable, MappingConfig, NamingStrategy, ObjectId, OrderBy, Ref,
        Result, Row, SqlType, Statement, TableRef, Value,
    };
}
