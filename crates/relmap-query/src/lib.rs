//! Statement construction for relmap.
//!
//! `relmap-query` is the **dialect-neutral layer**: it builds statements but
//! never renders them. Rendering belongs to `relmap-dialect`.
//!
//! - **Criteria**: [`Expr`] trees of property paths, literals, predicates and
//!   projections, with operator arity checked at construction.
//! - **Statements**: [`Statement`] holds a start clause, body clauses in SQL
//!   order, and an [`AliasMap`] of the table occurrences it references.
//! - **DDL model**: column, table, constraint and index specs whose names are
//!   derived lazily from a `NamingStrategy`.
//!
//! # Example
//!
//! ```
//! use relmap_query::{Expr, Statement, TableRef};
//!
//! let person = TableRef::new("Person");
//! let statement = Statement::delete_from(person.clone())
//!     .filter(person.col("Single").eq(true))
//!     .build()
//!     .unwrap();
//! assert_eq!(statement.clauses().len(), 2);
//! ```

pub mod alias;
pub mod builder;
pub mod clause;
pub mod ddl;
pub mod expr;
pub mod select;
pub mod statement;
pub mod table;

pub use alias::{AliasMap, TableName, TableRef};
pub use builder::{DeleteBuilder, InsertBuilder, MergeBuilder, UpdateBuilder, UpsertBuilder};
pub use clause::{Assignment, Clause, JoinKind, NullsOrder, OrderBy, OrderDirection};
pub use ddl::{
    ColumnName, ColumnSpec, ConstraintDef, ConstraintSpec, DdlElement, ElementKind, IndexSpec,
    OperationType, ReferentialAction, TableOperation, TableSpec,
};
pub use expr::{Arity, Expr, Operator, ProjectionKind};
pub use select::{SelectBuilder, SelectFrom};
pub use statement::{Statement, StatementCategory, StatementKind};
pub use table::{AlterTableBuilder, CreateTableBuilder, DropTableBuilder};
