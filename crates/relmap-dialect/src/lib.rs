//! SQL rendering for relmap.
//!
//! A [`Dialect`] couples the [`DialectRules`] of one database product with
//! the naming strategy, binding style and type mapping in effect. Formatting
//! a [`relmap_query::Statement`] walks its clauses once and yields a
//! [`FormattedStatement`]: SQL text plus the parameters bound in placeholder
//! order.
//!
//! - **Binding**: indexed (`?`, `$1`, `?1`), named (`:name`, optionally
//!   merging equal values) or inline literals.
//! - **Dialects**: generic (H2-style `MERGE ... KEY`), PostgreSQL, MySQL and
//!   SQLite, found by id or connection URL through the [`registry`].
//!
//! # Example
//!
//! ```
//! use relmap_dialect::Dialect;
//! use relmap_query::{Statement, TableRef};
//!
//! let city = TableRef::new("City");
//! let statement = Statement::delete_from(city.clone())
//!     .filter(city.col("ID").eq(42))
//!     .build()
//!     .unwrap();
//! let formatted = Dialect::postgres().format(&statement).unwrap();
//! assert_eq!(formatted.sql(), "DELETE FROM City c WHERE c.ID = $1");
//! assert_eq!(formatted.parameters().len(), 1);
//! ```

pub mod dialect;
pub mod dialects;
pub mod format;
pub mod params;
pub mod registry;
pub mod rules;

pub use dialect::Dialect;
pub use dialects::{Generic, MySql, Postgres, Sqlite};
pub use format::{FormattedStatement, Formatter};
pub use params::{
    collector_for, IndexedCollector, InlineCollector, NamedCollector, Parameter,
    ParameterCollector,
};
pub use registry::{registry, DialectRegistry, RegistryBuilder};
pub use rules::{quote_string, standard_literal, DialectRules, UpsertParts};
