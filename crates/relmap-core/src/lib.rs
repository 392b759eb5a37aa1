//! Core types for relmap.
//!
//! - `Value` and the flat `Row` representation exchanged with drivers
//! - `SqlType` column declarations
//! - `NamingStrategy` for table, column, index and constraint names
//! - `Entity` / `Mappable` descriptors generated by `#[derive(Entity)]`
//! - `MappingConfig` for selecting and tuning a dialect
//! - the shared `Error` type

pub mod config;
pub mod entity;
pub mod error;
pub mod identifiers;
pub mod naming;
pub mod row;
pub mod types;
pub mod value;

pub use config::{BindingStyle, MappingConfig, NamingConfig};
pub use entity::{
    Datum, Entity, Mappable, ObjectId, PropertyInfo, Ref, TypeDescriptor, TypeKey, TypeShape,
};
pub use error::{
    ConfigError, DialectError, DialectErrorKind, Error, FormatError, FormatErrorKind,
    MappingError, MappingErrorKind, Result, StatementError, StatementErrorKind, TypeError,
    UnmappedTypeError,
};
pub use identifiers::{quote_ident, quote_ident_mysql};
pub use naming::{ConstraintKind, IdentifierCase, NamingStrategy};
pub use row::{ColumnInfo, Row, RowCursor};
pub use types::SqlType;
pub use value::{FromValue, Value};
