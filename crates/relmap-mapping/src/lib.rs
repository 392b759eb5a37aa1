//! Object-relational type mapping for relmap.
//!
//! A property value becomes one or more columns by walking a tree of
//! [`Segment`]s. Each segment applies a [`Converter`] and then either emits a
//! column or descends into a child; sibling segments spread one value over
//! several column families (`ID` + `REV`, latitude + longitude). The same
//! tree, walked in reverse over a [`relmap_core::RowCursor`], rebuilds the
//! value.
//!
//! - [`TypeMappingTable`]: value type -> converter and column type, per dialect
//! - [`Segment`]: the recursive tree
//! - [`PropertyBuilder`]: reassembles multi-column properties
//! - [`BeanMapper`]: one tree per persistent entity property

pub mod bean;
pub mod builder;
pub mod converter;
pub mod segment;
pub mod table;

#[cfg(test)]
pub(crate) mod fixtures;

pub use bean::{BeanMapper, PropertyMapping};
pub use builder::PropertyBuilder;
pub use converter::{
    BooleanAsIntegerConverter, Converter, FieldConverter, IdentityConverter, JsonTextConverter,
    ReferenceConverter, UuidTextConverter,
};
pub use segment::{ColumnDescriptor, Segment, SegmentBody};
pub use table::{MappingRule, TypeMappingTable};
