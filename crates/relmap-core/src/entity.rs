//! Entity descriptors.
//!
//! Entities expose a closed, statically enumerable property list instead of
//! being inspected at runtime. Property values travel through the mapping
//! layer as [`Datum`] trees: a scalar [`Value`] or a record of named fields.
//! `#[derive(Entity)]` and `#[derive(Embeddable)]` generate all of this; the
//! traits can also be implemented by hand.

use crate::error::{Error, MappingErrorKind, Result};
use crate::value::{FromValue, Value};
use std::any::TypeId;
use std::fmt;
use std::marker::PhantomData;

/// A property value in structured form.
#[derive(Debug, Clone, PartialEq)]
pub enum Datum {
    Scalar(Value),
    /// Named fields of an embedded value, in declaration order
    Record(Vec<(&'static str, Datum)>),
}

impl Datum {
    pub const NULL: Datum = Datum::Scalar(Value::Null);

    pub fn is_null(&self) -> bool {
        matches!(self, Datum::Scalar(Value::Null))
    }

    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Datum::Scalar(v) => Some(v),
            Datum::Record(_) => None,
        }
    }

    /// Take the scalar out of this datum.
    pub fn into_value(self) -> Result<Value> {
        match self {
            Datum::Scalar(v) => Ok(v),
            Datum::Record(fields) => Err(Error::mapping(
                MappingErrorKind::Conversion,
                format!(
                    "expected a scalar, found a record of {} fields",
                    fields.len()
                ),
            )),
        }
    }

    /// Look up a record field by name.
    pub fn field(&self, name: &str) -> Option<&Datum> {
        match self {
            Datum::Record(fields) => fields.iter().find(|(n, _)| *n == name).map(|(_, d)| d),
            Datum::Scalar(_) => None,
        }
    }

    /// Remove a record field by name. A null datum yields null for every field.
    pub fn take_field(&mut self, name: &str) -> Result<Datum> {
        match self {
            Datum::Scalar(Value::Null) => Ok(Datum::NULL),
            Datum::Record(fields) => Ok(fields
                .iter()
                .position(|(n, _)| *n == name)
                .map_or(Datum::NULL, |i| fields.remove(i).1)),
            Datum::Scalar(v) => Err(Error::mapping(
                MappingErrorKind::Conversion,
                format!("cannot read field '{}' from a {} value", name, v.type_name()),
            )),
        }
    }
}

impl From<Value> for Datum {
    fn from(v: Value) -> Self {
        Datum::Scalar(v)
    }
}

/// Identity of a mappable Rust type.
#[derive(Clone, Copy)]
pub struct TypeKey {
    id: TypeId,
    name: &'static str,
}

impl TypeKey {
    pub fn of<T: ?Sized + 'static>() -> Self {
        Self {
            id: TypeId::of::<T>(),
            name: std::any::type_name::<T>(),
        }
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}

impl PartialEq for TypeKey {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for TypeKey {}

impl std::hash::Hash for TypeKey {
    fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
        self.id.hash(state);
    }
}

impl fmt::Debug for TypeKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

/// Structural shape of a mappable type, consulted when the mapping table has
/// no explicit rule for it.
#[derive(Debug, Clone, Copy)]
pub enum TypeShape {
    /// A single value; needs a registered converter
    Scalar,
    /// A value object flattened into one column per (nested) field
    Embedded(fn() -> &'static [PropertyInfo]),
    /// A foreign key to another entity, stored as that entity's key columns
    Reference {
        entity: &'static str,
        table: Option<&'static str>,
        key: fn() -> TypeDescriptor,
    },
}

#[derive(Debug, Clone, Copy)]
pub struct TypeDescriptor {
    pub key: TypeKey,
    pub shape: TypeShape,
    pub nullable: bool,
}

impl TypeDescriptor {
    pub fn scalar<T: 'static>() -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: TypeShape::Scalar,
            nullable: false,
        }
    }

    pub fn embedded<T: 'static>(properties: fn() -> &'static [PropertyInfo]) -> Self {
        Self {
            key: TypeKey::of::<T>(),
            shape: TypeShape::Embedded(properties),
            nullable: false,
        }
    }

    #[must_use]
    pub fn nullable(mut self) -> Self {
        self.nullable = true;
        self
    }
}

/// A type that can be expressed as a [`Datum`].
pub trait Mappable: Sized + 'static {
    fn descriptor() -> TypeDescriptor;
    fn to_datum(&self) -> Datum;
    fn from_datum(datum: Datum) -> Result<Self>;
}

macro_rules! scalar_mappable {
    ($($ty:ty),* $(,)?) => {
        $(
            impl Mappable for $ty {
                fn descriptor() -> TypeDescriptor {
                    TypeDescriptor::scalar::<$ty>()
                }

                fn to_datum(&self) -> Datum {
                    Datum::Scalar(Value::from(self.clone()))
                }

                fn from_datum(datum: Datum) -> Result<Self> {
                    let value = datum.into_value()?;
                    <$ty as FromValue>::try_from_value(&value)
                }
            }
        )*
    };
}

scalar_mappable!(
    bool,
    i16,
    i32,
    i64,
    f32,
    f64,
    String,
    Vec<u8>,
    [u8; 16],
    serde_json::Value,
);

impl<T: Mappable> Mappable for Option<T> {
    fn descriptor() -> TypeDescriptor {
        T::descriptor().nullable()
    }

    fn to_datum(&self) -> Datum {
        self.as_ref().map_or(Datum::NULL, Mappable::to_datum)
    }

    fn from_datum(datum: Datum) -> Result<Self> {
        if datum.is_null() {
            Ok(None)
        } else {
            T::from_datum(datum).map(Some)
        }
    }
}

/// Static description of one entity or embeddable property.
#[derive(Debug, Clone, Copy)]
pub struct PropertyInfo {
    /// Rust field name
    pub name: &'static str,
    /// Explicit column name, bypassing the naming strategy
    pub column: Option<&'static str>,
    pub ty: fn() -> TypeDescriptor,
    pub id: bool,
    /// Not persisted
    pub transient: bool,
    pub unique: bool,
    pub indexed: bool,
    /// Declared text length
    pub length: Option<u32>,
}

impl PropertyInfo {
    pub const fn new(name: &'static str, ty: fn() -> TypeDescriptor) -> Self {
        Self {
            name,
            column: None,
            ty,
            id: false,
            transient: false,
            unique: false,
            indexed: false,
            length: None,
        }
    }

    pub const fn column(mut self, name: &'static str) -> Self {
        self.column = Some(name);
        self
    }

    pub const fn id(mut self, value: bool) -> Self {
        self.id = value;
        self
    }

    pub const fn transient(mut self, value: bool) -> Self {
        self.transient = value;
        self
    }

    pub const fn unique(mut self, value: bool) -> Self {
        self.unique = value;
        self
    }

    pub const fn indexed(mut self, value: bool) -> Self {
        self.indexed = value;
        self
    }

    pub const fn length(mut self, value: u32) -> Self {
        self.length = Some(value);
        self
    }

    pub fn descriptor(&self) -> TypeDescriptor {
        (self.ty)()
    }

    /// Nullable unless it is the id or its type is non-optional.
    pub fn is_nullable(&self) -> bool {
        !self.id && self.descriptor().nullable
    }

    pub fn is_persistent(&self) -> bool {
        !self.transient
    }
}

/// A persistent entity type.
pub trait Entity: Mappable + Clone {
    /// Logical entity name, from which the table name is derived
    const NAME: &'static str;
    /// Explicit table name
    const TABLE: Option<&'static str> = None;

    fn properties() -> &'static [PropertyInfo];

    /// Read property `index` of [`Entity::properties`].
    fn get(&self, index: usize) -> Result<Datum>;

    /// Replace property `index` of [`Entity::properties`].
    fn set(&mut self, index: usize, value: Datum) -> Result<()>;

    /// Indices of persisted properties, in declaration order.
    fn persistent_properties() -> Vec<(usize, &'static PropertyInfo)> {
        Self::properties()
            .iter()
            .enumerate()
            .filter(|(_, p)| p.is_persistent())
            .collect()
    }

    /// The id property, if one is declared.
    fn id_property() -> Option<(usize, &'static PropertyInfo)> {
        Self::properties().iter().enumerate().find(|(_, p)| p.id)
    }
}

/// Error for a property index outside the declared list.
pub fn no_such_property(entity: &str, index: usize) -> Error {
    Error::mapping(
        MappingErrorKind::Conversion,
        format!("{} has no property at index {}", entity, index),
    )
}

/// Primary key with optimistic-lock revision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct ObjectId {
    pub id: i64,
    pub rev: i64,
}

impl ObjectId {
    pub const fn new(id: i64, rev: i64) -> Self {
        Self { id, rev }
    }

    /// Same id, next revision.
    #[must_use]
    pub const fn next_revision(self) -> Self {
        Self {
            id: self.id,
            rev: self.rev + 1,
        }
    }
}

impl Mappable for ObjectId {
    fn descriptor() -> TypeDescriptor {
        const PROPS: &[PropertyInfo] = &[
            PropertyInfo::new("id", <i64 as Mappable>::descriptor),
            PropertyInfo::new("rev", <i64 as Mappable>::descriptor),
        ];
        TypeDescriptor::embedded::<ObjectId>(|| PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(vec![
            ("id", Datum::Scalar(Value::BigInt(self.id))),
            ("rev", Datum::Scalar(Value::BigInt(self.rev))),
        ])
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        Ok(Self {
            id: i64::from_datum(datum.take_field("id")?)?,
            rev: i64::from_datum(datum.take_field("rev")?)?,
        })
    }
}

/// Foreign-key reference to an entity of type `E`.
pub struct Ref<E> {
    pub id: ObjectId,
    _target: PhantomData<fn() -> E>,
}

impl<E> Ref<E> {
    pub const fn new(id: ObjectId) -> Self {
        Self {
            id,
            _target: PhantomData,
        }
    }
}

impl<E> Clone for Ref<E> {
    fn clone(&self) -> Self {
        *self
    }
}

impl<E> Copy for Ref<E> {}

impl<E> PartialEq for Ref<E> {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl<E> Eq for Ref<E> {}

impl<E> fmt::Debug for Ref<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Ref").field(&self.id).finish()
    }
}

impl<E: Entity> Mappable for Ref<E> {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor {
            key: TypeKey::of::<Ref<E>>(),
            shape: TypeShape::Reference {
                entity: E::NAME,
                table: E::TABLE,
                key: <ObjectId as Mappable>::descriptor,
            },
            nullable: false,
        }
    }

    fn to_datum(&self) -> Datum {
        self.id.to_datum()
    }

    fn from_datum(datum: Datum) -> Result<Self> {
        ObjectId::from_datum(datum).map(Ref::new)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn option_is_nullable_with_inner_key() {
        let inner = <String as Mappable>::descriptor();
        let outer = <Option<String> as Mappable>::descriptor();
        assert_eq!(inner.key, outer.key);
        assert!(!inner.nullable);
        assert!(outer.nullable);
        assert_eq!(None::<String>.to_datum(), Datum::NULL);
        assert_eq!(Option::<i64>::from_datum(Datum::NULL).unwrap(), None);
    }

    #[test]
    fn scalar_round_trip() {
        let datum = 42_i64.to_datum();
        assert_eq!(datum, Datum::Scalar(Value::BigInt(42)));
        assert_eq!(i64::from_datum(datum).unwrap(), 42);
        assert!(i64::from_datum(Datum::NULL).is_err());
    }

    #[test]
    fn object_id_is_an_embedded_pair() {
        let oid = ObjectId::new(7, 2);
        let datum = oid.to_datum();
        assert_eq!(datum.field("rev"), Some(&Datum::Scalar(Value::BigInt(2))));
        assert_eq!(ObjectId::from_datum(datum).unwrap(), oid);
        match ObjectId::descriptor().shape {
            TypeShape::Embedded(props) => {
                let names: Vec<_> = props().iter().map(|p| p.name).collect();
                assert_eq!(names, ["id", "rev"]);
            }
            other => panic!("unexpected shape {other:?}"),
        }
        assert_eq!(oid.next_revision(), ObjectId::new(7, 3));
    }

    #[test]
    fn take_field_from_null_is_null() {
        let mut datum = Datum::NULL;
        assert!(datum.take_field("id").unwrap().is_null());
        let mut scalar = Datum::Scalar(Value::Int(1));
        assert!(scalar.take_field("id").is_err());
    }

    #[test]
    fn record_cannot_be_a_scalar() {
        let err = ObjectId::new(1, 1).to_datum().into_value().unwrap_err();
        assert!(matches!(err, Error::Mapping(_)));
    }
}
