//! Per-dialect type-mapping tables and mapping-tree construction.

use crate::converter::{Converter, FieldConverter, IdentityConverter, ReferenceConverter};
use crate::segment::{ColumnDescriptor, Segment, SegmentBody};
use relmap_core::error::StatementErrorKind;
use relmap_core::naming::to_snake_case;
use relmap_core::{
    Error, Mappable, NamingStrategy, PropertyInfo, Result, SqlType, TypeDescriptor, TypeKey,
    TypeShape,
};
use std::collections::HashMap;
use std::sync::Arc;

/// How values of one type are mapped.
#[derive(Debug, Clone)]
pub enum MappingRule {
    /// Convert, then store in one column of `sql_type`.
    Column {
        converter: Arc<dyn Converter>,
        sql_type: SqlType,
    },
    /// Convert into `target`, whose own mapping continues the tree.
    Nested {
        converter: Arc<dyn Converter>,
        target: fn() -> TypeDescriptor,
    },
}

/// Value type -> mapping rule.
///
/// Types without a rule fall back to their shape: embedded types spread
/// over one column family per field, references map to the referenced
/// entity's id columns. Anything else is an unmapped-type error.
#[derive(Debug, Clone, Default)]
pub struct TypeMappingTable {
    rules: HashMap<TypeKey, MappingRule>,
}

impl TypeMappingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Native mappings for the built-in scalar types.
    pub fn standard() -> Self {
        Self::new()
            .with_column::<bool>(IdentityConverter, SqlType::Boolean)
            .with_column::<i16>(IdentityConverter, SqlType::SmallInt)
            .with_column::<i32>(IdentityConverter, SqlType::Integer)
            .with_column::<i64>(IdentityConverter, SqlType::BigInt)
            .with_column::<f32>(IdentityConverter, SqlType::Real)
            .with_column::<f64>(IdentityConverter, SqlType::Double)
            .with_column::<String>(IdentityConverter, SqlType::Text)
            .with_column::<Vec<u8>>(IdentityConverter, SqlType::Blob)
            .with_column::<[u8; 16]>(IdentityConverter, SqlType::Uuid)
            .with_column::<serde_json::Value>(IdentityConverter, SqlType::Json)
    }

    #[must_use]
    pub fn with_column<T: Mappable>(
        mut self,
        converter: impl Converter + 'static,
        sql_type: SqlType,
    ) -> Self {
        self.register(
            T::descriptor().key,
            MappingRule::Column {
                converter: Arc::new(converter),
                sql_type,
            },
        );
        self
    }

    /// Map `T` by converting it into `U` first.
    #[must_use]
    pub fn with_nested<T: Mappable, U: Mappable>(
        mut self,
        converter: impl Converter + 'static,
    ) -> Self {
        self.register(
            T::descriptor().key,
            MappingRule::Nested {
                converter: Arc::new(converter),
                target: U::descriptor,
            },
        );
        self
    }

    pub fn register(&mut self, key: TypeKey, rule: MappingRule) -> Option<MappingRule> {
        self.rules.insert(key, rule)
    }

    pub fn rule(&self, key: &TypeKey) -> Option<&MappingRule> {
        self.rules.get(key)
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Build the mapping tree of one entity property.
    ///
    /// An id property of embedded type (`ObjectId`) contributes no path
    /// segment of its own, so its fields map to `ID` and `REV`.
    pub fn property_segment(
        &self,
        owner: &str,
        property: &PropertyInfo,
        naming: &NamingStrategy,
    ) -> Result<Segment> {
        let descriptor = property.descriptor();
        let mut tree = TreeBuilder {
            table: self,
            naming,
            owner,
            path: Vec::new(),
            logical: vec![property.name],
        };
        let flatten_id = property.id && matches!(descriptor.shape, TypeShape::Embedded(_));
        if !flatten_id {
            tree.path
                .push(naming.property_segment(property.name, property.column));
        }
        tree.build(&descriptor, property.is_nullable(), property.length)
    }

    /// Column that a logical property path of `owner` maps to.
    ///
    /// The first path element names one of `properties`; the rest descend
    /// through embedded fields and reference keys of the same mapping tree
    /// the bean mapper builds, so `id.rev` is `REV` and `city.id` is
    /// `CITY$ID`. Path elements match field names in any case convention.
    /// A path ending at a multi-column property names its first column.
    pub fn property_column(
        &self,
        owner: &str,
        properties: &[PropertyInfo],
        path: &[&str],
        naming: &NamingStrategy,
    ) -> Result<String> {
        let unknown = || {
            Error::statement(
                StatementErrorKind::UnknownProperty,
                format!("{} has no persistent property {}", owner, path.join(".")),
            )
        };
        let (first, rest) = path.split_first().ok_or_else(unknown)?;
        let property = properties
            .iter()
            .filter(|p| p.is_persistent())
            .find(|p| same_name(p.name, first))
            .ok_or_else(unknown)?;
        let segment = self.property_segment(owner, property, naming)?;
        locate(&segment, rest)
            .map(|column| column.name.clone())
            .ok_or_else(unknown)
    }
}

fn same_name(field: &str, element: &str) -> bool {
    field == element || to_snake_case(field) == to_snake_case(element)
}

/// Follow `path` through the field selectors of a sibling chain. Segments
/// that select no field (references, nested conversions) are stepped through.
fn locate<'a>(segment: &'a Segment, path: &[&str]) -> Option<&'a ColumnDescriptor> {
    let Some((element, rest)) = path.split_first() else {
        return segment.columns().first().copied();
    };
    let mut current = Some(segment);
    while let Some(candidate) = current {
        match (candidate.converter().selected_field(), candidate.body()) {
            (Some(field), body) if same_name(field, element) => {
                return match body {
                    SegmentBody::Composite(child) => locate(child, rest),
                    SegmentBody::Terminal(column) => rest.is_empty().then_some(column),
                };
            }
            (None, SegmentBody::Composite(child)) => return locate(child, path),
            _ => current = candidate.next(),
        }
    }
    None
}

struct TreeBuilder<'a> {
    table: &'a TypeMappingTable,
    naming: &'a NamingStrategy,
    owner: &'a str,
    /// Converted column path segments
    path: Vec<String>,
    /// Logical property path, for diagnostics
    logical: Vec<&'static str>,
}

impl TreeBuilder<'_> {
    fn context(&self) -> String {
        format!("{}.{}", self.owner, self.logical.join("."))
    }

    fn build(
        &mut self,
        descriptor: &TypeDescriptor,
        nullable: bool,
        length: Option<u32>,
    ) -> Result<Segment> {
        let nullable = nullable || descriptor.nullable;
        let table = self.table;
        match table.rule(&descriptor.key) {
            Some(MappingRule::Column {
                converter,
                sql_type,
            }) => {
                let column = ColumnDescriptor {
                    name: self.naming.join_path(&self.path),
                    sql_type: sql_type.clone().with_length(length),
                    nullable,
                };
                Ok(Segment::terminal(Arc::clone(converter), column))
            }
            Some(MappingRule::Nested { converter, target }) => {
                let converter = Arc::clone(converter);
                let child = self.build(&target(), nullable, length)?;
                Ok(Segment::composite(converter, child))
            }
            None => match descriptor.shape {
                TypeShape::Embedded(properties) => self.embedded(descriptor, properties(), nullable),
                TypeShape::Reference { entity, key, .. } => {
                    let child = self.build(&key(), nullable, None)?;
                    Ok(Segment::composite(
                        Arc::new(ReferenceConverter::new(entity)),
                        child,
                    ))
                }
                TypeShape::Scalar => Err(Error::unmapped(descriptor.key.name(), self.context())),
            },
        }
    }

    fn embedded(
        &mut self,
        descriptor: &TypeDescriptor,
        properties: &'static [PropertyInfo],
        nullable: bool,
    ) -> Result<Segment> {
        let mut segments = Vec::new();
        for property in properties.iter().filter(|p| p.is_persistent()) {
            self.path
                .push(self.naming.property_segment(property.name, property.column));
            self.logical.push(property.name);
            let child = self.build(&property.descriptor(), nullable, property.length);
            self.path.pop();
            self.logical.pop();
            segments.push(Segment::composite(
                Arc::new(FieldConverter::new(property.name)),
                child?,
            ));
        }
        Segment::chain(segments).ok_or_else(|| {
            Error::unmapped(
                descriptor.key.name(),
                format!("{} (no persistent fields)", self.context()),
            )
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::converter::{BooleanAsIntegerConverter, Converter};
    use crate::fixtures::{City, Person, Rgb, RgbHexConverter, Span};
    use relmap_core::{Datum, Entity, Row, Value};

    fn column_names(table: &TypeMappingTable, owner: &str, property: &PropertyInfo) -> Vec<String> {
        table
            .property_segment(owner, property, &NamingStrategy::default())
            .unwrap()
            .columns()
            .iter()
            .map(|c| c.name.clone())
            .collect()
    }

    #[test]
    fn embedded_properties_get_prefixed_columns() {
        let table = TypeMappingTable::standard();
        let geo = &City::properties()[2];
        assert_eq!(
            column_names(&table, "City", geo),
            ["GEO_LOCATION$LATITUDE", "GEO_LOCATION$LONGITUDE"]
        );
        let segment = table
            .property_segment("City", geo, &NamingStrategy::default())
            .unwrap();
        assert!(segment.columns().iter().all(|c| c.nullable));
    }

    #[test]
    fn object_id_flattens_to_id_and_rev() {
        let table = TypeMappingTable::standard();
        let (_, id) = City::id_property().unwrap();
        assert_eq!(column_names(&table, "City", id), ["ID", "REV"]);
        let segment = table
            .property_segment("City", id, &NamingStrategy::default())
            .unwrap();
        assert!(segment.columns().iter().all(|c| !c.nullable));
    }

    #[test]
    fn references_map_to_key_columns() {
        let table = TypeMappingTable::standard();
        let city = &Person::properties()[2];
        assert_eq!(column_names(&table, "Person", city), ["CITY$ID", "CITY$REV"]);
    }

    #[test]
    fn unmapped_scalars_name_type_and_context() {
        let table = TypeMappingTable::new();
        let err = table
            .property_segment("City", &City::properties()[1], &NamingStrategy::default())
            .unwrap_err();
        match err {
            Error::UnmappedType(e) => {
                assert_eq!(e.type_name, "i32");
                assert_eq!(e.context, "City.inhabitants");
            }
            other => panic!("unexpected {other:?}"),
        }

        let geo = table
            .property_segment("City", &City::properties()[2], &NamingStrategy::default())
            .unwrap_err();
        assert!(matches!(geo, Error::UnmappedType(ref e) if e.context == "City.geo_location.latitude"));
    }

    #[test]
    fn rules_override_the_shape_fallback() {
        let table = TypeMappingTable::standard()
            .with_nested::<Rgb, String>(RgbHexConverter)
            .with_column::<bool>(BooleanAsIntegerConverter, SqlType::Integer);
        let color = &Person::properties()[4];
        let segment = table
            .property_segment("Person", color, &NamingStrategy::default())
            .unwrap();
        let columns = segment.columns();
        assert_eq!(columns.len(), 1);
        assert_eq!(columns[0].name, "COLOR");
        assert_eq!(columns[0].sql_type, SqlType::Text);

        let mut row = Row::default();
        let source = Rgb(255, 0, 16).to_datum();
        segment.forward(&source, &mut row).unwrap();
        assert_eq!(row.get(0), Some(&Value::Text("#FF0010".to_string())));
        assert_eq!(segment.reverse(&mut row.cursor()).unwrap(), source);

        let single = &Person::properties()[1];
        let segment = table
            .property_segment("Person", single, &NamingStrategy::default())
            .unwrap();
        assert_eq!(segment.converter().name(), BooleanAsIntegerConverter.name());
        let mut row = Row::default();
        segment.forward(&Datum::Scalar(Value::Bool(false)), &mut row).unwrap();
        assert_eq!(row.get(0), Some(&Value::Int(0)));
    }

    #[test]
    fn explicit_lengths_narrow_text_columns() {
        let table = TypeMappingTable::standard();
        let name = &Person::properties()[0];
        let segment = table
            .property_segment("Person", name, &NamingStrategy::default())
            .unwrap();
        assert_eq!(segment.columns()[0].sql_type, SqlType::VarChar(Some(80)));
        assert!(!segment.columns()[0].nullable);
    }

    fn path_column(table: &TypeMappingTable, properties: &[PropertyInfo], path: &str) -> Result<String> {
        let path: Vec<&str> = path.split('.').collect();
        table.property_column("Entity", properties, &path, &NamingStrategy::default())
    }

    #[test]
    fn property_paths_follow_the_mapping_tree() {
        let table = TypeMappingTable::standard();
        let city = City::properties();
        assert_eq!(path_column(&table, city, "name").unwrap(), "NAME");
        assert_eq!(path_column(&table, city, "id").unwrap(), "ID");
        assert_eq!(path_column(&table, city, "id.rev").unwrap(), "REV");
        assert_eq!(
            path_column(&table, city, "geoLocation.longitude").unwrap(),
            "GEO_LOCATION$LONGITUDE"
        );

        let person = Person::properties();
        assert_eq!(path_column(&table, person, "city.id").unwrap(), "CITY$ID");
        assert_eq!(path_column(&table, person, "city").unwrap(), "CITY$ID");
        assert_eq!(path_column(&table, person, "city.rev").unwrap(), "CITY$REV");
    }

    #[test]
    fn property_paths_honor_nested_rules() {
        let table = TypeMappingTable::standard().with_nested::<Rgb, String>(RgbHexConverter);
        let person = Person::properties();
        assert_eq!(path_column(&table, person, "color").unwrap(), "COLOR");
        assert!(path_column(&table, person, "color.r").is_err());
    }

    #[test]
    fn unknown_and_transient_paths_are_rejected() {
        let table = TypeMappingTable::standard();
        for path in ["notes", "population", "id.version", "name.first"] {
            match path_column(&table, City::properties(), path).unwrap_err() {
                Error::Statement(e) => assert_eq!(e.kind, StatementErrorKind::UnknownProperty),
                other => panic!("unexpected {other:?} for {path}"),
            }
        }
    }

    #[test]
    fn all_null_embeddables_read_back_as_absent() {
        let table = TypeMappingTable::standard();
        let span = PropertyInfo::new("span", <Option<Span> as Mappable>::descriptor);
        let segment = table
            .property_segment("Entity", &span, &NamingStrategy::default())
            .unwrap();

        let mut row = Row::default();
        let empty = Some(Span { lo: None, hi: None });
        segment.forward(&empty.to_datum(), &mut row).unwrap();
        assert_eq!(row.values().cloned().collect::<Vec<_>>(), [Value::Null, Value::Null]);
        let back = segment.reverse(&mut row.cursor()).unwrap();
        assert_eq!(Option::<Span>::from_datum(back).unwrap(), None);

        let mut row = Row::default();
        let half = Some(Span { lo: Some(3), hi: None });
        segment.forward(&half.to_datum(), &mut row).unwrap();
        let back = segment.reverse(&mut row.cursor()).unwrap();
        assert_eq!(Option::<Span>::from_datum(back).unwrap(), half);
    }
}
