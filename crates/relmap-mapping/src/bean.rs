//! Whole-entity conversion.

use crate::segment::{ColumnDescriptor, Segment};
use crate::table::TypeMappingTable;
use relmap_core::{Entity, NamingStrategy, PropertyInfo, Result, Row};
use std::marker::PhantomData;

/// Mapping tree of one persistent property.
#[derive(Debug, Clone)]
pub struct PropertyMapping {
    /// Index into `Entity::properties()`
    pub index: usize,
    pub property: &'static PropertyInfo,
    pub segment: Segment,
}

impl PropertyMapping {
    pub fn columns(&self) -> Vec<&ColumnDescriptor> {
        self.segment.columns()
    }
}

/// Converts entities of type `E` to flat rows and back.
///
/// One mapping tree per persistent property, in declaration order. Trees are
/// built once, in `new`, and reused for every conversion.
#[derive(Debug, Clone)]
pub struct BeanMapper<E> {
    properties: Vec<PropertyMapping>,
    columns: Vec<ColumnDescriptor>,
    _entity: PhantomData<fn() -> E>,
}

impl<E: Entity> BeanMapper<E> {
    #[tracing::instrument(level = "debug", skip_all, fields(entity = E::NAME))]
    pub fn new(table: &TypeMappingTable, naming: &NamingStrategy) -> Result<Self> {
        let properties = E::persistent_properties()
            .into_iter()
            .map(|(index, property)| {
                Ok(PropertyMapping {
                    index,
                    property,
                    segment: table.property_segment(E::NAME, property, naming)?,
                })
            })
            .collect::<Result<Vec<_>>>()?;
        let columns: Vec<ColumnDescriptor> = properties
            .iter()
            .flat_map(|p| p.columns().into_iter().cloned())
            .collect();
        tracing::debug!(
            properties = properties.len(),
            columns = columns.len(),
            "built mapping tree"
        );
        Ok(Self {
            properties,
            columns,
            _entity: PhantomData,
        })
    }

    /// Every column, in row order.
    pub fn columns(&self) -> &[ColumnDescriptor] {
        &self.columns
    }

    pub fn column_names(&self) -> impl Iterator<Item = &str> {
        self.columns.iter().map(|c| c.name.as_str())
    }

    pub fn properties(&self) -> &[PropertyMapping] {
        &self.properties
    }

    pub fn property(&self, name: &str) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.property.name == name)
    }

    /// Mapping of the id property, if the entity declares one.
    pub fn id_property(&self) -> Option<&PropertyMapping> {
        self.properties.iter().find(|p| p.property.id)
    }

    pub fn to_row(&self, entity: &E) -> Result<Row> {
        let mut row = Row::default();
        for mapping in &self.properties {
            let datum = entity.get(mapping.index)?;
            mapping.segment.forward(&datum, &mut row)?;
        }
        Ok(row)
    }

    /// Rebuild an entity from `row`, starting from a copy of `template`.
    ///
    /// Transient properties keep the template's values; the template itself
    /// is never modified.
    pub fn from_row(&self, row: &Row, template: &E) -> Result<E> {
        let mut entity = template.clone();
        let mut cursor = row.cursor();
        for mapping in &self.properties {
            let datum = mapping.segment.reverse(&mut cursor)?;
            entity.set(mapping.index, datum)?;
        }
        Ok(entity)
    }

    pub fn from_rows(&self, rows: &[Row], template: &E) -> Result<Vec<E>> {
        rows.iter().map(|row| self.from_row(row, template)).collect()
    }
}
