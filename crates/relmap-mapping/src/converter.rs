//! Value converters.
//!
//! A converter translates between a source datum (what an entity property
//! holds) and a target datum (what the next level of the mapping tree, or a
//! column, expects). Converters are stateless and shared between trees.

use crate::builder::PropertyBuilder;
use relmap_core::error::MappingErrorKind;
use relmap_core::value::format_uuid;
use relmap_core::{Datum, Error, Result, Value};
use std::fmt;

pub trait Converter: Send + Sync + fmt::Debug {
    /// Short name used in diagnostics.
    fn name(&self) -> &str;

    /// Source -> target. Never called with a null source.
    fn to_target(&self, source: &Datum) -> Result<Datum>;

    /// Target -> source. Never called with a null target.
    fn from_target(&self, target: Datum) -> Result<Datum>;

    /// Target produced for a null source.
    fn null_mapping(&self) -> Datum {
        Datum::NULL
    }

    /// Field of an embedded record this converter selects, if any.
    fn selected_field(&self) -> Option<&'static str> {
        None
    }

    /// Feed one target value into the builder of a multi-column property.
    fn contribute(&self, builder: &mut PropertyBuilder, target: Datum) -> Result<()> {
        let _ = (builder, target);
        Err(Error::mapping(
            MappingErrorKind::Conversion,
            format!(
                "converter '{}' cannot take part in a multi-column property",
                self.name()
            ),
        ))
    }
}

fn conversion_error(converter: &str, expected: &str, found: &Datum) -> Error {
    let found = match found {
        Datum::Scalar(v) => v.type_name(),
        Datum::Record(_) => "record",
    };
    Error::mapping(
        MappingErrorKind::Conversion,
        format!("{}: expected {}, found {}", converter, expected, found),
    )
}

/// Passes values through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct IdentityConverter;

impl Converter for IdentityConverter {
    fn name(&self) -> &str {
        "identity"
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        Ok(source.clone())
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        Ok(target)
    }
}

/// Selects one field of an embedded record.
///
/// In a multi-column property every sibling segment carries one of these;
/// the reverse direction puts the fields back together through a
/// [`PropertyBuilder`].
#[derive(Debug, Clone, Copy)]
pub struct FieldConverter {
    field: &'static str,
}

impl FieldConverter {
    pub const fn new(field: &'static str) -> Self {
        Self { field }
    }

    pub const fn field(&self) -> &'static str {
        self.field
    }
}

impl Converter for FieldConverter {
    fn name(&self) -> &str {
        self.field
    }

    fn selected_field(&self) -> Option<&'static str> {
        Some(self.field)
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        match source {
            Datum::Record(_) => Ok(source.field(self.field).cloned().unwrap_or(Datum::NULL)),
            other => Err(conversion_error(self.field, "a record", other)),
        }
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        if target.is_null() {
            return Ok(Datum::NULL);
        }
        Ok(Datum::Record(vec![(self.field, target)]))
    }

    fn contribute(&self, builder: &mut PropertyBuilder, target: Datum) -> Result<()> {
        builder.insert(self.field, target)
    }
}

/// Foreign-key reference: the referenced entity's id record, unchanged.
#[derive(Debug, Clone, Copy)]
pub struct ReferenceConverter {
    entity: &'static str,
}

impl ReferenceConverter {
    pub const fn new(entity: &'static str) -> Self {
        Self { entity }
    }

    pub const fn entity(&self) -> &'static str {
        self.entity
    }
}

impl Converter for ReferenceConverter {
    fn name(&self) -> &str {
        self.entity
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        match source {
            Datum::Record(_) => Ok(source.clone()),
            other => Err(conversion_error(self.entity, "an id record", other)),
        }
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        Ok(target)
    }
}

/// JSON documents stored as text, for dialects without a JSON type.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonTextConverter;

impl Converter for JsonTextConverter {
    fn name(&self) -> &str {
        "json_text"
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        match source {
            Datum::Scalar(Value::Json(json)) => Ok(Datum::Scalar(Value::Text(json.to_string()))),
            other => Err(conversion_error(self.name(), "JSON", other)),
        }
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        match target {
            Datum::Scalar(Value::Text(text)) => serde_json::from_str(&text)
                .map(|json| Datum::Scalar(Value::Json(json)))
                .map_err(|e| {
                    Error::mapping(
                        MappingErrorKind::Conversion,
                        format!("json_text: invalid JSON document: {}", e),
                    )
                }),
            json @ Datum::Scalar(Value::Json(_)) => Ok(json),
            other => Err(conversion_error(self.name(), "TEXT", &other)),
        }
    }
}

/// Booleans stored as 0/1 integers.
#[derive(Debug, Clone, Copy, Default)]
pub struct BooleanAsIntegerConverter;

impl Converter for BooleanAsIntegerConverter {
    fn name(&self) -> &str {
        "boolean_as_integer"
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        match source {
            Datum::Scalar(Value::Bool(b)) => Ok(Datum::Scalar(Value::Int(i32::from(*b)))),
            other => Err(conversion_error(self.name(), "BOOLEAN", other)),
        }
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        match target.as_value().and_then(Value::as_bool) {
            Some(b) => Ok(Datum::Scalar(Value::Bool(b))),
            None => Err(conversion_error(self.name(), "INTEGER", &target)),
        }
    }
}

/// UUIDs stored as their canonical 36-character text.
#[derive(Debug, Clone, Copy, Default)]
pub struct UuidTextConverter;

impl Converter for UuidTextConverter {
    fn name(&self) -> &str {
        "uuid_text"
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        match source {
            Datum::Scalar(Value::Uuid(bytes)) => Ok(Datum::Scalar(Value::Text(format_uuid(bytes)))),
            other => Err(conversion_error(self.name(), "UUID", other)),
        }
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        match &target {
            Datum::Scalar(Value::Text(text)) => parse_uuid(text)
                .map(|bytes| Datum::Scalar(Value::Uuid(bytes)))
                .ok_or_else(|| conversion_error(self.name(), "a UUID string", &target)),
            Datum::Scalar(Value::Uuid(_)) => Ok(target),
            _ => Err(conversion_error(self.name(), "TEXT", &target)),
        }
    }
}

fn parse_uuid(text: &str) -> Option<[u8; 16]> {
    let hex: Vec<u8> = text.bytes().filter(|b| *b != b'-').collect();
    if hex.len() != 32 {
        return None;
    }
    let mut bytes = [0u8; 16];
    for (i, pair) in hex.chunks(2).enumerate() {
        let pair = std::str::from_utf8(pair).ok()?;
        bytes[i] = u8::from_str_radix(pair, 16).ok()?;
    }
    Some(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn field_converter_selects_and_wraps() {
        let conv = FieldConverter::new("latitude");
        let record = Datum::Record(vec![
            ("latitude", Datum::Scalar(Value::Double(46.9))),
            ("longitude", Datum::Scalar(Value::Double(7.4))),
        ]);
        assert_eq!(conv.to_target(&record).unwrap(), Datum::Scalar(Value::Double(46.9)));
        assert_eq!(
            conv.from_target(Datum::Scalar(Value::Double(1.0))).unwrap(),
            Datum::Record(vec![("latitude", Datum::Scalar(Value::Double(1.0)))])
        );
        assert!(conv.from_target(Datum::NULL).unwrap().is_null());
        assert!(conv.to_target(&Datum::Scalar(Value::Int(1))).is_err());
    }

    #[test]
    fn json_text_round_trips() {
        let conv = JsonTextConverter;
        let doc = serde_json::json!({"a": [1, 2]});
        let text = conv.to_target(&Datum::Scalar(Value::Json(doc.clone()))).unwrap();
        assert_eq!(text, Datum::Scalar(Value::Text(r#"{"a":[1,2]}"#.to_string())));
        assert_eq!(conv.from_target(text).unwrap(), Datum::Scalar(Value::Json(doc)));
        assert!(
            conv.from_target(Datum::Scalar(Value::Text("{".to_string())))
                .is_err()
        );
    }

    #[test]
    fn booleans_as_integers() {
        let conv = BooleanAsIntegerConverter;
        assert_eq!(
            conv.to_target(&Datum::Scalar(Value::Bool(true))).unwrap(),
            Datum::Scalar(Value::Int(1))
        );
        assert_eq!(
            conv.from_target(Datum::Scalar(Value::BigInt(0))).unwrap(),
            Datum::Scalar(Value::Bool(false))
        );
    }

    #[test]
    fn uuid_text_round_trips() {
        let conv = UuidTextConverter;
        let bytes = [
            0x55, 0x0e, 0x84, 0x00, 0xe2, 0x9b, 0x41, 0xd4, 0xa7, 0x16, 0x44, 0x66, 0x55, 0x44,
            0x00, 0x00,
        ];
        let text = conv.to_target(&Datum::Scalar(Value::Uuid(bytes))).unwrap();
        assert_eq!(conv.from_target(text).unwrap(), Datum::Scalar(Value::Uuid(bytes)));
        assert!(parse_uuid("not-a-uuid").is_none());
    }

    #[test]
    fn plain_converters_refuse_to_contribute() {
        let mut builder = PropertyBuilder::new(1);
        assert!(IdentityConverter.contribute(&mut builder, Datum::NULL).is_err());
    }
}
