//! Reassembly of multi-column properties.

use relmap_core::error::MappingErrorKind;
use relmap_core::{Datum, Error, Result};

#[derive(Debug, Clone, PartialEq)]
enum BuilderState {
    Start,
    Accumulating(Vec<(&'static str, Datum)>),
    Done,
}

/// Collects the contributions of a sibling chain into one record.
///
/// `Start -> Accumulating -> Done`. `finish` is only reachable once exactly
/// `expected` contributions arrived. A property whose contributions are all
/// null finishes as null.
#[derive(Debug, Clone)]
pub struct PropertyBuilder {
    expected: usize,
    state: BuilderState,
}

impl PropertyBuilder {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: BuilderState::Start,
        }
    }

    pub fn received(&self) -> usize {
        match &self.state {
            BuilderState::Start | BuilderState::Done => 0,
            BuilderState::Accumulating(fields) => fields.len(),
        }
    }

    pub fn insert(&mut self, field: &'static str, value: Datum) -> Result<()> {
        match &mut self.state {
            BuilderState::Start => {
                self.state = BuilderState::Accumulating(vec![(field, value)]);
                Ok(())
            }
            BuilderState::Accumulating(fields) => {
                if fields.iter().any(|(f, _)| *f == field) {
                    return Err(Error::mapping(
                        MappingErrorKind::IncompleteBuilder,
                        format!("field '{}' contributed twice", field),
                    ));
                }
                fields.push((field, value));
                Ok(())
            }
            BuilderState::Done => Err(Error::mapping(
                MappingErrorKind::IncompleteBuilder,
                format!("field '{}' contributed after the property was built", field),
            )),
        }
    }

    pub fn finish(&mut self) -> Result<Datum> {
        let received = self.received();
        if received != self.expected {
            return Err(Error::mapping(
                MappingErrorKind::IncompleteBuilder,
                format!(
                    "property built from {} of {} columns",
                    received, self.expected
                ),
            ));
        }
        match std::mem::replace(&mut self.state, BuilderState::Done) {
            BuilderState::Accumulating(fields) => {
                if fields.iter().all(|(_, d)| d.is_null()) {
                    Ok(Datum::NULL)
                } else {
                    Ok(Datum::Record(fields))
                }
            }
            _ => Err(Error::mapping(
                MappingErrorKind::IncompleteBuilder,
                "property has no contributions",
            )),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use relmap_core::Value;

    #[test]
    fn builds_a_record_in_contribution_order() {
        let mut builder = PropertyBuilder::new(2);
        builder.insert("id", Datum::Scalar(Value::BigInt(7))).unwrap();
        builder.insert("rev", Datum::Scalar(Value::BigInt(1))).unwrap();
        assert_eq!(
            builder.finish().unwrap(),
            Datum::Record(vec![
                ("id", Datum::Scalar(Value::BigInt(7))),
                ("rev", Datum::Scalar(Value::BigInt(1))),
            ])
        );
        assert!(builder.insert("x", Datum::NULL).is_err());
        assert!(builder.finish().is_err());
    }

    #[test]
    fn all_null_contributions_build_null() {
        let mut builder = PropertyBuilder::new(2);
        builder.insert("latitude", Datum::NULL).unwrap();
        builder.insert("longitude", Datum::NULL).unwrap();
        assert!(builder.finish().unwrap().is_null());
    }

    #[test]
    fn finish_requires_every_contribution() {
        let mut builder = PropertyBuilder::new(2);
        assert!(builder.finish().is_err());
        builder.insert("id", Datum::Scalar(Value::BigInt(7))).unwrap();
        let err = builder.finish().unwrap_err();
        assert!(matches!(
            err,
            Error::Mapping(ref m) if m.kind == MappingErrorKind::IncompleteBuilder
        ));
    }

    #[test]
    fn duplicate_fields_are_rejected() {
        let mut builder = PropertyBuilder::new(2);
        builder.insert("id", Datum::NULL).unwrap();
        assert!(builder.insert("id", Datum::NULL).is_err());
    }
}
