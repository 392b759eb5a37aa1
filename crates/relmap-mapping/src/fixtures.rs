//! Hand-written entity descriptors shared by the unit tests.

use crate::converter::Converter;
use relmap_core::entity::no_such_property;
use relmap_core::error::MappingErrorKind;
use relmap_core::{
    Datum, Entity, Error, Mappable, ObjectId, PropertyInfo, Ref, Result, TypeDescriptor, Value,
};

#[derive(Debug, Clone, PartialEq, Default)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

impl Mappable for GeoLocation {
    fn descriptor() -> TypeDescriptor {
        const PROPS: &[PropertyInfo] = &[
            PropertyInfo::new("latitude", <f64 as Mappable>::descriptor),
            PropertyInfo::new("longitude", <f64 as Mappable>::descriptor),
        ];
        TypeDescriptor::embedded::<GeoLocation>(|| PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(vec![
            ("latitude", self.latitude.to_datum()),
            ("longitude", self.longitude.to_datum()),
        ])
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        Ok(Self {
            latitude: f64::from_datum(datum.take_field("latitude")?)?,
            longitude: f64::from_datum(datum.take_field("longitude")?)?,
        })
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct City {
    pub name: String,
    pub inhabitants: i32,
    pub geo_location: Option<GeoLocation>,
    pub notes: String,
    pub id: ObjectId,
}

const CITY_PROPS: &[PropertyInfo] = &[
    PropertyInfo::new("name", <String as Mappable>::descriptor),
    PropertyInfo::new("inhabitants", <i32 as Mappable>::descriptor),
    PropertyInfo::new("geo_location", <Option<GeoLocation> as Mappable>::descriptor),
    PropertyInfo::new("notes", <String as Mappable>::descriptor).transient(true),
    PropertyInfo::new("id", <ObjectId as Mappable>::descriptor).id(true),
];

impl Mappable for City {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::embedded::<City>(|| CITY_PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(vec![
            ("name", self.name.to_datum()),
            ("inhabitants", self.inhabitants.to_datum()),
            ("geo_location", self.geo_location.to_datum()),
            ("notes", self.notes.to_datum()),
            ("id", self.id.to_datum()),
        ])
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        Ok(Self {
            name: String::from_datum(datum.take_field("name")?)?,
            inhabitants: i32::from_datum(datum.take_field("inhabitants")?)?,
            geo_location: Option::from_datum(datum.take_field("geo_location")?)?,
            notes: String::from_datum(datum.take_field("notes")?)?,
            id: ObjectId::from_datum(datum.take_field("id")?)?,
        })
    }
}

impl Entity for City {
    const NAME: &'static str = "City";

    fn properties() -> &'static [PropertyInfo] {
        CITY_PROPS
    }

    fn get(&self, index: usize) -> Result<Datum> {
        Ok(match index {
            0 => self.name.to_datum(),
            1 => self.inhabitants.to_datum(),
            2 => self.geo_location.to_datum(),
            3 => self.notes.to_datum(),
            4 => self.id.to_datum(),
            _ => return Err(no_such_property(Self::NAME, index)),
        })
    }

    fn set(&mut self, index: usize, value: Datum) -> Result<()> {
        match index {
            0 => self.name = Mappable::from_datum(value)?,
            1 => self.inhabitants = Mappable::from_datum(value)?,
            2 => self.geo_location = Mappable::from_datum(value)?,
            3 => self.notes = Mappable::from_datum(value)?,
            4 => self.id = Mappable::from_datum(value)?,
            _ => return Err(no_such_property(Self::NAME, index)),
        }
        Ok(())
    }
}

/// An embeddable whose fields may all be absent.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Span {
    pub lo: Option<i32>,
    pub hi: Option<i32>,
}

impl Mappable for Span {
    fn descriptor() -> TypeDescriptor {
        const PROPS: &[PropertyInfo] = &[
            PropertyInfo::new("lo", <Option<i32> as Mappable>::descriptor),
            PropertyInfo::new("hi", <Option<i32> as Mappable>::descriptor),
        ];
        TypeDescriptor::embedded::<Span>(|| PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(vec![("lo", self.lo.to_datum()), ("hi", self.hi.to_datum())])
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        Ok(Self {
            lo: Option::from_datum(datum.take_field("lo")?)?,
            hi: Option::from_datum(datum.take_field("hi")?)?,
        })
    }
}

/// A color kept as a record, stored as `#RRGGBB` text.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Rgb(pub i16, pub i16, pub i16);

impl Mappable for Rgb {
    fn descriptor() -> TypeDescriptor {
        const PROPS: &[PropertyInfo] = &[
            PropertyInfo::new("r", <i16 as Mappable>::descriptor),
            PropertyInfo::new("g", <i16 as Mappable>::descriptor),
            PropertyInfo::new("b", <i16 as Mappable>::descriptor),
        ];
        TypeDescriptor::embedded::<Rgb>(|| PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(vec![
            ("r", self.0.to_datum()),
            ("g", self.1.to_datum()),
            ("b", self.2.to_datum()),
        ])
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        Ok(Self(
            i16::from_datum(datum.take_field("r")?)?,
            i16::from_datum(datum.take_field("g")?)?,
            i16::from_datum(datum.take_field("b")?)?,
        ))
    }
}

#[derive(Debug)]
pub struct RgbHexConverter;

impl Converter for RgbHexConverter {
    fn name(&self) -> &str {
        "rgb_hex"
    }

    fn to_target(&self, source: &Datum) -> Result<Datum> {
        let rgb = Rgb::from_datum(source.clone())?;
        Ok(Datum::Scalar(Value::Text(format!(
            "#{:02X}{:02X}{:02X}",
            rgb.0, rgb.1, rgb.2
        ))))
    }

    fn from_target(&self, target: Datum) -> Result<Datum> {
        let text = target.into_value()?;
        let hex = text
            .as_str()
            .and_then(|s| s.strip_prefix('#'))
            .filter(|s| s.len() == 6)
            .ok_or_else(|| Error::mapping(MappingErrorKind::Conversion, "not an #RRGGBB color"))?;
        let channel = |i: usize| {
            i16::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| Error::mapping(MappingErrorKind::Conversion, e.to_string()))
        };
        Ok(Rgb(channel(0)?, channel(2)?, channel(4)?).to_datum())
    }
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct Person {
    pub name: String,
    pub single: bool,
    pub city: Option<Ref<City>>,
    pub id: ObjectId,
    pub color: Rgb,
}

const PERSON_PROPS: &[PropertyInfo] = &[
    PropertyInfo::new("name", <String as Mappable>::descriptor).length(80),
    PropertyInfo::new("single", <bool as Mappable>::descriptor),
    PropertyInfo::new("city", <Option<Ref<City>> as Mappable>::descriptor),
    PropertyInfo::new("id", <ObjectId as Mappable>::descriptor).id(true),
    PropertyInfo::new("color", <Rgb as Mappable>::descriptor),
];

impl Mappable for Person {
    fn descriptor() -> TypeDescriptor {
        TypeDescriptor::embedded::<Person>(|| PERSON_PROPS)
    }

    fn to_datum(&self) -> Datum {
        Datum::Record(
            (0..PERSON_PROPS.len())
                .map(|i| (PERSON_PROPS[i].name, self.get(i).unwrap_or(Datum::NULL)))
                .collect(),
        )
    }

    fn from_datum(mut datum: Datum) -> Result<Self> {
        let mut person = Person::default();
        for (i, property) in PERSON_PROPS.iter().enumerate() {
            person.set(i, datum.take_field(property.name)?)?;
        }
        Ok(person)
    }
}

impl Entity for Person {
    const NAME: &'static str = "Person";

    fn properties() -> &'static [PropertyInfo] {
        PERSON_PROPS
    }

    fn get(&self, index: usize) -> Result<Datum> {
        Ok(match index {
            0 => self.name.to_datum(),
            1 => self.single.to_datum(),
            2 => self.city.to_datum(),
            3 => self.id.to_datum(),
            4 => self.color.to_datum(),
            _ => return Err(no_such_property(Self::NAME, index)),
        })
    }

    fn set(&mut self, index: usize, value: Datum) -> Result<()> {
        match index {
            0 => self.name = Mappable::from_datum(value)?,
            1 => self.single = Mappable::from_datum(value)?,
            2 => self.city = Mappable::from_datum(value)?,
            3 => self.id = Mappable::from_datum(value)?,
            4 => self.color = Mappable::from_datum(value)?,
            _ => return Err(no_such_property(Self::NAME, index)),
        }
        Ok(())
    }
}
