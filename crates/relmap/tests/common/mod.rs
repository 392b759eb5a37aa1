#![allow(dead_code)]

use relmap::prelude::*;

#[derive(Debug, Clone, PartialEq, Default, Embeddable)]
pub struct GeoLocation {
    pub latitude: f64,
    pub longitude: f64,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct City {
    pub name: String,
    pub inhabitants: i32,
    pub geo_location: Option<GeoLocation>,
    #[relmap(transient)]
    pub notes: String,
    #[relmap(id)]
    pub id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Person {
    #[relmap(length = 120)]
    pub name: String,
    pub single: Option<bool>,
    pub city: Option<Ref<City>>,
    #[relmap(id)]
    pub id: ObjectId,
}

#[derive(Debug, Clone, PartialEq, Entity)]
pub struct Document {
    pub body: serde_json::Value,
    #[relmap(id)]
    pub id: i64,
}

pub fn bern() -> City {
    City {
        name: "Bern".to_string(),
        inhabitants: 134_000,
        geo_location: Some(GeoLocation {
            latitude: 46.95,
            longitude: 7.45,
        }),
        notes: "capital".to_string(),
        id: ObjectId::new(3, 1),
    }
}

pub fn ada() -> Person {
    Person {
        name: "Ada".to_string(),
        single: Some(true),
        city: Some(Ref::new(ObjectId::new(3, 1))),
        id: ObjectId::new(9, 4),
    }
}

pub fn all_dialects() -> [Dialect; 4] {
    [
        Dialect::generic(),
        Dialect::postgres(),
        Dialect::mysql(),
        Dialect::sqlite(),
    ]
}
