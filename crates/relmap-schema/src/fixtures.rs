//! Derived entities shared by the unit tests.

use relmap_core::{ObjectId, Ref};
use relmap_macros::{Embeddable, Entity};

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
    #[relmap(indexed, length = 80)]
    pub name: String,
    #[relmap(unique)]
    pub email: Option<String>,
    pub city: Option<Ref<City>>,
    #[relmap(id)]
    pub id: ObjectId,
}

/// No id property.
#[derive(Debug, Clone, PartialEq, Entity)]
#[relmap(table = "TAGS")]
pub struct Tag {
    pub label: String,
    pub location: GeoLocation,
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
