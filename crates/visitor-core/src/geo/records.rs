//! Lookup results returned by a [`GeoProvider`](super::GeoProvider).
//!
//! Field names follow the MaxMind DB schema so providers can deserialize straight into these
//! types. Everything is optional; fields a database edition does not carry stay `None`.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Locale used when picking a place name.
pub const NAME_LOCALE: &str = "en";

/// Localized names keyed by locale code.
pub type Names = BTreeMap<String, String>;

fn localized(names: &Option<Names>) -> Option<String> {
    names.as_ref().and_then(|n| n.get(NAME_LOCALE)).cloned()
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Continent {
    pub code: Option<String>,
    pub geoname_id: Option<u32>,
    pub names: Option<Names>,
}

impl Continent {
    pub fn name(&self) -> Option<String> {
        localized(&self.names)
    }
}

/// A country or subdivision; both carry the same fields.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Region {
    pub geoname_id: Option<u32>,
    pub iso_code: Option<String>,
    pub confidence: Option<u32>,
    pub names: Option<Names>,
}

impl Region {
    pub fn name(&self) -> Option<String> {
        localized(&self.names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct City {
    pub geoname_id: Option<u32>,
    pub confidence: Option<u32>,
    pub names: Option<Names>,
}

impl City {
    pub fn name(&self) -> Option<String> {
        localized(&self.names)
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub accuracy_radius: Option<u32>,
    pub average_income: Option<u32>,
    pub latitude: Option<f64>,
    pub longitude: Option<f64>,
    pub metro_code: Option<u32>,
    pub population_density: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Postal {
    pub code: Option<String>,
    pub confidence: Option<u32>,
}

/// City-level record (City and Enterprise editions).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CityRecord {
    pub continent: Option<Continent>,
    pub country: Option<Region>,
    /// Ordered from largest to smallest region.
    pub subdivisions: Option<Vec<Region>>,
    pub city: Option<City>,
    pub location: Option<Location>,
    pub postal: Option<Postal>,
}

impl CityRecord {
    /// The smallest subdivision the address falls in.
    pub fn most_specific_subdivision(&self) -> Option<&Region> {
        self.subdivisions.as_ref().and_then(|s| s.last())
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DomainRecord {
    pub domain: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IspRecord {
    pub isp: Option<String>,
    pub organization: Option<String>,
    pub autonomous_system_number: Option<u32>,
    pub autonomous_system_organization: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionTypeRecord {
    pub connection_type: Option<String>,
}
