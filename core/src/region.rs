//! City -> region mapping for Santa Catarina.
//!
//! Static table; the first region that lists a city wins. Cities not
//! listed are placed by coordinates when known, otherwise Central.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Region {
    #[serde(rename = "Norte")]
    North,
    #[serde(rename = "Sul")]
    South,
    #[serde(rename = "Leste")]
    East,
    #[serde(rename = "Oeste")]
    West,
    #[serde(rename = "Central")]
    Central,
}

impl Region {
    pub fn label(&self) -> &'static str {
        match self {
            Region::North   => "Norte",
            Region::South   => "Sul",
            Region::East    => "Leste",
            Region::West    => "Oeste",
            Region::Central => "Central",
        }
    }

    pub fn parse(label: &str) -> Option<Self> {
        match label {
            "Norte"   => Some(Region::North),
            "Sul"     => Some(Region::South),
            "Leste"   => Some(Region::East),
            "Oeste"   => Some(Region::West),
            "Central" => Some(Region::Central),
            _         => None,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegionEntry {
    pub region: Region,
    pub cities: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct RegionMap {
    by_city: HashMap<String, Region>,
}

impl RegionMap {
    pub fn from_entries(entries: &[RegionEntry]) -> Self {
        let mut by_city = HashMap::new();
        for entry in entries {
            for city in &entry.cities {
                by_city.entry(city.clone()).or_insert(entry.region);
            }
        }
        Self { by_city }
    }

    /// Region the table lists `city` under, if any.
    pub fn listed_region(&self, city: &str) -> Option<Region> {
        self.by_city.get(city).copied()
    }

    pub fn region_for_city(&self, city: &str) -> Region {
        self.listed_region(city).unwrap_or(Region::Central)
    }

    /// City table first; an unlisted city with coordinates falls back to
    /// region_for_coordinates(), one without falls into Central.
    pub fn region_for_location(
        &self,
        city: &str,
        latitude: Option<f64>,
        longitude: Option<f64>,
    ) -> Region {
        if let Some(region) = self.listed_region(city) {
            return region;
        }
        match (latitude, longitude) {
            (Some(lat), Some(lon)) => region_for_coordinates(lat, lon),
            _ => Region::Central,
        }
    }

    /// Cities explicitly listed under `region`, sorted.
    pub fn cities_in(&self, region: Region) -> Vec<&str> {
        let mut cities: Vec<&str> = self
            .by_city
            .iter()
            .filter(|(_, r)| **r == region)
            .map(|(c, _)| c.as_str())
            .collect();
        cities.sort_unstable();
        cities
    }

    pub fn len(&self) -> usize {
        self.by_city.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_city.is_empty()
    }
}

/// Coarse fallback when only coordinates are known.
pub fn region_for_coordinates(latitude: f64, longitude: f64) -> Region {
    if latitude > -27.0 {
        Region::North
    } else if latitude < -28.5 {
        Region::South
    } else if longitude < -52.0 {
        Region::West
    } else if longitude > -49.0 {
        Region::East
    } else {
        Region::Central
    }
}
