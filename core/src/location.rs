//! Location factors and the lookup seam the calculator reads them through.
//!
//! RULE: when several rows match, the most recently inserted one wins.

use crate::error::{CalcResult, ValuationError};
use serde::{Deserialize, Serialize};

pub const MIN_LOCATION_FACTOR: f64 = 0.5;
pub const MAX_LOCATION_FACTOR: f64 = 2.0;

/// Multiplier applied when no row matches a city.
pub const NEUTRAL_LOCATION_FACTOR: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocationFactor {
    #[serde(default)]
    pub id:           Option<i64>,
    pub city:         String,
    #[serde(default)]
    pub neighborhood: Option<String>,
    #[serde(default)]
    pub postal_code:  Option<String>,
    pub multiplier:   f64,
    #[serde(default)]
    pub created_at:   Option<String>,
}

impl LocationFactor {
    pub fn new(city: &str, neighborhood: Option<&str>, postal_code: Option<&str>, multiplier: f64) -> Self {
        Self {
            id: None,
            city: city.to_string(),
            neighborhood: neighborhood.map(str::to_string),
            postal_code: postal_code.map(str::to_string),
            multiplier,
            created_at: None,
        }
    }

    pub fn validate(&self) -> CalcResult<()> {
        let mut reasons = Vec::new();
        if self.city.trim().is_empty() {
            reasons.push("city is required".to_string());
        }
        if !(MIN_LOCATION_FACTOR..=MAX_LOCATION_FACTOR).contains(&self.multiplier) {
            reasons.push(format!(
                "multiplier must be between {MIN_LOCATION_FACTOR} and {MAX_LOCATION_FACTOR}"
            ));
        }
        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ValuationError::InvalidLocationFactor { reasons })
        }
    }

    /// "city - neighborhood - postal code", blanks skipped.
    pub fn label(&self) -> String {
        let mut parts = vec![self.city.as_str()];
        for part in [self.neighborhood.as_deref(), self.postal_code.as_deref()]
            .into_iter()
            .flatten()
        {
            if !part.trim().is_empty() {
                parts.push(part);
            }
        }
        parts.join(" - ")
    }
}

/// Anything that can answer "latest multiplier for this city / postal code".
///
/// `Ok(None)` is a miss, not an error; the calculator substitutes the
/// neutral factor.
pub trait LocationFactorSource {
    fn latest_factor(&self, city: &str, postal_code: Option<&str>) -> CalcResult<Option<f64>>;
}

impl<T: LocationFactorSource + ?Sized> LocationFactorSource for &T {
    fn latest_factor(&self, city: &str, postal_code: Option<&str>) -> CalcResult<Option<f64>> {
        (**self).latest_factor(city, postal_code)
    }
}

/// In-process lookup table, kept in insertion order.
#[derive(Debug, Clone, Default)]
pub struct LocationTable {
    rows: Vec<LocationFactor>,
}

impl LocationTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_rows(rows: Vec<LocationFactor>) -> CalcResult<Self> {
        let mut table = Self::new();
        for row in rows {
            table.insert(row)?;
        }
        Ok(table)
    }

    pub fn insert(&mut self, mut row: LocationFactor) -> CalcResult<()> {
        row.validate()?;
        row.id = Some(self.rows.len() as i64 + 1);
        self.rows.push(row);
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }
}

impl LocationFactorSource for LocationTable {
    fn latest_factor(&self, city: &str, postal_code: Option<&str>) -> CalcResult<Option<f64>> {
        let found = self.rows.iter().rev().find(|row| {
            row.city == city
                && match postal_code {
                    Some(cep) => row.postal_code.as_deref() == Some(cep),
                    None => true,
                }
        });
        Ok(found.map(|row| row.multiplier))
    }
}
