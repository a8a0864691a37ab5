//! Property record: the input to every valuation.

use crate::{
    error::{CalcResult, ValuationError},
    types::{FinishTier, PropertyId, PropertyStatus},
};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Property {
    #[serde(default)]
    pub id:               Option<PropertyId>,
    pub address:          String,
    pub city:             String,
    pub state:            String,
    #[serde(default)]
    pub postal_code:      Option<String>,
    #[serde(default)]
    pub latitude:         Option<f64>,
    #[serde(default)]
    pub longitude:        Option<f64>,
    pub area_sqm:         f64,
    #[serde(default)]
    pub bedrooms:         u32,
    #[serde(default)]
    pub bathrooms:        u32,
    #[serde(default)]
    pub year_built:       Option<i32>,
    #[serde(default)]
    pub finish_tier:      FinishTier,
    #[serde(default)]
    pub acquisition_cost: Option<f64>,
    #[serde(default)]
    pub renovation_cost:  Option<f64>,
    #[serde(default)]
    pub transaction_cost: Option<f64>,
    /// Unset means "use the global default lender percentage". An explicit
    /// 0 is a real zero-percent share and does not fall back to the default.
    #[serde(default)]
    pub lender_profit_pct: Option<f64>,
    #[serde(default)]
    pub status:           PropertyStatus,
    #[serde(default)]
    pub created_at:       Option<String>,
    #[serde(default)]
    pub updated_at:       Option<String>,
}

impl Property {
    /// Check the record before it is persisted.
    /// Every failed rule is reported, not just the first.
    pub fn validate(&self) -> CalcResult<()> {
        let mut reasons = Vec::new();

        if self.address.trim().is_empty() {
            reasons.push("address is required".to_string());
        }
        if self.city.trim().is_empty() {
            reasons.push("city is required".to_string());
        }
        if self.state.trim().is_empty() {
            reasons.push("state is required".to_string());
        }
        if !(self.area_sqm.is_finite() && self.area_sqm > 0.0) {
            reasons.push("area must be greater than zero".to_string());
        }

        let costs = [
            ("acquisition cost", self.acquisition_cost),
            ("renovation cost", self.renovation_cost),
            ("transaction cost", self.transaction_cost),
        ];
        for (label, cost) in costs {
            if let Some(c) = cost {
                if !c.is_finite() || c < 0.0 {
                    reasons.push(format!("{label} cannot be negative"));
                }
            }
        }

        if let Some(pct) = self.lender_profit_pct {
            if !(0.0..=100.0).contains(&pct) {
                reasons.push("lender profit percentage must be between 0 and 100".to_string());
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ValuationError::InvalidProperty { reasons })
        }
    }

    /// "address, city, state, postal code" with blanks skipped.
    pub fn full_address(&self) -> String {
        let mut parts: Vec<&str> = vec![&self.address, &self.city, &self.state];
        if let Some(cep) = self.postal_code.as_deref() {
            parts.push(cep);
        }
        parts
            .into_iter()
            .filter(|p| !p.trim().is_empty())
            .collect::<Vec<_>>()
            .join(", ")
    }

    /// Postal code with `-` and `.` removed, for substring search.
    pub fn normalized_postal_code(&self) -> String {
        self.postal_code
            .as_deref()
            .map(normalize_postal_code)
            .unwrap_or_default()
    }
}

pub fn normalize_postal_code(cep: &str) -> String {
    cep.chars().filter(|c| *c != '-' && *c != '.').collect()
}
