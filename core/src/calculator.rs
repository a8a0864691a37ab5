//! Valuation calculator: the pricing and return figures for one property.
//!
//! ORDER (fixed): sale price -> costs -> profits -> minimum price ->
//!   margin -> ROI -> payback.
//!
//! RULES:
//!   - Every money and percentage figure is rounded to 2 decimals as it is
//!     produced; later figures are derived from the rounded ones.
//!   - Divisions by total cost or margin are guarded, never raised.
//!   - The parameter set is validated on every valuation; an invalid one
//!     (NaN base price, negative finish factor) is an error, not a zero.
//!   - compute_financials() never fails. Callers that need to tell a real
//!     zero from a failed computation use try_compute_financials().

use crate::{
    error::{CalcResult, ValuationError},
    location::{LocationFactorSource, NEUTRAL_LOCATION_FACTOR},
    parameters::GlobalParameters,
    property::Property,
    types::round2,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Cache key: city plus the (normalized) postal code, if any.
type LocationKey = (String, Option<String>);

pub struct ValuationCalculator<L> {
    params:         GlobalParameters,
    locations:      L,
    location_cache: HashMap<LocationKey, f64>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct CostBreakdown {
    pub acquisition: f64,
    pub renovation:  f64,
    pub transaction: f64,
    pub total:       f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ProfitBreakdown {
    pub lender_pct:      f64,
    pub lender_profit:   f64,
    pub investor_pct:    f64,
    pub investor_profit: f64,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct ValuationResult {
    pub estimated_price: f64,
    pub total_cost:      f64,
    pub lender_profit:   f64,
    pub investor_profit: f64,
    pub minimum_price:   f64,
    pub margin:          f64,
    pub roi_pct:         f64,
    /// None when the margin is not positive.
    pub payback_months:  Option<f64>,
    pub location_factor: f64,
    pub finish_factor:   f64,
    pub lender_pct:      f64,
    pub investor_pct:    f64,
    pub base_price_per_sqm: f64,
}

impl ValuationResult {
    /// The fail-soft answer: every figure zero, no payback.
    pub fn zeroed() -> Self {
        Self::default()
    }
}

impl<L: LocationFactorSource> ValuationCalculator<L> {
    pub fn new(params: GlobalParameters, locations: L) -> Self {
        Self {
            params,
            locations,
            location_cache: HashMap::new(),
        }
    }

    pub fn parameters(&self) -> &GlobalParameters {
        &self.params
    }

    /// Swap in a new parameter set. The location cache is unaffected.
    pub fn set_parameters(&mut self, params: GlobalParameters) {
        self.params = params;
    }

    pub fn locations(&self) -> &L {
        &self.locations
    }

    /// Forget every memoized location factor. Call after the lookup
    /// table changes; nothing invalidates the cache automatically.
    pub fn clear_cache(&mut self) {
        self.location_cache.clear();
    }

    pub fn cache_len(&self) -> usize {
        self.location_cache.len()
    }

    /// `base_price_per_sqm × area × location_factor × finish_factor`.
    /// A missing, zero or negative area prices at zero.
    pub fn estimate_sale_price(&self, property: &Property, location_factor: f64) -> f64 {
        let area = property.area_sqm;
        if !(area.is_finite() && area > 0.0) {
            return 0.0;
        }
        let finish_factor = self.params.finish_factor(property.finish_tier);
        let price = self.params.base_price_per_sqm * area * location_factor * finish_factor;
        round2(price.max(0.0))
    }

    /// Latest multiplier for `(city, postal_code)`, or the neutral 1.0 when
    /// nothing matches or the lookup fails.
    pub fn resolve_location_factor(&mut self, city: &str, postal_code: Option<&str>) -> f64 {
        match self.try_resolve_location_factor(city, postal_code) {
            Ok(factor) => factor,
            Err(e) => {
                log::error!("valuation: location lookup failed for {city}: {e}; using neutral factor");
                NEUTRAL_LOCATION_FACTOR
            }
        }
    }

    /// Like resolve_location_factor(), but lookup errors propagate.
    /// Errors are never cached; misses are.
    pub fn try_resolve_location_factor(
        &mut self,
        city: &str,
        postal_code: Option<&str>,
    ) -> CalcResult<f64> {
        let postal_code = postal_code.map(str::trim).filter(|c| !c.is_empty());
        let key: LocationKey = (city.to_string(), postal_code.map(str::to_string));

        if let Some(factor) = self.location_cache.get(&key) {
            log::debug!("valuation: location cache hit {city}/{}", postal_code.unwrap_or("-"));
            return Ok(*factor);
        }

        let factor = match self.locations.latest_factor(city, postal_code)? {
            Some(factor) => factor,
            None => {
                log::warn!(
                    "valuation: no location factor for {city}/{}, using {NEUTRAL_LOCATION_FACTOR}",
                    postal_code.unwrap_or("-")
                );
                NEUTRAL_LOCATION_FACTOR
            }
        };

        self.location_cache.insert(key, factor);
        Ok(factor)
    }

    /// The three cost components and their sum. Absent components are zero.
    pub fn compute_costs(&self, property: &Property) -> CostBreakdown {
        let acquisition = property.acquisition_cost.unwrap_or(0.0);
        let renovation  = property.renovation_cost.unwrap_or(0.0);
        let transaction = property.transaction_cost.unwrap_or(0.0);
        CostBreakdown {
            acquisition,
            renovation,
            transaction,
            total: acquisition + renovation + transaction,
        }
    }

    /// Lender and investor profit as proportional shares of total cost.
    pub fn compute_profits(&self, property: &Property, total_cost: f64) -> ProfitBreakdown {
        let lender_pct = property
            .lender_profit_pct
            .unwrap_or(self.params.default_lender_profit_pct);
        let investor_pct = self.params.target_investor_profit_pct;
        ProfitBreakdown {
            lender_pct,
            lender_profit: round2(total_cost * lender_pct / 100.0),
            investor_pct,
            investor_profit: round2(total_cost * investor_pct / 100.0),
        }
    }

    /// Full valuation. Never fails: on any error the problem is logged
    /// and a zeroed result comes back.
    pub fn compute_financials(&mut self, property: &Property) -> ValuationResult {
        match self.try_compute_financials(property) {
            Ok(result) => result,
            Err(e) => {
                log::error!(
                    "valuation: could not value property {:?} ({}): {e}",
                    property.id,
                    property.city
                );
                ValuationResult::zeroed()
            }
        }
    }

    pub fn try_compute_financials(&mut self, property: &Property) -> CalcResult<ValuationResult> {
        self.params.validate()?;
        check_finite_inputs(property)?;

        let location_factor =
            self.try_resolve_location_factor(&property.city, property.postal_code.as_deref())?;
        ensure_finite("location_factor", location_factor)?;
        let finish_factor = self.params.finish_factor(property.finish_tier);

        let estimated_price = ensure_finite(
            "estimated_price",
            self.estimate_sale_price(property, location_factor),
        )?;
        let costs = self.compute_costs(property);
        let total_cost = ensure_finite("total_cost", round2(costs.total))?;
        let profits = self.compute_profits(property, total_cost);
        ensure_finite("lender_profit", profits.lender_profit)?;
        ensure_finite("investor_profit", profits.investor_profit)?;

        let minimum_price = ensure_finite("minimum_price", round2(total_cost + profits.lender_profit))?;
        let margin = ensure_finite("margin", round2(estimated_price - total_cost))?;
        let roi_pct = ensure_finite("roi_pct", round2(roi_pct(margin, total_cost)))?;
        let payback_months = payback_months(margin, total_cost)
            .map(|months| ensure_finite("payback_months", round2(months)))
            .transpose()?;

        Ok(ValuationResult {
            estimated_price,
            total_cost,
            lender_profit: profits.lender_profit,
            investor_profit: profits.investor_profit,
            minimum_price,
            margin,
            roi_pct,
            payback_months,
            location_factor,
            finish_factor,
            lender_pct: profits.lender_pct,
            investor_pct: profits.investor_pct,
            base_price_per_sqm: self.params.base_price_per_sqm,
        })
    }
}

/// `margin / total_cost × 100`, zero when there is no cost to return on.
pub fn roi_pct(margin: f64, total_cost: f64) -> f64 {
    if total_cost > 0.0 {
        margin / total_cost * 100.0
    } else {
        0.0
    }
}

/// Months to recover total cost if the margin accrues evenly over a year.
pub fn payback_months(margin: f64, total_cost: f64) -> Option<f64> {
    if margin > 0.0 {
        Some(total_cost / (margin / 12.0))
    } else {
        None
    }
}

/// Sums of finite inputs can still overflow; such figures are errors, not zeros.
fn ensure_finite(field: &'static str, value: f64) -> CalcResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(ValuationError::NonFiniteInput { field })
    }
}

fn check_finite_inputs(property: &Property) -> CalcResult<()> {
    let fields = [
        ("acquisition_cost", property.acquisition_cost),
        ("renovation_cost", property.renovation_cost),
        ("transaction_cost", property.transaction_cost),
        ("lender_profit_pct", property.lender_profit_pct),
    ];
    for (field, value) in fields {
        if let Some(v) = value {
            if !v.is_finite() {
                return Err(ValuationError::NonFiniteInput { field });
            }
        }
    }
    Ok(())
}
