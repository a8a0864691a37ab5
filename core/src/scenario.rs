//! Scenario grid: the same property valued under different lender
//! percentages.
//!
//! NOTE: the investor percentage is carried into each summary and key but
//! does not feed the valuation. The minimum price and margin formulas do
//! not depend on it either, so every investor column of a lender row is
//! identical.

use crate::{
    calculator::ValuationCalculator,
    location::LocationFactorSource,
    property::Property,
};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScenarioSummary {
    pub lender_pct:    f64,
    pub investor_pct:  f64,
    pub margin:        f64,
    pub roi_pct:       f64,
    pub minimum_price: f64,
}

/// `credor_{lender}_investidor_{investor}`; floats keep their decimal
/// point (`10.0`, `12.5`).
pub fn scenario_key(lender_pct: f64, investor_pct: f64) -> String {
    format!("credor_{lender_pct:?}_investidor_{investor_pct:?}")
}

impl<L: LocationFactorSource> ValuationCalculator<L> {
    pub fn simulate_scenarios(
        &mut self,
        property: &Property,
        lender_candidates: &[f64],
        investor_candidates: &[f64],
    ) -> BTreeMap<String, ScenarioSummary> {
        let mut scenarios = BTreeMap::new();

        for &lender_pct in lender_candidates {
            for &investor_pct in investor_candidates {
                let mut variant = property.clone();
                variant.lender_profit_pct = Some(lender_pct);

                let result = self.compute_financials(&variant);
                scenarios.insert(
                    scenario_key(lender_pct, investor_pct),
                    ScenarioSummary {
                        lender_pct,
                        investor_pct,
                        margin: result.margin,
                        roi_pct: result.roi_pct,
                        minimum_price: result.minimum_price,
                    },
                );
            }
        }

        log::debug!(
            "scenario: simulated {} combinations for property {:?}",
            scenarios.len(),
            property.id
        );
        scenarios
    }
}
