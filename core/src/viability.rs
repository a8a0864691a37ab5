//! Viability checks over a finished valuation.
//!
//! Pure predicates: nothing here reads the store or the calculator cache.

use crate::{
    calculator::{ValuationCalculator, ValuationResult},
    location::LocationFactorSource,
    property::Property,
};
use serde::{Deserialize, Serialize};

/// ROI a deal must reach, in percent.
pub const MIN_ROI_PCT: f64 = 10.0;
/// Margin a deal must reach, as a fraction of total cost.
pub const MIN_MARGIN_RATIO: f64 = 0.05;

pub const REC_NEGATIVE_MARGIN: &str = "Negative margin - reassess sale price or costs";
pub const REC_LOW_ROI: &str         = "ROI below the recommended minimum";
pub const REC_THIN_MARGIN: &str     = "Margin too thin - high risk";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViabilityThresholds {
    pub min_roi_pct:      f64,
    pub min_margin_ratio: f64,
}

impl Default for ViabilityThresholds {
    fn default() -> Self {
        Self {
            min_roi_pct:      MIN_ROI_PCT,
            min_margin_ratio: MIN_MARGIN_RATIO,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ViabilityReport {
    pub margin_positive: bool,
    pub roi_minimum:     bool,
    pub margin_minimum:  bool,
    /// All three flags hold.
    pub viable:          bool,
    pub recommendations: Vec<String>,
}

/// Viability against the fixed 10 % ROI / 5 % margin thresholds.
pub fn evaluate_viability(result: &ValuationResult) -> ViabilityReport {
    evaluate_viability_with(result, &ViabilityThresholds::default())
}

pub fn evaluate_viability_with(
    result: &ValuationResult,
    thresholds: &ViabilityThresholds,
) -> ViabilityReport {
    let margin_positive = result.margin > 0.0;
    let roi_minimum = result.roi_pct >= thresholds.min_roi_pct;
    let margin_minimum = result.margin >= result.total_cost * thresholds.min_margin_ratio;

    let mut recommendations = Vec::new();
    if !margin_positive {
        recommendations.push(REC_NEGATIVE_MARGIN.to_string());
    }
    if !roi_minimum {
        recommendations.push(REC_LOW_ROI.to_string());
    }
    if !margin_minimum {
        recommendations.push(REC_THIN_MARGIN.to_string());
    }

    ViabilityReport {
        margin_positive,
        roi_minimum,
        margin_minimum,
        viable: margin_positive && roi_minimum && margin_minimum,
        recommendations,
    }
}

impl<L: LocationFactorSource> ValuationCalculator<L> {
    /// Value the property and judge the result in one call.
    pub fn assess(&mut self, property: &Property) -> (ValuationResult, ViabilityReport) {
        let result = self.compute_financials(property);
        let report = evaluate_viability(&result);
        (result, report)
    }
}
