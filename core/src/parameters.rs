//! Global pricing parameters.
//!
//! Passed into the calculator explicitly. Persisted as one key/value
//! row per field (see store/parameters.rs).

use crate::{
    error::{CalcResult, ValuationError},
    types::FinishTier,
};
use serde::{Deserialize, Serialize};

pub const KEY_BASE_PRICE_PER_SQM: &str        = "base_price_per_sqm";
pub const KEY_FINISH_FACTOR_LOW: &str         = "finish_factor_low";
pub const KEY_FINISH_FACTOR_MEDIUM: &str      = "finish_factor_medium";
pub const KEY_FINISH_FACTOR_HIGH: &str        = "finish_factor_high";
pub const KEY_DEFAULT_LENDER_PROFIT_PCT: &str = "default_lender_profit_pct";
pub const KEY_TARGET_INVESTOR_PROFIT_PCT: &str = "target_investor_profit_pct";

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct GlobalParameters {
    pub base_price_per_sqm:         f64,
    pub finish_factor_low:          f64,
    pub finish_factor_medium:       f64,
    pub finish_factor_high:         f64,
    pub default_lender_profit_pct:  f64,
    pub target_investor_profit_pct: f64,
}

impl Default for GlobalParameters {
    fn default() -> Self {
        Self {
            base_price_per_sqm:         5000.0,
            finish_factor_low:          0.9,
            finish_factor_medium:       1.0,
            finish_factor_high:         1.1,
            default_lender_profit_pct:  10.0,
            target_investor_profit_pct: 15.0,
        }
    }
}

impl GlobalParameters {
    pub fn finish_factor(&self, tier: FinishTier) -> f64 {
        match tier {
            FinishTier::Low    => self.finish_factor_low,
            FinishTier::Medium => self.finish_factor_medium,
            FinishTier::High   => self.finish_factor_high,
        }
    }

    /// The persisted key/value rows, in a stable order.
    pub fn entries(&self) -> [(&'static str, f64); 6] {
        [
            (KEY_BASE_PRICE_PER_SQM,         self.base_price_per_sqm),
            (KEY_FINISH_FACTOR_LOW,          self.finish_factor_low),
            (KEY_FINISH_FACTOR_MEDIUM,       self.finish_factor_medium),
            (KEY_FINISH_FACTOR_HIGH,         self.finish_factor_high),
            (KEY_DEFAULT_LENDER_PROFIT_PCT,  self.default_lender_profit_pct),
            (KEY_TARGET_INVESTOR_PROFIT_PCT, self.target_investor_profit_pct),
        ]
    }

    /// Set one field by its persisted key. Returns false for unknown keys,
    /// which are left alone.
    pub fn apply_entry(&mut self, key: &str, value: f64) -> bool {
        let slot = match key {
            KEY_BASE_PRICE_PER_SQM         => &mut self.base_price_per_sqm,
            KEY_FINISH_FACTOR_LOW          => &mut self.finish_factor_low,
            KEY_FINISH_FACTOR_MEDIUM       => &mut self.finish_factor_medium,
            KEY_FINISH_FACTOR_HIGH         => &mut self.finish_factor_high,
            KEY_DEFAULT_LENDER_PROFIT_PCT  => &mut self.default_lender_profit_pct,
            KEY_TARGET_INVESTOR_PROFIT_PCT => &mut self.target_investor_profit_pct,
            _ => {
                log::debug!("parameters: ignoring unknown key '{key}'");
                return false;
            }
        };
        *slot = value;
        true
    }

    pub fn validate(&self) -> CalcResult<()> {
        let mut reasons = Vec::new();

        if !(self.base_price_per_sqm.is_finite() && self.base_price_per_sqm > 0.0) {
            reasons.push(format!("{KEY_BASE_PRICE_PER_SQM} must be greater than zero"));
        }
        for (key, factor) in [
            (KEY_FINISH_FACTOR_LOW,    self.finish_factor_low),
            (KEY_FINISH_FACTOR_MEDIUM, self.finish_factor_medium),
            (KEY_FINISH_FACTOR_HIGH,   self.finish_factor_high),
        ] {
            if !(factor.is_finite() && factor > 0.0) {
                reasons.push(format!("{key} must be greater than zero"));
            }
        }
        for (key, pct) in [
            (KEY_DEFAULT_LENDER_PROFIT_PCT,  self.default_lender_profit_pct),
            (KEY_TARGET_INVESTOR_PROFIT_PCT, self.target_investor_profit_pct),
        ] {
            if !(0.0..=100.0).contains(&pct) {
                reasons.push(format!("{key} must be between 0 and 100"));
            }
        }

        if reasons.is_empty() {
            Ok(())
        } else {
            Err(ValuationError::InvalidParameters { reasons })
        }
    }
}
