//! Store methods for global parameters (one key/value row per field).

use super::{now_timestamp, ValuationStore};
use crate::{
    error::CalcResult,
    parameters::{
        GlobalParameters, KEY_BASE_PRICE_PER_SQM, KEY_DEFAULT_LENDER_PROFIT_PCT,
        KEY_FINISH_FACTOR_HIGH, KEY_FINISH_FACTOR_LOW, KEY_FINISH_FACTOR_MEDIUM,
        KEY_TARGET_INVESTOR_PROFIT_PCT,
    },
};
use rusqlite::params;

pub(super) fn describe(key: &str) -> &'static str {
    match key {
        KEY_BASE_PRICE_PER_SQM         => "Base price per square meter",
        KEY_FINISH_FACTOR_LOW          => "Multiplier for low finish quality",
        KEY_FINISH_FACTOR_MEDIUM       => "Multiplier for medium finish quality",
        KEY_FINISH_FACTOR_HIGH         => "Multiplier for high finish quality",
        KEY_DEFAULT_LENDER_PROFIT_PCT  => "Default lender profit percentage",
        KEY_TARGET_INVESTOR_PROFIT_PCT => "Target investor profit percentage",
        _                              => "",
    }
}

impl ValuationStore {
    /// Defaults overlaid with whatever rows are stored.
    /// Unknown keys are ignored.
    pub fn load_parameters(&self) -> CalcResult<GlobalParameters> {
        let mut stmt = self
            .conn
            .prepare("SELECT key, value FROM global_parameter ORDER BY key")?;
        let rows = stmt
            .query_map([], |row| Ok((row.get::<_, String>(0)?, row.get::<_, f64>(1)?)))?
            .collect::<Result<Vec<_>, _>>()?;

        let mut params = GlobalParameters::default();
        for (key, value) in rows {
            params.apply_entry(&key, value);
        }
        Ok(params)
    }

    /// Persist every field in one transaction: either all six rows are
    /// written or none are.
    pub fn save_parameters(&self, parameters: &GlobalParameters) -> CalcResult<()> {
        parameters.validate()?;
        let now = now_timestamp();

        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in parameters.entries() {
            tx.execute(
                "INSERT INTO global_parameter (key, value, description, updated_at)
                 VALUES (?1, ?2, ?3, ?4)
                 ON CONFLICT(key) DO UPDATE SET value = excluded.value,
                                                updated_at = excluded.updated_at",
                params![key, value, describe(key), now],
            )?;
        }
        tx.commit()?;

        log::info!(
            "store: parameters saved (base price/m² {:.2}, investor target {:.1}%)",
            parameters.base_price_per_sqm,
            parameters.target_investor_profit_pct
        );
        Ok(())
    }

    pub fn reset_parameters(&self) -> CalcResult<GlobalParameters> {
        let defaults = GlobalParameters::default();
        self.save_parameters(&defaults)?;
        Ok(defaults)
    }

    /// Raw stored value for one key (for tests).
    pub fn parameter_value(&self, key: &str) -> CalcResult<Option<f64>> {
        use rusqlite::OptionalExtension;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM global_parameter WHERE key = ?1",
                params![key],
                |row| row.get(0),
            )
            .optional()?;
        Ok(value)
    }
}
