//! Store methods for location factors.

use super::{now_timestamp, ValuationStore};
use crate::{
    error::CalcResult,
    location::{LocationFactor, LocationFactorSource},
};
use rusqlite::{params, OptionalExtension};

impl ValuationStore {
    /// Validate and append a location factor. Returns the new row id.
    /// Later rows shadow earlier ones for the same city / postal code.
    pub fn insert_location_factor(&self, factor: &LocationFactor) -> CalcResult<i64> {
        factor.validate()?;
        self.conn.execute(
            "INSERT INTO location_factor (city, neighborhood, postal_code, multiplier, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                factor.city,
                factor.neighborhood,
                factor.postal_code,
                factor.multiplier,
                factor.created_at.clone().unwrap_or_else(now_timestamp),
            ],
        )?;
        Ok(self.conn.last_insert_rowid())
    }

    /// Latest multiplier for the city, narrowed by postal code when given.
    pub fn latest_location_factor(
        &self,
        city: &str,
        postal_code: Option<&str>,
    ) -> CalcResult<Option<f64>> {
        let factor = match postal_code {
            Some(cep) => self
                .conn
                .query_row(
                    "SELECT multiplier FROM location_factor
                     WHERE city = ?1 AND postal_code = ?2
                     ORDER BY id DESC LIMIT 1",
                    params![city, cep],
                    |row| row.get(0),
                )
                .optional()?,
            None => self
                .conn
                .query_row(
                    "SELECT multiplier FROM location_factor
                     WHERE city = ?1
                     ORDER BY id DESC LIMIT 1",
                    params![city],
                    |row| row.get(0),
                )
                .optional()?,
        };
        Ok(factor)
    }

    /// Every row for a city, oldest first.
    pub fn location_factors_for_city(&self, city: &str) -> CalcResult<Vec<LocationFactor>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, city, neighborhood, postal_code, multiplier, created_at
             FROM location_factor WHERE city = ?1
             ORDER BY id ASC",
        )?;
        let rows = stmt
            .query_map(params![city], |row| {
                Ok(LocationFactor {
                    id:           Some(row.get(0)?),
                    city:         row.get(1)?,
                    neighborhood: row.get(2)?,
                    postal_code:  row.get(3)?,
                    multiplier:   row.get(4)?,
                    created_at:   Some(row.get(5)?),
                })
            })?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(rows)
    }

    pub fn location_factor_count(&self) -> CalcResult<i64> {
        let count: i64 = self.conn.query_row(
            "SELECT COUNT(*) FROM location_factor",
            [],
            |row| row.get(0),
        )?;
        Ok(count)
    }
}

impl LocationFactorSource for ValuationStore {
    fn latest_factor(&self, city: &str, postal_code: Option<&str>) -> CalcResult<Option<f64>> {
        self.latest_location_factor(city, postal_code)
    }
}
