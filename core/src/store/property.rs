//! Store methods for the property repository.

use super::{now_timestamp, ValuationStore};
use crate::{
    error::{CalcResult, ValuationError},
    property::{normalize_postal_code, Property},
    region::{Region, RegionMap},
    types::{FinishTier, PropertyId, PropertyStatus},
};
use rusqlite::{params, OptionalExtension, Row};

const PROPERTY_COLUMNS: &str =
    "id, address, city, state, postal_code, latitude, longitude,
     area_sqm, bedrooms, bathrooms, year_built, finish_tier,
     acquisition_cost, renovation_cost, transaction_cost,
     lender_profit_pct, status, created_at, updated_at";

/// Table filter. Unset fields match everything.
#[derive(Debug, Clone, Default)]
pub struct PropertyFilter {
    /// Substring of the postal code; `-` and `.` are ignored on both sides.
    pub postal_code: Option<String>,
    pub city:        Option<String>,
    pub state:       Option<String>,
    pub region:      Option<Region>,
}

impl PropertyFilter {
    pub fn matches(&self, property: &Property, regions: &RegionMap) -> bool {
        if let Some(cep) = self.postal_code.as_deref().filter(|c| !c.trim().is_empty()) {
            let wanted = normalize_postal_code(cep.trim());
            if !property.normalized_postal_code().contains(&wanted) {
                return false;
            }
        }
        if let Some(region) = self.region {
            let placed =
                regions.region_for_location(&property.city, property.latitude, property.longitude);
            if placed != region {
                return false;
            }
        }
        if let Some(city) = self.city.as_deref() {
            if property.city != city {
                return false;
            }
        }
        if let Some(state) = self.state.as_deref() {
            if property.state != state {
                return false;
            }
        }
        true
    }
}

impl ValuationStore {
    /// Validate and insert. Any id on the record is ignored.
    pub fn insert_property(&self, property: &Property) -> CalcResult<PropertyId> {
        property.validate()?;
        let now = now_timestamp();
        self.conn.execute(
            "INSERT INTO property (
                address, city, state, postal_code, latitude, longitude,
                area_sqm, bedrooms, bathrooms, year_built, finish_tier,
                acquisition_cost, renovation_cost, transaction_cost,
                lender_profit_pct, status, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12, ?13, ?14, ?15, ?16, ?17, ?18)",
            params![
                property.address,
                property.city,
                property.state,
                property.postal_code,
                property.latitude,
                property.longitude,
                property.area_sqm,
                property.bedrooms,
                property.bathrooms,
                property.year_built,
                property.finish_tier.as_str(),
                property.acquisition_cost,
                property.renovation_cost,
                property.transaction_cost,
                property.lender_profit_pct,
                property.status.as_str(),
                now,
                now,
            ],
        )?;
        let id = self.conn.last_insert_rowid();
        log::debug!("store: inserted property {id} ({})", property.city);
        Ok(id)
    }

    /// Overwrite every editable column of an existing property.
    pub fn update_property(&self, property: &Property) -> CalcResult<()> {
        let id = property.id.ok_or_else(|| ValuationError::InvalidProperty {
            reasons: vec!["id is required for update".to_string()],
        })?;
        property.validate()?;

        let changed = self.conn.execute(
            "UPDATE property SET
                address = ?1, city = ?2, state = ?3, postal_code = ?4,
                latitude = ?5, longitude = ?6, area_sqm = ?7,
                bedrooms = ?8, bathrooms = ?9, year_built = ?10, finish_tier = ?11,
                acquisition_cost = ?12, renovation_cost = ?13, transaction_cost = ?14,
                lender_profit_pct = ?15, status = ?16, updated_at = ?17
             WHERE id = ?18",
            params![
                property.address,
                property.city,
                property.state,
                property.postal_code,
                property.latitude,
                property.longitude,
                property.area_sqm,
                property.bedrooms,
                property.bathrooms,
                property.year_built,
                property.finish_tier.as_str(),
                property.acquisition_cost,
                property.renovation_cost,
                property.transaction_cost,
                property.lender_profit_pct,
                property.status.as_str(),
                now_timestamp(),
                id,
            ],
        )?;
        if changed == 0 {
            return Err(ValuationError::PropertyNotFound { id });
        }
        Ok(())
    }

    pub fn get_property(&self, id: PropertyId) -> CalcResult<Option<Property>> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM property WHERE id = ?1");
        let property = self
            .conn
            .query_row(&sql, params![id], row_to_property)
            .optional()?;
        Ok(property)
    }

    /// All properties, oldest first.
    pub fn list_properties(&self) -> CalcResult<Vec<Property>> {
        let sql = format!("SELECT {PROPERTY_COLUMNS} FROM property ORDER BY id ASC");
        let mut stmt = self.conn.prepare(&sql)?;
        let properties = stmt
            .query_map([], row_to_property)?
            .collect::<Result<Vec<_>, _>>()?;
        Ok(properties)
    }

    pub fn list_properties_filtered(
        &self,
        filter: &PropertyFilter,
        regions: &RegionMap,
    ) -> CalcResult<Vec<Property>> {
        let properties = self
            .list_properties()?
            .into_iter()
            .filter(|p| filter.matches(p, regions))
            .collect();
        Ok(properties)
    }

    pub fn delete_property(&self, id: PropertyId) -> CalcResult<()> {
        let changed = self
            .conn
            .execute("DELETE FROM property WHERE id = ?1", params![id])?;
        if changed == 0 {
            return Err(ValuationError::PropertyNotFound { id });
        }
        Ok(())
    }

    pub fn property_count(&self) -> CalcResult<i64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM property", [], |row| row.get(0))?;
        Ok(count)
    }
}

fn row_to_property(row: &Row<'_>) -> rusqlite::Result<Property> {
    let tier_code: String = row.get(11)?;
    let finish_tier = FinishTier::parse(&tier_code).ok_or_else(|| bad_code(11, &tier_code))?;
    let status_code: String = row.get(16)?;
    let status = PropertyStatus::parse(&status_code).ok_or_else(|| bad_code(16, &status_code))?;

    Ok(Property {
        id:                Some(row.get(0)?),
        address:           row.get(1)?,
        city:              row.get(2)?,
        state:             row.get(3)?,
        postal_code:       row.get(4)?,
        latitude:          row.get(5)?,
        longitude:         row.get(6)?,
        area_sqm:          row.get(7)?,
        bedrooms:          row.get(8)?,
        bathrooms:         row.get(9)?,
        year_built:        row.get(10)?,
        finish_tier,
        acquisition_cost:  row.get(12)?,
        renovation_cost:   row.get(13)?,
        transaction_cost:  row.get(14)?,
        lender_profit_pct: row.get(15)?,
        status,
        created_at:        Some(row.get(17)?),
        updated_at:        Some(row.get(18)?),
    })
}

fn bad_code(column: usize, code: &str) -> rusqlite::Error {
    rusqlite::Error::FromSqlConversionFailure(
        column,
        rusqlite::types::Type::Text,
        format!("unknown code '{code}'").into(),
    )
}
