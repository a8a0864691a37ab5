//! SQLite persistence layer.
//!
//! RULE: Only the store talks to the database.
//! The calculator reads location factors through LocationFactorSource;
//! it never executes SQL directly.

use crate::{config::AppConfig, error::CalcResult, types::PropertyId};
mod location;
mod parameters;
mod property;
use rusqlite::{params, Connection};
use std::path::Path;

/// Tables swapped wholesale by restore_from().
const BACKED_UP_TABLES: [&str; 3] = ["property", "location_factor", "global_parameter"];

pub use property::PropertyFilter;

pub struct ValuationStore {
    conn: Connection,
    path: Option<String>, // None for :memory:, Some(path) for file
}

impl ValuationStore {
    pub fn open(path: &str) -> CalcResult<Self> {
        let conn = Connection::open_with_flags(
            path,
            rusqlite::OpenFlags::SQLITE_OPEN_READ_WRITE
                | rusqlite::OpenFlags::SQLITE_OPEN_CREATE
                | rusqlite::OpenFlags::SQLITE_OPEN_URI,
        )?;
        // WAL mode only for real files (shared-memory and :memory: ignore it).
        let _ = conn.execute_batch("PRAGMA journal_mode=WAL;");
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        log::info!("store: opened {path}");
        Ok(Self {
            conn,
            path: Some(path.to_string()),
        })
    }

    /// Open an in-memory database (used in tests).
    pub fn in_memory() -> CalcResult<Self> {
        let conn = Connection::open(":memory:")?;
        conn.execute_batch("PRAGMA foreign_keys=ON;")?;
        Ok(Self { conn, path: None })
    }

    pub fn path(&self) -> Option<&str> {
        self.path.as_deref()
    }

    /// Apply all schema migrations in order. Safe to run repeatedly.
    pub fn migrate(&self) -> CalcResult<()> {
        self.conn
            .execute_batch(include_str!("../../../migrations/001_foundation.sql"))?;
        Ok(())
    }

    /// First-run data: default parameters (existing keys are kept) and the
    /// location table (only when it is empty).
    pub fn seed_defaults(&self, config: &AppConfig) -> CalcResult<()> {
        let now = now_timestamp();
        for (key, value) in config.default_parameters.entries() {
            self.conn.execute(
                "INSERT OR IGNORE INTO global_parameter (key, value, description, updated_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![key, value, parameters::describe(key), now],
            )?;
        }

        if self.location_factor_count()? == 0 {
            for factor in &config.location_factors {
                self.insert_location_factor(factor)?;
            }
            log::info!(
                "store: seeded {} default location factors",
                config.location_factors.len()
            );
        }
        Ok(())
    }

    /// Insert the sample properties from config. Returns their new ids.
    pub fn seed_sample_properties(&self, config: &AppConfig) -> CalcResult<Vec<PropertyId>> {
        let ids = config
            .sample_properties
            .iter()
            .map(|p| self.insert_property(p))
            .collect::<Result<Vec<_>, _>>()?;
        log::info!("store: seeded {} sample properties", ids.len());
        Ok(ids)
    }

    /// Write a consistent copy of the database to `dest`, replacing any
    /// file already there.
    pub fn backup_to(&self, dest: &str) -> CalcResult<()> {
        if Path::new(dest).exists() {
            std::fs::remove_file(dest)
                .map_err(|e| anyhow::anyhow!("Cannot replace backup {dest}: {e}"))?;
        }
        self.conn.execute("VACUUM INTO ?1", params![dest])?;
        log::info!("store: backup written to {dest}");
        Ok(())
    }

    /// Replace every row of this database with the contents of a backup
    /// written by backup_to(). All tables are swapped in one transaction.
    pub fn restore_from(&self, src: &str) -> CalcResult<()> {
        if !Path::new(src).is_file() {
            return Err(anyhow::anyhow!("Backup file {src} not found").into());
        }

        self.conn
            .execute("ATTACH DATABASE ?1 AS backup", params![src])?;
        let copied = self.copy_from_attached_backup();
        self.conn.execute_batch("DETACH DATABASE backup")?;
        copied?;

        log::info!("store: restored from {src}");
        Ok(())
    }

    fn copy_from_attached_backup(&self) -> CalcResult<()> {
        let tx = self.conn.unchecked_transaction()?;
        for table in BACKED_UP_TABLES {
            tx.execute(&format!("DELETE FROM main.{table}"), [])?;
            tx.execute(
                &format!("INSERT INTO main.{table} SELECT * FROM backup.{table}"),
                [],
            )?;
        }
        tx.commit()?;
        Ok(())
    }

    // ── Test / summary helpers ────────────────────────────────────────

    /// User tables in the schema, sorted by name.
    pub fn table_names(&self) -> CalcResult<Vec<String>> {
        let mut stmt = self.conn.prepare(
            "SELECT name FROM sqlite_master
             WHERE type = 'table' AND name NOT LIKE 'sqlite_%'
             ORDER BY name",
        )?;
        let names = stmt
            .query_map([], |row| row.get(0))?
            .collect::<Result<Vec<String>, _>>()?;
        Ok(names)
    }
}

pub(crate) fn now_timestamp() -> String {
    chrono::Utc::now().to_rfc3339()
}
