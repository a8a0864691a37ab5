//! valuation-core: property valuation engine for the investment desk.
//!
//! The calculator is pure arithmetic over a property record, a parameter
//! set and a location-factor lookup. Everything that touches SQLite lives
//! under `store`.

pub mod calculator;
pub mod config;
pub mod error;
pub mod format;
pub mod location;
pub mod parameters;
pub mod property;
pub mod region;
pub mod scenario;
pub mod store;
pub mod types;
pub mod viability;
