//! Shared primitive types used across the valuation desk.

use serde::{Deserialize, Serialize};

/// Row id of a property in the store.
pub type PropertyId = i64;

/// Finish-quality tier of a property. Scales the estimated price.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum FinishTier {
    Low,
    #[default]
    Medium,
    High,
}

impl FinishTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            FinishTier::Low    => "low",
            FinishTier::Medium => "medium",
            FinishTier::High   => "high",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "low"    => Some(FinishTier::Low),
            "medium" => Some(FinishTier::Medium),
            "high"   => Some(FinishTier::High),
            _        => None,
        }
    }
}

/// Where a property sits in the acquisition pipeline.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, Default)]
#[serde(rename_all = "snake_case")]
pub enum PropertyStatus {
    #[default]
    UnderAnalysis,
    Purchased,
    Sold,
}

impl PropertyStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            PropertyStatus::UnderAnalysis => "under_analysis",
            PropertyStatus::Purchased     => "purchased",
            PropertyStatus::Sold          => "sold",
        }
    }

    pub fn parse(code: &str) -> Option<Self> {
        match code {
            "under_analysis" => Some(PropertyStatus::UnderAnalysis),
            "purchased"      => Some(PropertyStatus::Purchased),
            "sold"           => Some(PropertyStatus::Sold),
            _                => None,
        }
    }
}

/// Round to two decimal places, the precision every money and
/// percentage figure is reported at.
pub fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}
