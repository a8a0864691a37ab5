use thiserror::Error;

use crate::types::PropertyId;

#[derive(Error, Debug)]
pub enum ValuationError {
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Invalid property: {}", reasons.join("; "))]
    InvalidProperty { reasons: Vec<String> },

    #[error("Invalid location factor: {}", reasons.join("; "))]
    InvalidLocationFactor { reasons: Vec<String> },

    #[error("Invalid parameters: {}", reasons.join("; "))]
    InvalidParameters { reasons: Vec<String> },

    #[error("Property {id} not found")]
    PropertyNotFound { id: PropertyId },

    #[error("Non-finite value in field '{field}'")]
    NonFiniteInput { field: &'static str },

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type CalcResult<T> = Result<T, ValuationError>;
