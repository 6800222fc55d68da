use crate::models::InteractionError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, PersonalizationError>;

/// Errors raised at the I/O seams. Scoring itself never fails.
#[derive(Debug, Error)]
pub enum PersonalizationError {
    #[error("Redis error: {0}")]
    Redis(String),

    #[error("Serialization error: {0}")]
    Serialization(String),

    #[error("Catalog error: {0}")]
    Catalog(String),

    #[error("Invalid interaction: {0}")]
    InvalidInteraction(#[from] InteractionError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl From<redis::RedisError> for PersonalizationError {
    fn from(err: redis::RedisError) -> Self {
        PersonalizationError::Redis(err.to_string())
    }
}

impl From<serde_json::Error> for PersonalizationError {
    fn from(err: serde_json::Error) -> Self {
        PersonalizationError::Serialization(err.to_string())
    }
}
