use thiserror::Error;

use crate::schema::ValidationError;

#[derive(Debug, Error)]
pub enum CalculatorError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("invalid coefficient table: {0}")]
    InvalidCoefficients(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
