use thiserror::Error;

#[derive(Debug, Error)]
pub enum CoreError {
    #[error("unknown calculator: {0}")]
    UnknownCalculator(String),

    #[error("invalid digest: {0}")]
    InvalidDigest(String),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}
