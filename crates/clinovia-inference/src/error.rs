use std::time::Duration;

use thiserror::Error;

use clinovia_core::calculator::CalculatorId;

#[derive(Debug, Error)]
pub enum InferenceError {
    #[error("inference service unavailable: {0}")]
    Unavailable(String),

    #[error("inference timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    #[error("model returned malformed output: {0}")]
    MalformedOutput(String),

    #[error("unsupported artifact: {0}")]
    UnsupportedArtifact(String),

    #[error("no model artifact for {calculator} version {version}")]
    ArtifactNotFound {
        calculator: CalculatorId,
        version: String,
    },

    #[error("invalid model artifact: {0}")]
    InvalidArtifact(String),

    #[error("inference service rejected the request: {0}")]
    Rejected(String),
}

impl InferenceError {
    /// Whether another attempt could succeed. Only timeouts and an
    /// unreachable or starting service qualify.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            InferenceError::Unavailable(_) | InferenceError::Timeout(_)
        )
    }
}
