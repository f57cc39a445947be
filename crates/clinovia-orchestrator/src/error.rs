use thiserror::Error;

use clinovia_calculators::schema::ValidationError;
use clinovia_core::calculator::{CalculatorId, StrategyKind};
use clinovia_inference::error::InferenceError;

/// Every way a prediction can fail, as seen by the caller.
///
/// Audit failures are deliberately absent: they go to the alert channel.
#[derive(Debug, Error)]
pub enum PredictionError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("inference failed for {calculator}: {source}")]
    Inference {
        calculator: CalculatorId,
        #[source]
        source: InferenceError,
    },

    #[error("unknown calculator: {0}")]
    UnknownCalculator(String),
}

impl PredictionError {
    pub fn calculator(&self) -> Option<CalculatorId> {
        match self {
            PredictionError::Validation(e) => Some(e.calculator),
            PredictionError::Inference { calculator, .. } => Some(*calculator),
            PredictionError::UnknownCalculator(_) => None,
        }
    }
}

#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("calculator {0} has no registered strategy")]
    Missing(CalculatorId),

    #[error("calculator {calculator} is declared {declared:?} but bound to {bound:?}")]
    KindMismatch {
        calculator: CalculatorId,
        declared: StrategyKind,
        bound: StrategyKind,
    },
}
