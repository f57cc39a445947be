use serde::{Deserialize, Serialize};
use ts_rs::TS;
use uuid::Uuid;

use super::output::ClinicalOutput;
use crate::calculator::CalculatorId;

/// The structured, immutable outcome of one calculator run.
///
/// Holds only values derived from the input and the registered calculator,
/// so identical inputs to a rule-based calculator produce identical results.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClinicalResult {
    pub calculator: CalculatorId,
    pub calculator_version: String,
    pub model_name: String,
    pub model_version: String,
    pub output: ClinicalOutput,
    /// In `[0, 1]`; model-based calculators only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub confidence: Option<f64>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub warnings: Vec<String>,
}

/// A returned prediction: the result plus its per-request envelope.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Prediction {
    pub prediction_id: Uuid,
    pub created_at: jiff::Timestamp,
    #[serde(flatten)]
    pub result: ClinicalResult,
}
