use clinovia_core::calculator::CalculatorId;

use crate::Calculator;
use crate::schema::FieldSpec;

/// Ejection fraction from an echocardiogram video. Takes no inline fields;
/// the video artifact is checked by the inference adapter.
pub struct EfPrediction;

impl Calculator for EfPrediction {
    fn id(&self) -> CalculatorId {
        CalculatorId::EfPrediction
    }

    fn fields(&self) -> &[FieldSpec] {
        &[]
    }
}
