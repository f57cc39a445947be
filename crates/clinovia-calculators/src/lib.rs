//! clinovia-calculators
//!
//! Calculator input tables and the rule engine. Pure: no I/O beyond
//! optionally loading a coefficient table from disk at startup.
//! Every calculator exposes its input table; rule-based calculators also
//! score validated inputs.

pub mod calculators;
pub mod error;
pub mod schema;
pub mod validate;

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::ClinicalOutput;

use schema::{FieldSpec, ValidationError};

/// Trait implemented by each calculator in the catalog.
pub trait Calculator: Send + Sync {
    fn id(&self) -> CalculatorId;

    /// Human-readable name (e.g., "ASCVD 10-Year Risk").
    fn name(&self) -> &'static str {
        self.id().spec().name
    }

    /// The input table: one row per accepted field.
    fn fields(&self) -> &[FieldSpec];

    /// Check a raw JSON body against this calculator's input table.
    fn validate(&self, raw: &serde_json::Value) -> Result<ClinicalInput, ValidationError> {
        validate::validate_fields(self.id(), self.fields(), raw)
    }
}

/// A calculator scored by deterministic threshold/lookup logic.
///
/// `evaluate` is total on any input that passed [`Calculator::validate`].
pub trait RuleCalculator: Calculator {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput;
}

/// Return every calculator's input table, in catalog order.
pub fn all_calculators() -> Vec<Box<dyn Calculator>> {
    CalculatorId::ALL.into_iter().map(get_calculator).collect()
}

/// Look up a calculator's input table by ID.
pub fn get_calculator(id: CalculatorId) -> Box<dyn Calculator> {
    use calculators::*;

    match id {
        CalculatorId::Ascvd => Box::new(ascvd::Ascvd::default()),
        CalculatorId::BpCategory => Box::new(bp_category::BpCategoryRule),
        CalculatorId::Cha2ds2Vasc => Box::new(cha2ds2vasc::Cha2ds2Vasc),
        CalculatorId::EcgInterpreter => Box::new(ecg::EcgInterpreter),
        CalculatorId::EfPrediction => Box::new(ejection_fraction::EfPrediction),
        CalculatorId::AlzheimerDiagnosisBasic => Box::new(alzheimer::DiagnosisBasic),
        CalculatorId::AlzheimerDiagnosisExtended => Box::new(alzheimer::DiagnosisExtended),
        CalculatorId::AlzheimerDiagnosisScreening => Box::new(alzheimer::DiagnosisScreening),
        CalculatorId::AlzheimerPrognosis2yr => Box::new(alzheimer::Prognosis2yr),
        CalculatorId::AlzheimerPrognosis2yrExtended => Box::new(alzheimer::Prognosis2yrExtended),
        CalculatorId::AlzheimerRiskScreener => Box::new(risk_screener::RiskScreener),
    }
}
