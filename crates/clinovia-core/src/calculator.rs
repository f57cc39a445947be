//! The calculator catalog.
//!
//! Every calculator the engine serves is a variant of [`CalculatorId`], and
//! [`CalculatorId::spec`] is an exhaustive match, so adding a variant without
//! registering its route, strategy kind and provenance does not compile.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum CalculatorId {
    #[serde(rename = "ascvd")]
    Ascvd,
    #[serde(rename = "bp_category")]
    BpCategory,
    #[serde(rename = "cha2ds2vasc")]
    Cha2ds2Vasc,
    #[serde(rename = "ecg_interpreter")]
    EcgInterpreter,
    #[serde(rename = "ef_prediction")]
    EfPrediction,
    #[serde(rename = "alzheimer_diagnosis_basic")]
    AlzheimerDiagnosisBasic,
    #[serde(rename = "alzheimer_diagnosis_extended")]
    AlzheimerDiagnosisExtended,
    #[serde(rename = "alzheimer_diagnosis_screening")]
    AlzheimerDiagnosisScreening,
    #[serde(rename = "alzheimer_prognosis_2yr")]
    AlzheimerPrognosis2yr,
    #[serde(rename = "alzheimer_prognosis_2yr_extended")]
    AlzheimerPrognosis2yrExtended,
    #[serde(rename = "alzheimer_risk_screener")]
    AlzheimerRiskScreener,
}

impl CalculatorId {
    pub const ALL: [CalculatorId; 11] = [
        CalculatorId::Ascvd,
        CalculatorId::BpCategory,
        CalculatorId::Cha2ds2Vasc,
        CalculatorId::EcgInterpreter,
        CalculatorId::EfPrediction,
        CalculatorId::AlzheimerDiagnosisBasic,
        CalculatorId::AlzheimerDiagnosisExtended,
        CalculatorId::AlzheimerDiagnosisScreening,
        CalculatorId::AlzheimerPrognosis2yr,
        CalculatorId::AlzheimerPrognosis2yrExtended,
        CalculatorId::AlzheimerRiskScreener,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            CalculatorId::Ascvd => "ascvd",
            CalculatorId::BpCategory => "bp_category",
            CalculatorId::Cha2ds2Vasc => "cha2ds2vasc",
            CalculatorId::EcgInterpreter => "ecg_interpreter",
            CalculatorId::EfPrediction => "ef_prediction",
            CalculatorId::AlzheimerDiagnosisBasic => "alzheimer_diagnosis_basic",
            CalculatorId::AlzheimerDiagnosisExtended => "alzheimer_diagnosis_extended",
            CalculatorId::AlzheimerDiagnosisScreening => "alzheimer_diagnosis_screening",
            CalculatorId::AlzheimerPrognosis2yr => "alzheimer_prognosis_2yr",
            CalculatorId::AlzheimerPrognosis2yrExtended => "alzheimer_prognosis_2yr_extended",
            CalculatorId::AlzheimerRiskScreener => "alzheimer_risk_screener",
        }
    }

    /// The registered, immutable description of this calculator.
    pub fn spec(self) -> CalculatorSpec {
        use ClinicalDomain::{Alzheimer, Cardiology};
        use StrategyKind::{Model, Rule};

        let (name, domain, route, strategy, model_name, model_version) = match self {
            CalculatorId::Ascvd => (
                "ASCVD 10-Year Risk",
                Cardiology,
                "ascvd",
                Rule,
                "ascvd_pce_rule",
                "2013.1",
            ),
            CalculatorId::BpCategory => (
                "Blood Pressure Category",
                Cardiology,
                "bp-category",
                Rule,
                "bp_category_rule",
                "2017.1",
            ),
            CalculatorId::Cha2ds2Vasc => (
                "CHA₂DS₂-VASc",
                Cardiology,
                "cha2ds2vasc",
                Rule,
                "cha2ds2vasc_rule",
                "2010.1",
            ),
            CalculatorId::EcgInterpreter => (
                "ECG Interpreter",
                Cardiology,
                "ecg-interpreter",
                Rule,
                "ecg_interpreter_rule",
                "1.1.0",
            ),
            CalculatorId::EfPrediction => (
                "Ejection Fraction from Echocardiogram",
                Cardiology,
                "ejection-fraction",
                Model,
                "echonet_3dcnn",
                "1.0.0",
            ),
            CalculatorId::AlzheimerDiagnosisBasic => (
                "Alzheimer's Diagnosis (Basic)",
                Alzheimer,
                "diagnosisBasic",
                Model,
                "alzheimer_diagnosis_basic",
                "1.0.0",
            ),
            CalculatorId::AlzheimerDiagnosisExtended => (
                "Alzheimer's Diagnosis (Extended)",
                Alzheimer,
                "diagnosisExtended",
                Model,
                "alzheimer_diagnosis_extended",
                "1.0.0",
            ),
            CalculatorId::AlzheimerDiagnosisScreening => (
                "Alzheimer's Diagnosis (Screening)",
                Alzheimer,
                "diagnosisScreening",
                Model,
                "alzheimer_diagnosis_screening",
                "1.0.0",
            ),
            CalculatorId::AlzheimerPrognosis2yr => (
                "Alzheimer's 2-Year Prognosis",
                Alzheimer,
                "prognosis2yrBasic",
                Model,
                "alzheimer_prognosis_2yr_basic",
                "1.0.0",
            ),
            CalculatorId::AlzheimerPrognosis2yrExtended => (
                "Alzheimer's 2-Year Prognosis (Extended)",
                Alzheimer,
                "prognosis2yrExtended",
                Model,
                "alzheimer_prognosis_2yr_extended",
                "1.0.0",
            ),
            CalculatorId::AlzheimerRiskScreener => (
                "Alzheimer's Risk Screener",
                Alzheimer,
                "riskScreener",
                Rule,
                "alzheimer_risk_screener_rule",
                "1.0.0",
            ),
        };

        CalculatorSpec {
            id: self,
            name,
            domain,
            route,
            strategy,
            version: CALCULATOR_VERSION,
            provenance: Provenance {
                model_name,
                model_version,
            },
        }
    }
}

/// Version of the calculator contract (schema + output shape). Bumped when
/// any input table or output field changes.
pub const CALCULATOR_VERSION: &str = "1";

impl fmt::Display for CalculatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for CalculatorId {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CalculatorId::ALL
            .into_iter()
            .find(|id| id.as_str() == s)
            .ok_or_else(|| CoreError::UnknownCalculator(s.to_string()))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum ClinicalDomain {
    Cardiology,
    Alzheimer,
}

impl ClinicalDomain {
    pub fn as_str(self) -> &'static str {
        match self {
            ClinicalDomain::Cardiology => "cardiology",
            ClinicalDomain::Alzheimer => "alzheimer",
        }
    }
}

/// Which family of scoring strategy a calculator is bound to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StrategyKind {
    /// Deterministic threshold/lookup logic.
    Rule,
    /// A trained model invoked through the inference adapter.
    Model,
}

/// The `(model_name, model_version)` pair stamped on every result.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Provenance {
    pub model_name: &'static str,
    pub model_version: &'static str,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CalculatorSpec {
    pub id: CalculatorId,
    pub name: &'static str,
    pub domain: ClinicalDomain,
    /// Final path segment of the calculator's HTTP route.
    pub route: &'static str,
    pub strategy: StrategyKind,
    pub version: &'static str,
    pub provenance: Provenance,
}

impl CalculatorSpec {
    /// Route relative to the API prefix, e.g. `/cardiology/ascvd`.
    pub fn route_path(&self) -> String {
        format!("/{}/{}", self.domain.as_str(), self.route)
    }
}

/// Return the full calculator catalog.
pub fn catalog() -> Vec<CalculatorSpec> {
    CalculatorId::ALL.into_iter().map(CalculatorId::spec).collect()
}
