//! Calculator-specific primary outputs.
//!
//! Category enums are declared in ascending severity so that the derived
//! `Ord` matches clinical ordering.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use ts_rs::TS;

/// The primary output of a calculator. Shape depends on the calculator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "kind", rename_all = "snake_case")]
#[ts(export)]
pub enum ClinicalOutput {
    Ascvd(AscvdOutput),
    BloodPressure(BloodPressureOutput),
    Cha2ds2Vasc(Cha2ds2VascOutput),
    Ecg(EcgOutput),
    RiskScreen(RiskScreenOutput),
    Classification(ClassificationOutput),
    EjectionFraction(EjectionFractionOutput),
}

// ---------------------------------------------------------------------------
// ASCVD
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum AscvdCategory {
    Low,
    Borderline,
    Intermediate,
    High,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AscvdOutput {
    /// 10-year risk in percent, rounded to two decimals.
    pub risk_percentage: f64,
    pub risk_category: AscvdCategory,
}

// ---------------------------------------------------------------------------
// Blood pressure
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum BpCategory {
    Normal,
    Elevated,
    #[serde(rename = "hypertension_stage_1")]
    HypertensionStage1,
    #[serde(rename = "hypertension_stage_2")]
    HypertensionStage2,
    HypertensiveCrisis,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct BloodPressureOutput {
    pub systolic_bp: f64,
    pub diastolic_bp: f64,
    pub systolic_category: BpCategory,
    pub diastolic_category: BpCategory,
    /// The more severe of the two per-reading categories.
    pub category: BpCategory,
}

// ---------------------------------------------------------------------------
// CHA₂DS₂-VASc
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum StrokeRisk {
    Low,
    Moderate,
    High,
}

/// One scoring rule that fired, with the points it contributed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AppliedRule {
    pub rule: String,
    pub points: u8,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct Cha2ds2VascOutput {
    pub score: u8,
    pub risk_category: StrokeRisk,
    pub applied_rules: Vec<AppliedRule>,
}

// ---------------------------------------------------------------------------
// ECG
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Rhythm {
    Sinus,
    Afib,
    Flutter,
    VentricularTachycardia,
    VentricularFibrillation,
    Other,
}

impl Rhythm {
    pub const ALL: [Rhythm; 6] = [
        Rhythm::Sinus,
        Rhythm::Afib,
        Rhythm::Flutter,
        Rhythm::VentricularTachycardia,
        Rhythm::VentricularFibrillation,
        Rhythm::Other,
    ];

    pub fn as_str(self) -> &'static str {
        match self {
            Rhythm::Sinus => "sinus",
            Rhythm::Afib => "afib",
            Rhythm::Flutter => "flutter",
            Rhythm::VentricularTachycardia => "ventricular_tachycardia",
            Rhythm::VentricularFibrillation => "ventricular_fibrillation",
            Rhythm::Other => "other",
        }
    }

    pub fn parse(s: &str) -> Option<Rhythm> {
        Rhythm::ALL.into_iter().find(|r| r.as_str() == s)
    }

    /// Sustained ventricular rhythms.
    pub fn is_ventricular(self) -> bool {
        matches!(
            self,
            Rhythm::VentricularTachycardia | Rhythm::VentricularFibrillation
        )
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum Urgency {
    Routine,
    Urgent,
    Emergent,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum EcgFinding {
    Normal,
    FirstDegreeAvBlock,
    ShortPrInterval,
    AtrialFibrillation,
    AtrialFlutter,
    VentricularTachycardia,
    VentricularFibrillation,
    SinusTachycardia,
    SinusBradycardia,
    WideQrsComplex,
    StElevation,
    TWaveInversion,
    ProlongedQt,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct GradedFinding {
    pub finding: EcgFinding,
    pub severity: Urgency,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EcgOutput {
    pub rhythm: Rhythm,
    pub heart_rate: f64,
    /// Every triggered finding, in a stable order.
    pub findings: Vec<GradedFinding>,
    /// Maximum severity among `findings`.
    pub urgency: Urgency,
}

// ---------------------------------------------------------------------------
// Risk screener / prognosis
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum RiskLevel {
    Low,
    Moderate,
    High,
}

impl RiskLevel {
    pub fn as_str(self) -> &'static str {
        match self {
            RiskLevel::Low => "low",
            RiskLevel::Moderate => "moderate",
            RiskLevel::High => "high",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct RiskScreenOutput {
    pub risk_score: f64,
    pub risk_category: RiskLevel,
    pub recommendation: String,
}

// ---------------------------------------------------------------------------
// Model outputs
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClassificationOutput {
    pub predicted_class: String,
    /// Full distribution over the model's label set; sums to 1.
    pub probabilities: BTreeMap<String, f64>,
    /// Present for progression models only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub risk_level: Option<RiskLevel>,
    /// Plain-language reading of the progression risk, for the report.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, TS)]
#[ts(export)]
pub enum EfSeverity {
    Severe,
    Moderate,
    Mild,
    Normal,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct EjectionFractionOutput {
    pub ef_percent: f64,
    pub severity: EfSeverity,
}
