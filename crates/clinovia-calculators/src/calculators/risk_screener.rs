use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::{ClinicalOutput, RiskLevel, RiskScreenOutput};

use super::ascvd::SEXES;
use crate::schema::FieldSpec;
use crate::{Calculator, RuleCalculator};

/// Alzheimer's risk screener: additive heuristic over CAIDE/ANU-ADRI style
/// risk factors.
pub struct RiskScreener;

const BASELINE: f64 = 0.03;
const FLOOR: f64 = 0.01;
const CEILING: f64 = 0.90;

pub const LOW_RISK_RECOMMENDATION: &str = "Low risk. Maintain healthy lifestyle (exercise, \
    Mediterranean diet, cognitive engagement). Routine cognitive screening every 1–2 years.";
pub const MODERATE_RISK_RECOMMENDATION: &str = "Moderate risk. Consider neuropsychological \
    evaluation and vascular risk management (hypertension, diabetes, cholesterol). Discuss \
    biomarker testing (e.g., amyloid PET) if indicated.";
pub const HIGH_RISK_RECOMMENDATION: &str = "High risk. Urgent referral to memory disorders \
    clinic or neurologist. Comprehensive evaluation (MRI, CSF biomarkers, cognitive testing) \
    recommended.";

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScreenerFactors {
    pub age: f64,
    pub female: bool,
    pub education_years: f64,
    pub apoe4_status: bool,
    pub memory_score: f64,
    pub hippocampal_volume: Option<f64>,
}

impl ScreenerFactors {
    pub fn from_input(input: &ClinicalInput) -> Self {
        Self {
            age: input.number("age").unwrap_or_default(),
            female: input.category("gender") == Some("female"),
            education_years: input.number("education_years").unwrap_or_default(),
            apoe4_status: input.flag_or_false("apoe4_status"),
            memory_score: input.number("memory_score").unwrap_or_default(),
            hippocampal_volume: input.number("hippocampal_volume"),
        }
    }
}

fn age_points(age: f64) -> f64 {
    if age >= 80.0 {
        0.40
    } else if age >= 75.0 {
        0.30
    } else if age >= 70.0 {
        0.20
    } else if age >= 65.0 {
        0.10
    } else {
        0.0
    }
}

fn education_points(years: f64) -> f64 {
    if years < 8.0 {
        0.15
    } else if years < 12.0 {
        0.08
    } else if years >= 16.0 {
        -0.05
    } else {
        0.0
    }
}

/// MoCA-like scale, 0–30.
fn memory_points(score: f64) -> f64 {
    if score <= 18.0 {
        0.25
    } else if score <= 22.0 {
        0.15
    } else if score <= 25.0 {
        0.05
    } else {
        0.0
    }
}

/// Volume in mm³.
fn hippocampus_points(volume: Option<f64>) -> f64 {
    match volume {
        Some(v) if v < 2500.0 => 0.20,
        Some(v) if v < 2800.0 => 0.10,
        _ => 0.0,
    }
}

/// Risk score in `[0.01, 0.90]`, rounded to 4 decimals.
pub fn risk_score(f: &ScreenerFactors) -> f64 {
    let mut risk = BASELINE + age_points(f.age);
    if f.apoe4_status {
        risk += 0.25;
    }
    if f.female {
        risk += 0.05;
    }
    risk += education_points(f.education_years);
    risk += memory_points(f.memory_score);
    risk += hippocampus_points(f.hippocampal_volume);

    (risk.clamp(FLOOR, CEILING) * 10_000.0).round() / 10_000.0
}

/// <0.3 low, <0.6 moderate, otherwise high.
pub fn risk_level(score: f64) -> RiskLevel {
    if score < 0.3 {
        RiskLevel::Low
    } else if score < 0.6 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

pub fn recommendation(level: RiskLevel) -> &'static str {
    match level {
        RiskLevel::Low => LOW_RISK_RECOMMENDATION,
        RiskLevel::Moderate => MODERATE_RISK_RECOMMENDATION,
        RiskLevel::High => HIGH_RISK_RECOMMENDATION,
    }
}

impl Calculator for RiskScreener {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerRiskScreener
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: std::sync::LazyLock<Vec<FieldSpec>> = std::sync::LazyLock::new(|| {
            vec![
                FieldSpec::integer("age", 40.0, 90.0),
                FieldSpec::category("gender", SEXES),
                FieldSpec::integer("education_years", 0.0, 30.0),
                FieldSpec::boolean("apoe4_status").describe("Carries at least one APOE ε4 allele"),
                FieldSpec::number("memory_score", 0.0, 30.0).describe("MoCA-like score"),
                FieldSpec::number("hippocampal_volume", 2000.0, 5000.0)
                    .optional()
                    .describe("mm³"),
            ]
        });
        &FIELDS
    }
}

impl RuleCalculator for RiskScreener {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput {
        let risk_score = risk_score(&ScreenerFactors::from_input(input));
        let level = risk_level(risk_score);
        ClinicalOutput::RiskScreen(RiskScreenOutput {
            risk_score,
            risk_category: level,
            recommendation: recommendation(level).to_string(),
        })
    }
}
