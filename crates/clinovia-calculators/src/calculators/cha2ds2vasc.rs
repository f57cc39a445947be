//! CHA₂DS₂-VASc stroke risk in atrial fibrillation.
//!
//! Each point source is a separate guarded rule in [`RULES`], so the
//! conditional female point is visible and testable on its own.

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::{AppliedRule, Cha2ds2VascOutput, ClinicalOutput, StrokeRisk};

use super::ascvd::SEXES;
use crate::schema::FieldSpec;
use crate::{Calculator, RuleCalculator};

pub struct Cha2ds2Vasc;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Cha2ds2VascFactors {
    pub age: u32,
    pub female: bool,
    pub congestive_heart_failure: bool,
    pub hypertension: bool,
    pub diabetes: bool,
    pub stroke_tia_thromboembolism: bool,
    pub vascular_disease: bool,
}

impl Cha2ds2VascFactors {
    pub fn from_input(input: &ClinicalInput) -> Self {
        Self {
            age: input.number("age").map(|a| a as u32).unwrap_or_default(),
            female: input.category("sex") == Some("female"),
            congestive_heart_failure: input.flag_or_false("congestive_heart_failure"),
            hypertension: input.flag_or_false("hypertension"),
            diabetes: input.flag_or_false("diabetes"),
            stroke_tia_thromboembolism: input.flag_or_false("stroke_tia_thromboembolism"),
            vascular_disease: input.flag_or_false("vascular_disease"),
        }
    }

    /// True when any non-demographic risk factor is present. Age bands do
    /// not count.
    pub fn has_clinical_risk_factor(&self) -> bool {
        self.congestive_heart_failure
            || self.hypertension
            || self.diabetes
            || self.stroke_tia_thromboembolism
            || self.vascular_disease
    }
}

pub struct ScoringRule {
    pub name: &'static str,
    pub points: u8,
    pub applies: fn(&Cha2ds2VascFactors) -> bool,
}

pub const RULES: [ScoringRule; 8] = [
    ScoringRule {
        name: "congestive_heart_failure",
        points: 1,
        applies: |f| f.congestive_heart_failure,
    },
    ScoringRule {
        name: "hypertension",
        points: 1,
        applies: |f| f.hypertension,
    },
    ScoringRule {
        name: "age_75_or_older",
        points: 2,
        applies: |f| f.age >= 75,
    },
    ScoringRule {
        name: "diabetes",
        points: 1,
        applies: |f| f.diabetes,
    },
    ScoringRule {
        name: "stroke_tia_thromboembolism",
        points: 2,
        applies: |f| f.stroke_tia_thromboembolism,
    },
    ScoringRule {
        name: "vascular_disease",
        points: 1,
        applies: |f| f.vascular_disease,
    },
    ScoringRule {
        name: "age_65_to_74",
        points: 1,
        applies: |f| (65..75).contains(&f.age),
    },
    ScoringRule {
        name: "female_with_risk_factor",
        points: 1,
        applies: |f| f.female && f.has_clinical_risk_factor(),
    },
];

/// 0 → low, 1 → moderate, ≥2 → high.
pub fn stroke_risk(score: u8) -> StrokeRisk {
    match score {
        0 => StrokeRisk::Low,
        1 => StrokeRisk::Moderate,
        _ => StrokeRisk::High,
    }
}

pub fn score(factors: &Cha2ds2VascFactors) -> Cha2ds2VascOutput {
    let applied_rules: Vec<AppliedRule> = RULES
        .iter()
        .filter(|rule| (rule.applies)(factors))
        .map(|rule| AppliedRule {
            rule: rule.name.to_string(),
            points: rule.points,
        })
        .collect();
    let score = applied_rules.iter().map(|r| r.points).sum();

    Cha2ds2VascOutput {
        score,
        risk_category: stroke_risk(score),
        applied_rules,
    }
}

impl Calculator for Cha2ds2Vasc {
    fn id(&self) -> CalculatorId {
        CalculatorId::Cha2ds2Vasc
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: std::sync::LazyLock<Vec<FieldSpec>> = std::sync::LazyLock::new(|| {
            vec![
                FieldSpec::integer("age", 18.0, 120.0),
                FieldSpec::category("sex", SEXES),
                FieldSpec::boolean("congestive_heart_failure"),
                FieldSpec::boolean("hypertension"),
                FieldSpec::boolean("diabetes"),
                FieldSpec::boolean("stroke_tia_thromboembolism")
                    .describe("Prior stroke, TIA, or thromboembolism"),
                FieldSpec::boolean("vascular_disease")
                    .describe("Prior MI, peripheral artery disease, or aortic plaque"),
            ]
        });
        &FIELDS
    }
}

impl RuleCalculator for Cha2ds2Vasc {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput {
        ClinicalOutput::Cha2ds2Vasc(score(&Cha2ds2VascFactors::from_input(input)))
    }
}
