use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::{BloodPressureOutput, BpCategory, ClinicalOutput};

use crate::schema::FieldSpec;
use crate::{Calculator, RuleCalculator};

/// Blood pressure category (2017 ACC/AHA bands).
pub struct BpCategoryRule;

pub fn systolic_category(systolic_bp: f64) -> BpCategory {
    if systolic_bp < 120.0 {
        BpCategory::Normal
    } else if systolic_bp < 130.0 {
        BpCategory::Elevated
    } else if systolic_bp < 140.0 {
        BpCategory::HypertensionStage1
    } else if systolic_bp < 180.0 {
        BpCategory::HypertensionStage2
    } else {
        BpCategory::HypertensiveCrisis
    }
}

/// Diastolic readings have no "elevated" band.
pub fn diastolic_category(diastolic_bp: f64) -> BpCategory {
    if diastolic_bp < 80.0 {
        BpCategory::Normal
    } else if diastolic_bp < 90.0 {
        BpCategory::HypertensionStage1
    } else if diastolic_bp < 120.0 {
        BpCategory::HypertensionStage2
    } else {
        BpCategory::HypertensiveCrisis
    }
}

/// Classify a reading pair; disagreement resolves to the more severe band.
pub fn classify(systolic_bp: f64, diastolic_bp: f64) -> BloodPressureOutput {
    let systolic = systolic_category(systolic_bp);
    let diastolic = diastolic_category(diastolic_bp);
    BloodPressureOutput {
        systolic_bp,
        diastolic_bp,
        systolic_category: systolic,
        diastolic_category: diastolic,
        category: systolic.max(diastolic),
    }
}

impl Calculator for BpCategoryRule {
    fn id(&self) -> CalculatorId {
        CalculatorId::BpCategory
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: std::sync::LazyLock<Vec<FieldSpec>> = std::sync::LazyLock::new(|| {
            vec![
                FieldSpec::number("systolic_bp", 70.0, 250.0).describe("mmHg"),
                FieldSpec::number("diastolic_bp", 40.0, 150.0).describe("mmHg"),
            ]
        });
        &FIELDS
    }
}

impl RuleCalculator for BpCategoryRule {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput {
        ClinicalOutput::BloodPressure(classify(
            input.number("systolic_bp").unwrap_or_default(),
            input.number("diastolic_bp").unwrap_or_default(),
        ))
    }
}
