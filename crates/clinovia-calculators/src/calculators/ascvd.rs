use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::{AscvdCategory, AscvdOutput, ClinicalOutput};

use super::pce::{PceFactors, PceTable};
use crate::schema::FieldSpec;
use crate::{Calculator, RuleCalculator};

pub const SEXES: &[&str] = &["male", "female"];
pub const RACES: &[&str] = &["white", "black", "hispanic", "asian", "other"];

/// ASCVD: 10-year atherosclerotic cardiovascular disease risk from the
/// pooled cohort equations.
#[derive(Debug, Clone, Default)]
pub struct Ascvd {
    table: PceTable,
}

impl Ascvd {
    pub fn new(table: PceTable) -> Self {
        Self { table }
    }

    pub fn table(&self) -> &PceTable {
        &self.table
    }
}

/// Map a risk percentage to its band: <5 low, <7.5 borderline,
/// <20 intermediate, otherwise high.
pub fn categorize(risk_percentage: f64) -> AscvdCategory {
    if risk_percentage < 5.0 {
        AscvdCategory::Low
    } else if risk_percentage < 7.5 {
        AscvdCategory::Borderline
    } else if risk_percentage < 20.0 {
        AscvdCategory::Intermediate
    } else {
        AscvdCategory::High
    }
}

impl Calculator for Ascvd {
    fn id(&self) -> CalculatorId {
        CalculatorId::Ascvd
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: std::sync::LazyLock<Vec<FieldSpec>> = std::sync::LazyLock::new(|| {
            vec![
                FieldSpec::integer("age", 40.0, 79.0).describe("Age in years"),
                FieldSpec::category("sex", SEXES),
                FieldSpec::category("race", RACES),
                FieldSpec::number("total_cholesterol", 130.0, 320.0).describe("mg/dL"),
                FieldSpec::number("hdl_cholesterol", 20.0, 100.0).describe("mg/dL"),
                FieldSpec::number("systolic_bp", 90.0, 200.0).describe("mmHg"),
                FieldSpec::boolean("on_hypertension_treatment"),
                FieldSpec::boolean("smoker"),
                FieldSpec::boolean("diabetes"),
            ]
        });
        &FIELDS
    }
}

impl RuleCalculator for Ascvd {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput {
        let female = input.category("sex") == Some("female");
        let black = input.category("race") == Some("black");
        let factors = PceFactors {
            age: input.number("age").unwrap_or(40.0),
            total_cholesterol: input.number("total_cholesterol").unwrap_or(130.0),
            hdl_cholesterol: input.number("hdl_cholesterol").unwrap_or(20.0),
            systolic_bp: input.number("systolic_bp").unwrap_or(90.0),
            on_hypertension_treatment: input.flag_or_false("on_hypertension_treatment"),
            smoker: input.flag_or_false("smoker"),
            diabetes: input.flag_or_false("diabetes"),
        };

        let risk = self.table.cohort(female, black).ten_year_risk(&factors);
        let risk_percentage = (risk * 100.0 * 100.0).round() / 100.0;

        ClinicalOutput::Ascvd(AscvdOutput {
            risk_percentage,
            risk_category: categorize(risk_percentage),
        })
    }
}
