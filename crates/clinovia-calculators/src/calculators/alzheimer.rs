//! Input tables for the model-scored Alzheimer's calculators.
//!
//! Field names follow the ADNI column names the classifiers were trained on.
//! Scoring lives in `clinovia-inference`.

use std::sync::LazyLock;

use clinovia_core::calculator::CalculatorId;

use super::ascvd::SEXES;
use crate::Calculator;
use crate::schema::FieldSpec;

pub struct DiagnosisBasic;
pub struct DiagnosisExtended;
pub struct DiagnosisScreening;
pub struct Prognosis2yr;
pub struct Prognosis2yrExtended;

fn diagnosis_core(apoe4_min: f64) -> Vec<FieldSpec> {
    vec![
        FieldSpec::number("AGE", 1.0, 120.0).describe("Age in years"),
        FieldSpec::number("MMSE_bl", 0.0, 30.0).describe("Mini-Mental State Examination"),
        FieldSpec::number("CDRSB_bl", 0.0, 18.0).describe("CDR Sum of Boxes"),
        FieldSpec::number("FAQ_bl", 0.0, 30.0).describe("Functional Activities Questionnaire"),
        FieldSpec::number("PTEDUCAT", 0.0, 30.0).describe("Years of education"),
        FieldSpec::category("PTGENDER", SEXES),
        FieldSpec::integer("APOE4", apoe4_min, 2.0).describe("APOE ε4 allele count"),
        FieldSpec::number("RAVLT_immediate_bl", 0.0, 75.0)
            .describe("Rey Auditory Verbal Learning Test, immediate recall"),
        FieldSpec::number("MOCA_bl", 0.0, 30.0).describe("Montreal Cognitive Assessment"),
        FieldSpec::number("ADAS13_bl", 0.0, 85.0).describe("ADAS-Cog 13"),
    ]
}

fn prognosis_core() -> Vec<FieldSpec> {
    vec![
        FieldSpec::number("AGE", 50.0, 100.0),
        FieldSpec::category("PTGENDER", SEXES),
        FieldSpec::number("PTEDUCAT", 0.0, 30.0),
        FieldSpec::number("ADAS13", 0.0, 85.0),
        FieldSpec::number("MOCA", 0.0, 30.0),
        FieldSpec::number("CDRSB", 0.0, 18.0),
        FieldSpec::number("FAQ", 0.0, 30.0),
        FieldSpec::integer("APOE4_count", 0.0, 2.0),
        FieldSpec::number("GDTOTAL", 0.0, 15.0).describe("Geriatric Depression Scale total"),
    ]
}

impl Calculator for DiagnosisBasic {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerDiagnosisBasic
    }

    fn fields(&self) -> &[FieldSpec] {
        // APOE4 = -1 records an unknown genotype.
        static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| diagnosis_core(-1.0));
        &FIELDS
    }
}

impl Calculator for DiagnosisExtended {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerDiagnosisExtended
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
            let mut fields = diagnosis_core(0.0);
            let biomarkers = [
                ("Hippocampus_bl", "Hippocampal volume"),
                ("Ventricles_bl", "Ventricular volume"),
                ("WholeBrain_bl", "Whole brain volume"),
                ("Entorhinal_bl", "Entorhinal cortex volume"),
                ("FDG_bl", "FDG-PET SUVR"),
                ("AV45_bl", "Amyloid PET (AV45)"),
                ("ABETA_bl", "CSF Aβ42"),
                ("TAU_bl", "CSF total tau"),
                ("PTAU_bl", "CSF phosphorylated tau"),
            ];
            fields.extend(
                biomarkers
                    .iter()
                    .map(|(name, desc)| FieldSpec::at_least(name, 0.0).optional().describe(desc)),
            );
            fields
        });
        &FIELDS
    }
}

impl Calculator for DiagnosisScreening {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerDiagnosisScreening
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
            vec![
                FieldSpec::integer("age", 55.0, 95.0),
                FieldSpec::integer("education_years", 0.0, 30.0),
                FieldSpec::number("moca_score", 0.0, 30.0),
                FieldSpec::number("adas13_score", 0.0, 85.0),
                FieldSpec::number("cdr_sum", 0.0, 18.0),
                FieldSpec::integer("faq_total", 0.0, 30.0),
                FieldSpec::category("gender", SEXES),
            ]
        });
        &FIELDS
    }
}

impl Calculator for Prognosis2yr {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerPrognosis2yr
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(prognosis_core);
        &FIELDS
    }
}

impl Calculator for Prognosis2yrExtended {
    fn id(&self) -> CalculatorId {
        CalculatorId::AlzheimerPrognosis2yrExtended
    }

    fn fields(&self) -> &[FieldSpec] {
        // Every field is optional; the classifier fills gaps from its defaults.
        static FIELDS: LazyLock<Vec<FieldSpec>> = LazyLock::new(|| {
            let mut fields: Vec<FieldSpec> =
                prognosis_core().into_iter().map(FieldSpec::optional).collect();
            fields.extend(
                ["ABETA", "TAU", "PTAU"]
                    .iter()
                    .map(|name| FieldSpec::at_least(name, 0.0).optional().describe("CSF biomarker")),
            );
            fields
        });
        &FIELDS
    }
}
