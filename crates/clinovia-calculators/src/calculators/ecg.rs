use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::{
    ClinicalOutput, EcgFinding, EcgOutput, GradedFinding, Rhythm, Urgency,
};

use crate::schema::FieldSpec;
use crate::{Calculator, RuleCalculator};

/// Rule-based ECG interpretation. Decision support only.
pub struct EcgInterpreter;

/// Fixed severity of each finding.
pub fn severity(finding: EcgFinding) -> Urgency {
    match finding {
        EcgFinding::Normal
        | EcgFinding::SinusTachycardia
        | EcgFinding::SinusBradycardia
        | EcgFinding::WideQrsComplex => Urgency::Routine,
        EcgFinding::FirstDegreeAvBlock
        | EcgFinding::ShortPrInterval
        | EcgFinding::AtrialFibrillation
        | EcgFinding::AtrialFlutter
        | EcgFinding::TWaveInversion
        | EcgFinding::ProlongedQt => Urgency::Urgent,
        EcgFinding::VentricularTachycardia
        | EcgFinding::VentricularFibrillation
        | EcgFinding::StElevation => Urgency::Emergent,
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EcgReading {
    pub rhythm: Rhythm,
    pub heart_rate: f64,
    pub qrs_duration: f64,
    pub qt_interval: Option<f64>,
    pub pr_interval: Option<f64>,
    pub st_elevation: bool,
    pub t_wave_inversion: bool,
}

impl EcgReading {
    pub fn from_input(input: &ClinicalInput) -> Self {
        Self {
            rhythm: input
                .category("rhythm")
                .and_then(Rhythm::parse)
                .unwrap_or(Rhythm::Other),
            heart_rate: input.number("heart_rate").unwrap_or_default(),
            qrs_duration: input.number("qrs_duration").unwrap_or_default(),
            qt_interval: input.number("qt_interval"),
            pr_interval: input.number("pr_interval"),
            st_elevation: input.flag_or_false("st_elevation"),
            t_wave_inversion: input.flag_or_false("t_wave_inversion"),
        }
    }
}

/// Run every threshold check independently; findings keep check order.
pub fn findings(reading: &EcgReading) -> Vec<EcgFinding> {
    let mut found = Vec::new();
    let sinus = reading.rhythm == Rhythm::Sinus;

    if let Some(pr) = reading.pr_interval {
        if pr > 200.0 {
            found.push(EcgFinding::FirstDegreeAvBlock);
        } else if pr < 120.0 && sinus {
            found.push(EcgFinding::ShortPrInterval);
        }
    }

    match reading.rhythm {
        Rhythm::Afib => found.push(EcgFinding::AtrialFibrillation),
        Rhythm::Flutter => found.push(EcgFinding::AtrialFlutter),
        Rhythm::VentricularTachycardia => found.push(EcgFinding::VentricularTachycardia),
        Rhythm::VentricularFibrillation => found.push(EcgFinding::VentricularFibrillation),
        Rhythm::Sinus => {
            if reading.heart_rate > 100.0 {
                found.push(EcgFinding::SinusTachycardia);
            } else if reading.heart_rate < 60.0 {
                found.push(EcgFinding::SinusBradycardia);
            }
        }
        Rhythm::Other => {}
    }

    if reading.qrs_duration > 120.0 {
        found.push(EcgFinding::WideQrsComplex);
    }
    if reading.st_elevation {
        found.push(EcgFinding::StElevation);
    }
    if reading.t_wave_inversion {
        found.push(EcgFinding::TWaveInversion);
    }
    if reading.qt_interval.is_some_and(|qt| qt > 450.0) {
        found.push(EcgFinding::ProlongedQt);
    }

    if found.is_empty() {
        found.push(EcgFinding::Normal);
    }
    found
}

pub fn interpret(reading: &EcgReading) -> EcgOutput {
    let graded: Vec<GradedFinding> = findings(reading)
        .into_iter()
        .map(|finding| GradedFinding {
            finding,
            severity: severity(finding),
        })
        .collect();
    let urgency = graded
        .iter()
        .map(|g| g.severity)
        .max()
        .unwrap_or(Urgency::Routine);

    EcgOutput {
        rhythm: reading.rhythm,
        heart_rate: reading.heart_rate,
        findings: graded,
        urgency,
    }
}

impl Calculator for EcgInterpreter {
    fn id(&self) -> CalculatorId {
        CalculatorId::EcgInterpreter
    }

    fn fields(&self) -> &[FieldSpec] {
        static FIELDS: std::sync::LazyLock<Vec<FieldSpec>> = std::sync::LazyLock::new(|| {
            let rhythms: Vec<&str> = Rhythm::ALL.iter().map(|r| r.as_str()).collect();
            vec![
                FieldSpec::integer("heart_rate", 20.0, 300.0).describe("bpm"),
                FieldSpec::integer("qrs_duration", 40.0, 200.0).describe("ms"),
                FieldSpec::integer("qt_interval", 200.0, 600.0)
                    .optional()
                    .describe("ms"),
                FieldSpec::integer("pr_interval", 80.0, 400.0)
                    .optional()
                    .describe("ms"),
                FieldSpec::category("rhythm", &rhythms),
                FieldSpec::boolean("st_elevation").optional(),
                FieldSpec::boolean("t_wave_inversion").optional(),
            ]
        });
        &FIELDS
    }
}

impl RuleCalculator for EcgInterpreter {
    fn evaluate(&self, input: &ClinicalInput) -> ClinicalOutput {
        ClinicalOutput::Ecg(interpret(&EcgReading::from_input(input)))
    }
}
