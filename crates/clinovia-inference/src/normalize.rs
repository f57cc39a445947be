//! Turn raw model output into result fields.
//!
//! Everything here is pure: malformed output becomes
//! [`InferenceError::MalformedOutput`], never a panic or a silently
//! repaired value.

use std::collections::BTreeMap;

use clinovia_core::models::output::{
    ClassificationOutput, EfSeverity, EjectionFractionOutput, RiskLevel,
};

use crate::classifier::RawClassification;
use crate::error::InferenceError;

/// Maximum deviation from 1.0 accepted before renormalizing.
pub const SUM_TOLERANCE: f64 = 1e-3;

/// Class labels of the diagnosis classifiers.
pub const DIAGNOSIS_LABELS: [&str; 3] = ["CN", "MCI", "AD"];
/// Class labels of the 2-year progression classifiers.
pub const PROGNOSIS_LABELS: [&str; 2] = ["Stable", "Progress"];
const PROGRESS: &str = "Progress";

/// Which fixed label set a classifier must produce.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LabelSet {
    Diagnosis,
    Prognosis,
}

impl LabelSet {
    pub fn labels(self) -> &'static [&'static str] {
        match self {
            LabelSet::Diagnosis => &DIAGNOSIS_LABELS,
            LabelSet::Prognosis => &PROGNOSIS_LABELS,
        }
    }
}

/// Check and normalize a class distribution.
///
/// Returns the output plus its confidence (the arg-max probability).
pub fn classification(
    raw: &RawClassification,
    label_set: LabelSet,
) -> Result<(ClassificationOutput, f64), InferenceError> {
    let expected = label_set.labels();
    if raw.labels.len() != raw.probabilities.len() {
        return Err(InferenceError::MalformedOutput(format!(
            "{} labels but {} probabilities",
            raw.labels.len(),
            raw.probabilities.len()
        )));
    }
    let mut seen: Vec<&str> = raw.labels.iter().map(String::as_str).collect();
    seen.sort_unstable();
    let mut wanted = expected.to_vec();
    wanted.sort_unstable();
    if seen != wanted {
        return Err(InferenceError::MalformedOutput(format!(
            "label set {:?} does not match {:?}",
            raw.labels, expected
        )));
    }
    if raw
        .probabilities
        .iter()
        .any(|p| !p.is_finite() || *p < 0.0)
    {
        return Err(InferenceError::MalformedOutput(
            "probabilities must be finite and non-negative".into(),
        ));
    }
    let total: f64 = raw.probabilities.iter().sum();
    if (total - 1.0).abs() > SUM_TOLERANCE {
        return Err(InferenceError::MalformedOutput(format!(
            "probabilities sum to {total}"
        )));
    }

    let probabilities: BTreeMap<String, f64> = raw
        .labels
        .iter()
        .cloned()
        .zip(raw.probabilities.iter().map(|p| p / total))
        .collect();

    // Ties resolve to the earliest label in model order.
    let (predicted_class, confidence) = raw
        .labels
        .iter()
        .zip(raw.probabilities.iter().map(|p| p / total))
        .fold((String::new(), f64::NEG_INFINITY), |best, (label, p)| {
            if p > best.1 { (label.clone(), p) } else { best }
        });

    let progression = match label_set {
        LabelSet::Diagnosis => None,
        LabelSet::Prognosis => probabilities.get(PROGRESS).copied(),
    };

    Ok((
        ClassificationOutput {
            predicted_class,
            probabilities,
            risk_level: progression.map(progression_risk),
            summary: progression.map(progression_summary),
        },
        confidence,
    ))
}

/// Progression probability → risk level: <0.20 low, <0.50 moderate,
/// otherwise high.
pub fn progression_risk(p_progress: f64) -> RiskLevel {
    if p_progress < 0.20 {
        RiskLevel::Low
    } else if p_progress < 0.50 {
        RiskLevel::Moderate
    } else {
        RiskLevel::High
    }
}

/// One-sentence summary of a progression probability, e.g. "The patient
/// has a moderate (35.0%) probability of progressing ...".
pub fn progression_summary(p_progress: f64) -> String {
    format!(
        "The patient has a {} ({:.1}%) probability of progressing to \
         Alzheimer's dementia within 2 years.",
        progression_risk(p_progress).as_str(),
        p_progress * 100.0
    )
}

/// Severity bands with inclusive lower bounds: ≥50 Normal, ≥40 Mild,
/// ≥30 Moderate, otherwise Severe.
pub fn ef_severity(ef_percent: f64) -> EfSeverity {
    if ef_percent >= 50.0 {
        EfSeverity::Normal
    } else if ef_percent >= 40.0 {
        EfSeverity::Mild
    } else if ef_percent >= 30.0 {
        EfSeverity::Moderate
    } else {
        EfSeverity::Severe
    }
}

/// Accept a regression output only if it is a percentage.
pub fn ejection_fraction(ef_percent: f64) -> Result<EjectionFractionOutput, InferenceError> {
    if !ef_percent.is_finite() || !(0.0..=100.0).contains(&ef_percent) {
        return Err(InferenceError::MalformedOutput(format!(
            "ejection fraction {ef_percent} is not a percentage"
        )));
    }
    let ef_percent = (ef_percent * 100.0).round() / 100.0;
    Ok(EjectionFractionOutput {
        ef_percent,
        severity: ef_severity(ef_percent),
    })
}
