use clinovia_inference::classifier::{RawClassification, softmax};
use clinovia_inference::error::InferenceError;
use clinovia_inference::normalize::{self, LabelSet};
use clinovia_core::models::output::{EfSeverity, RiskLevel};
use proptest::prelude::*;

fn raw(labels: &[&str], probabilities: &[f64]) -> RawClassification {
    RawClassification {
        labels: labels.iter().map(|l| l.to_string()).collect(),
        probabilities: probabilities.to_vec(),
        reported_version: None,
        warnings: Vec::new(),
    }
}

#[test]
fn diagnosis_output_has_argmax_and_confidence() {
    let (out, confidence) = normalize::classification(
        &raw(&["CN", "MCI", "AD"], &[0.2, 0.5, 0.3]),
        LabelSet::Diagnosis,
    )
    .unwrap();
    assert_eq!(out.predicted_class, "MCI");
    assert!((confidence - 0.5).abs() < 1e-12);
    assert_eq!(out.probabilities.len(), 3);
    assert!(out.risk_level.is_none());
    assert!(out.summary.is_none());
}

#[test]
fn prognosis_output_derives_risk_level() {
    let (out, _) = normalize::classification(
        &raw(&["Stable", "Progress"], &[0.65, 0.35]),
        LabelSet::Prognosis,
    )
    .unwrap();
    assert_eq!(out.predicted_class, "Stable");
    assert_eq!(out.risk_level, Some(RiskLevel::Moderate));
    assert_eq!(
        out.summary.as_deref(),
        Some(
            "The patient has a moderate (35.0%) probability of progressing to \
             Alzheimer's dementia within 2 years."
        )
    );
}

#[test]
fn progression_summary_names_the_level_and_percentage() {
    assert_eq!(
        normalize::progression_summary(0.125),
        "The patient has a low (12.5%) probability of progressing to \
         Alzheimer's dementia within 2 years."
    );
    assert!(normalize::progression_summary(0.8).starts_with("The patient has a high (80.0%)"));
}

#[test]
fn progression_risk_thresholds() {
    assert_eq!(normalize::progression_risk(0.19), RiskLevel::Low);
    assert_eq!(normalize::progression_risk(0.20), RiskLevel::Moderate);
    assert_eq!(normalize::progression_risk(0.49), RiskLevel::Moderate);
    assert_eq!(normalize::progression_risk(0.50), RiskLevel::High);
}

#[test]
fn slightly_off_distributions_are_renormalized() {
    let (out, _) = normalize::classification(
        &raw(&["CN", "MCI", "AD"], &[0.3, 0.3, 0.3999]),
        LabelSet::Diagnosis,
    )
    .unwrap();
    let total: f64 = out.probabilities.values().sum();
    assert!((total - 1.0).abs() < 1e-9);
}

#[test]
fn wrong_label_set_is_malformed() {
    let err = normalize::classification(
        &raw(&["CN", "MCI", "Dementia"], &[0.2, 0.5, 0.3]),
        LabelSet::Diagnosis,
    )
    .unwrap_err();
    assert!(matches!(err, InferenceError::MalformedOutput(_)));
    assert!(!err.is_transient());
}

#[test]
fn bad_probabilities_are_malformed() {
    let cases: [&[f64]; 4] = [
        &[0.2, 0.5],
        &[0.2, 0.5, f64::NAN],
        &[-0.1, 0.6, 0.5],
        &[0.2, 0.2, 0.2],
    ];
    for probabilities in cases {
        let err = normalize::classification(&raw(&["CN", "MCI", "AD"], probabilities), LabelSet::Diagnosis)
            .unwrap_err();
        assert!(
            matches!(err, InferenceError::MalformedOutput(_)),
            "{probabilities:?} gave {err:?}"
        );
    }
}

#[test]
fn ef_severity_examples() {
    assert_eq!(normalize::ef_severity(55.0), EfSeverity::Normal);
    assert_eq!(normalize::ef_severity(45.0), EfSeverity::Mild);
    assert_eq!(normalize::ef_severity(35.0), EfSeverity::Moderate);
    assert_eq!(normalize::ef_severity(20.0), EfSeverity::Severe);
}

#[test]
fn ef_severity_lower_bounds_are_inclusive() {
    assert_eq!(normalize::ef_severity(50.0), EfSeverity::Normal);
    assert_eq!(normalize::ef_severity(49.99), EfSeverity::Mild);
    assert_eq!(normalize::ef_severity(40.0), EfSeverity::Mild);
    assert_eq!(normalize::ef_severity(39.99), EfSeverity::Moderate);
    assert_eq!(normalize::ef_severity(30.0), EfSeverity::Moderate);
    assert_eq!(normalize::ef_severity(29.99), EfSeverity::Severe);
}

#[test]
fn ejection_fraction_rejects_non_percentages() {
    for value in [-1.0, 100.5, f64::NAN, f64::INFINITY] {
        assert!(matches!(
            normalize::ejection_fraction(value),
            Err(InferenceError::MalformedOutput(_))
        ));
    }
    let out = normalize::ejection_fraction(57.345).unwrap();
    assert_eq!(out.ef_percent, 57.35);
    assert_eq!(out.severity, EfSeverity::Normal);
}

#[test]
fn transient_errors() {
    assert!(InferenceError::Unavailable("down".into()).is_transient());
    assert!(InferenceError::Timeout(std::time::Duration::from_secs(120)).is_transient());
    assert!(!InferenceError::UnsupportedArtifact("gif".into()).is_transient());
    assert!(!InferenceError::Rejected("bad".into()).is_transient());
    assert!(!InferenceError::InvalidArtifact("shape".into()).is_transient());
}

proptest! {
    #[test]
    fn softmax_distribution_sums_to_one_and_argmax_wins(
        logits in prop::collection::vec(-50.0f64..50.0, 3),
    ) {
        let probabilities = softmax(&logits);
        let (out, confidence) = normalize::classification(
            &raw(&["CN", "MCI", "AD"], &probabilities),
            LabelSet::Diagnosis,
        )
        .unwrap();

        let total: f64 = out.probabilities.values().sum();
        prop_assert!((total - 1.0).abs() <= 1e-6);

        let max = out.probabilities.values().copied().fold(f64::NEG_INFINITY, f64::max);
        prop_assert_eq!(out.probabilities[&out.predicted_class], max);
        prop_assert_eq!(confidence, max);
        prop_assert!((0.0..=1.0).contains(&confidence));
    }

    #[test]
    fn ef_severity_is_a_step_function(a in 0.0f64..=100.0, b in 0.0f64..=100.0) {
        let (lo, hi) = if a <= b { (a, b) } else { (b, a) };
        prop_assert!(normalize::ef_severity(lo) <= normalize::ef_severity(hi));
    }
}
