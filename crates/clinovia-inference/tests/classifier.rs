use std::collections::BTreeMap;
use std::sync::Arc;

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::{ClinicalInput, FieldValue};
use clinovia_inference::artifact::{
    ArtifactStore, FeatureSpec, LocalArtifactStore, MemoryArtifactStore, ModelArtifact,
};
use clinovia_inference::classifier::{Classifier, SoftmaxClassifier, score};
use clinovia_inference::error::InferenceError;

fn feature(name: &str, default: f64) -> FeatureSpec {
    FeatureSpec {
        name: name.to_string(),
        default,
        encoding: None,
        mean: 0.0,
        scale: 1.0,
    }
}

fn diagnosis_artifact() -> ModelArtifact {
    let mut gender = feature("PTGENDER", 0.0);
    gender.encoding = Some(BTreeMap::from([
        ("male".to_string(), 0.0),
        ("female".to_string(), 1.0),
    ]));
    ModelArtifact {
        model_name: "alzheimer_diagnosis_basic".into(),
        model_version: "1.0.0".into(),
        features: vec![
            FeatureSpec {
                mean: 27.0,
                scale: 3.0,
                ..feature("MMSE_bl", 27.0)
            },
            gender,
            feature("APOE4", 0.0),
        ],
        labels: vec!["CN".into(), "MCI".into(), "AD".into()],
        coefficients: vec![
            vec![1.5, 0.0, -0.5],
            vec![0.0, 0.1, 0.2],
            vec![-1.5, 0.0, 0.8],
        ],
        intercepts: vec![0.0, 0.3, -0.2],
    }
}

fn input(mmse: f64) -> ClinicalInput {
    ClinicalInput::new(CalculatorId::AlzheimerDiagnosisBasic)
        .with("MMSE_bl", FieldValue::Number(mmse))
        .with("PTGENDER", FieldValue::Category("female".into()))
        .with("APOE4", FieldValue::Number(1.0))
}

#[test]
fn low_mmse_leans_towards_ad() {
    let artifact = diagnosis_artifact();
    let healthy = score(&artifact, &input(30.0)).unwrap();
    let impaired = score(&artifact, &input(15.0)).unwrap();
    assert!(impaired.probabilities[2] > healthy.probabilities[2]);
    assert!(healthy.probabilities[0] > healthy.probabilities[2]);
    for raw in [&healthy, &impaired] {
        let total: f64 = raw.probabilities.iter().sum();
        assert!((total - 1.0).abs() < 1e-9);
    }
}

#[test]
fn missing_features_use_defaults_with_a_warning() {
    let raw = score(
        &diagnosis_artifact(),
        &ClinicalInput::new(CalculatorId::AlzheimerDiagnosisBasic)
            .with("MMSE_bl", FieldValue::Number(25.0)),
    )
    .unwrap();
    assert_eq!(
        raw.warnings,
        vec![
            "used default value for PTGENDER".to_string(),
            "used default value for APOE4".to_string(),
        ]
    );
}

#[test]
fn category_without_encoding_is_an_artifact_error() {
    let err = score(
        &diagnosis_artifact(),
        &input(25.0).with("PTGENDER", FieldValue::Category("unknown".into())),
    )
    .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidArtifact(_)));
}

#[test]
fn misshapen_artifacts_are_rejected() {
    let mut artifact = diagnosis_artifact();
    artifact.intercepts.pop();
    assert!(matches!(
        artifact.check_shape(),
        Err(InferenceError::InvalidArtifact(_))
    ));

    let mut artifact = diagnosis_artifact();
    artifact.coefficients[1].push(0.0);
    assert!(artifact.check_shape().is_err());

    let store = MemoryArtifactStore::new();
    assert!(
        store
            .insert(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0", artifact)
            .is_err()
    );
}

#[tokio::test]
async fn memory_store_serves_registered_versions_only() {
    let store = MemoryArtifactStore::new();
    store
        .insert(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0", diagnosis_artifact())
        .unwrap();

    assert!(
        store
            .load(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0")
            .await
            .is_ok()
    );
    let err = store
        .load(CalculatorId::AlzheimerDiagnosisBasic, "2.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::ArtifactNotFound { .. }));
    assert!(!err.is_transient());
}

#[tokio::test]
async fn softmax_classifier_scores_through_its_store() {
    let store = Arc::new(MemoryArtifactStore::new());
    store
        .insert(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0", diagnosis_artifact())
        .unwrap();
    let classifier = SoftmaxClassifier::new(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0", store);

    let raw = classifier.classify(&input(28.0)).await.unwrap();
    assert_eq!(raw.labels, vec!["CN", "MCI", "AD"]);
    assert_eq!(raw.reported_version.as_deref(), Some("1.0.0"));
}

#[tokio::test]
async fn local_store_reads_and_caches_artifacts() {
    let root = std::env::temp_dir().join(format!("clinovia-models-{}", uuid::Uuid::new_v4()));
    let store = LocalArtifactStore::new(&root);
    let path = store.artifact_path(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0");
    assert!(path.ends_with("alzheimer_diagnosis_basic/1.0.0/model.json"));

    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, serde_json::to_vec(&diagnosis_artifact()).unwrap()).unwrap();

    let first = store
        .load(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0")
        .await
        .unwrap();
    assert_eq!(*first, diagnosis_artifact());

    // Served from cache once loaded.
    std::fs::remove_file(&path).unwrap();
    let second = store
        .load(CalculatorId::AlzheimerDiagnosisBasic, "1.0.0")
        .await
        .unwrap();
    assert!(Arc::ptr_eq(&first, &second));

    let missing = store
        .load(CalculatorId::AlzheimerPrognosis2yr, "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(missing, InferenceError::ArtifactNotFound { .. }));

    std::fs::remove_dir_all(&root).unwrap();
}

#[tokio::test]
async fn local_store_rejects_corrupt_json() {
    let root = std::env::temp_dir().join(format!("clinovia-models-{}", uuid::Uuid::new_v4()));
    let store = LocalArtifactStore::new(&root);
    let path = store.artifact_path(CalculatorId::AlzheimerPrognosis2yr, "1.0.0");
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, b"{ not json").unwrap();

    let err = store
        .load(CalculatorId::AlzheimerPrognosis2yr, "1.0.0")
        .await
        .unwrap_err();
    assert!(matches!(err, InferenceError::InvalidArtifact(_)));

    std::fs::remove_dir_all(&root).unwrap();
}
