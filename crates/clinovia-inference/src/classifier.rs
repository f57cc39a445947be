use std::sync::Arc;

use async_trait::async_trait;

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::{ClinicalInput, FieldValue};

use crate::artifact::{ArtifactStore, FeatureSpec, ModelArtifact};
use crate::error::InferenceError;

/// Un-normalized classifier output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawClassification {
    pub labels: Vec<String>,
    /// One entry per label, in label order.
    pub probabilities: Vec<f64>,
    /// Version string the model reports about itself, if any. Informational
    /// only; results are stamped from the registry.
    pub reported_version: Option<String>,
    pub warnings: Vec<String>,
}

/// A trained classifier that scores a validated input.
#[async_trait]
pub trait Classifier: Send + Sync {
    async fn classify(&self, input: &ClinicalInput) -> Result<RawClassification, InferenceError>;
}

/// Softmax classifier whose parameters come from an [`ArtifactStore`].
pub struct SoftmaxClassifier {
    calculator: CalculatorId,
    version: String,
    store: Arc<dyn ArtifactStore>,
}

impl SoftmaxClassifier {
    pub fn new(calculator: CalculatorId, version: &str, store: Arc<dyn ArtifactStore>) -> Self {
        Self {
            calculator,
            version: version.to_string(),
            store,
        }
    }
}

#[async_trait]
impl Classifier for SoftmaxClassifier {
    async fn classify(&self, input: &ClinicalInput) -> Result<RawClassification, InferenceError> {
        let artifact = self.store.load(self.calculator, &self.version).await?;
        score(&artifact, input)
    }
}

/// Encode, standardize and score one input against an artifact.
pub fn score(
    artifact: &ModelArtifact,
    input: &ClinicalInput,
) -> Result<RawClassification, InferenceError> {
    let mut warnings = Vec::new();
    let mut x = Vec::with_capacity(artifact.features.len());
    for feature in &artifact.features {
        let raw = match input.fields.get(&feature.name) {
            Some(value) => encode(feature, value)?,
            None => {
                warnings.push(format!("used default value for {}", feature.name));
                feature.default
            }
        };
        let scale = if feature.scale == 0.0 { 1.0 } else { feature.scale };
        x.push((raw - feature.mean) / scale);
    }

    let logits: Vec<f64> = artifact
        .coefficients
        .iter()
        .zip(&artifact.intercepts)
        .map(|(row, b)| row.iter().zip(&x).map(|(w, v)| w * v).sum::<f64>() + b)
        .collect();

    Ok(RawClassification {
        labels: artifact.labels.clone(),
        probabilities: softmax(&logits),
        reported_version: Some(artifact.model_version.clone()),
        warnings,
    })
}

fn encode(feature: &FeatureSpec, value: &FieldValue) -> Result<f64, InferenceError> {
    match value {
        FieldValue::Number(n) => Ok(*n),
        FieldValue::Bool(b) => Ok(if *b { 1.0 } else { 0.0 }),
        FieldValue::Category(c) => feature
            .encoding
            .as_ref()
            .and_then(|codes| codes.get(c))
            .copied()
            .ok_or_else(|| {
                InferenceError::InvalidArtifact(format!(
                    "feature {} has no encoding for '{c}'",
                    feature.name
                ))
            }),
    }
}

/// Numerically stable softmax.
pub fn softmax(logits: &[f64]) -> Vec<f64> {
    let max = logits.iter().copied().fold(f64::NEG_INFINITY, f64::max);
    let exps: Vec<f64> = logits.iter().map(|z| (z - max).exp()).collect();
    let total: f64 = exps.iter().sum();
    exps.iter().map(|e| e / total).collect()
}
