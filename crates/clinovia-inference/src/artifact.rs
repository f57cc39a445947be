//! Trained classifier parameters and where they come from.
//!
//! Artifacts are read-only JSON documents keyed by `(calculator, version)`:
//!
//! ```text
//! <model_root>/<calculator_id>/<model_version>/model.json
//! ```

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use clinovia_core::calculator::CalculatorId;

use crate::error::InferenceError;

/// One model input column, with the preprocessing applied before scoring.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeatureSpec {
    pub name: String,
    /// Substituted when the input omits this feature.
    pub default: f64,
    /// Category → numeric code, for categorical inputs.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub encoding: Option<BTreeMap<String, f64>>,
    #[serde(default)]
    pub mean: f64,
    #[serde(default = "unit_scale")]
    pub scale: f64,
}

fn unit_scale() -> f64 {
    1.0
}

/// A multinomial logistic (softmax) classifier.
///
/// `coefficients[k][j]` weighs feature `j` for class `labels[k]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModelArtifact {
    pub model_name: String,
    pub model_version: String,
    pub features: Vec<FeatureSpec>,
    pub labels: Vec<String>,
    pub coefficients: Vec<Vec<f64>>,
    pub intercepts: Vec<f64>,
}

impl ModelArtifact {
    pub fn from_json(json: &[u8]) -> Result<Self, InferenceError> {
        let artifact: ModelArtifact = serde_json::from_slice(json)
            .map_err(|e| InferenceError::InvalidArtifact(e.to_string()))?;
        artifact.check_shape()?;
        Ok(artifact)
    }

    /// Reject artifacts whose matrices do not line up with their feature
    /// and label lists.
    pub fn check_shape(&self) -> Result<(), InferenceError> {
        let classes = self.labels.len();
        let features = self.features.len();
        if classes < 2 {
            return Err(InferenceError::InvalidArtifact(format!(
                "{}: needs at least two labels, found {classes}",
                self.model_name
            )));
        }
        if self.coefficients.len() != classes || self.intercepts.len() != classes {
            return Err(InferenceError::InvalidArtifact(format!(
                "{}: {classes} labels but {} coefficient rows and {} intercepts",
                self.model_name,
                self.coefficients.len(),
                self.intercepts.len()
            )));
        }
        if let Some(row) = self.coefficients.iter().find(|r| r.len() != features) {
            return Err(InferenceError::InvalidArtifact(format!(
                "{}: coefficient row has {} entries for {features} features",
                self.model_name,
                row.len()
            )));
        }
        let all_finite = self
            .coefficients
            .iter()
            .flatten()
            .chain(&self.intercepts)
            .chain(self.features.iter().flat_map(|f| [&f.mean, &f.scale, &f.default]))
            .all(|v| v.is_finite());
        if !all_finite {
            return Err(InferenceError::InvalidArtifact(format!(
                "{}: non-finite parameter",
                self.model_name
            )));
        }
        Ok(())
    }
}

/// Read-only source of trained classifier parameters.
#[async_trait]
pub trait ArtifactStore: Send + Sync {
    async fn load(
        &self,
        calculator: CalculatorId,
        version: &str,
    ) -> Result<Arc<ModelArtifact>, InferenceError>;
}

type ArtifactKey = (CalculatorId, String);

/// Artifacts on a local filesystem (or a mounted volume), cached after the
/// first successful read.
#[derive(Debug)]
pub struct LocalArtifactStore {
    root: PathBuf,
    cache: RwLock<HashMap<ArtifactKey, Arc<ModelArtifact>>>,
}

impl LocalArtifactStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            cache: RwLock::new(HashMap::new()),
        }
    }

    pub fn artifact_path(&self, calculator: CalculatorId, version: &str) -> PathBuf {
        self.root
            .join(calculator.as_str())
            .join(version)
            .join("model.json")
    }

    fn cached(&self, key: &ArtifactKey) -> Option<Arc<ModelArtifact>> {
        self.cache.read().ok()?.get(key).cloned()
    }
}

#[async_trait]
impl ArtifactStore for LocalArtifactStore {
    async fn load(
        &self,
        calculator: CalculatorId,
        version: &str,
    ) -> Result<Arc<ModelArtifact>, InferenceError> {
        let key = (calculator, version.to_string());
        if let Some(artifact) = self.cached(&key) {
            return Ok(artifact);
        }

        let path = self.artifact_path(calculator, version);
        let bytes = match tokio::fs::read(&path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(InferenceError::ArtifactNotFound {
                    calculator,
                    version: version.to_string(),
                });
            }
            Err(e) => {
                return Err(InferenceError::Unavailable(format!(
                    "reading {}: {e}",
                    path.display()
                )));
            }
        };
        let artifact = Arc::new(ModelArtifact::from_json(&bytes)?);
        tracing::info!(
            %calculator,
            version,
            path = %path.display(),
            "loaded model artifact"
        );

        if let Ok(mut cache) = self.cache.write() {
            cache.insert(key, Arc::clone(&artifact));
        }
        Ok(artifact)
    }
}

/// Artifacts held in memory. Used for tests and local runs without a
/// model volume.
#[derive(Debug, Default)]
pub struct MemoryArtifactStore {
    artifacts: RwLock<HashMap<ArtifactKey, Arc<ModelArtifact>>>,
}

impl MemoryArtifactStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(
        &self,
        calculator: CalculatorId,
        version: &str,
        artifact: ModelArtifact,
    ) -> Result<(), InferenceError> {
        artifact.check_shape()?;
        let mut artifacts = self
            .artifacts
            .write()
            .map_err(|_| InferenceError::Unavailable("artifact store lock poisoned".into()))?;
        artifacts.insert((calculator, version.to_string()), Arc::new(artifact));
        Ok(())
    }
}

#[async_trait]
impl ArtifactStore for MemoryArtifactStore {
    async fn load(
        &self,
        calculator: CalculatorId,
        version: &str,
    ) -> Result<Arc<ModelArtifact>, InferenceError> {
        let artifacts = self
            .artifacts
            .read()
            .map_err(|_| InferenceError::Unavailable("artifact store lock poisoned".into()))?;
        artifacts
            .get(&(calculator, version.to_string()))
            .cloned()
            .ok_or_else(|| InferenceError::ArtifactNotFound {
                calculator,
                version: version.to_string(),
            })
    }
}
