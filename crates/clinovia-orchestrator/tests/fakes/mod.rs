//! Test doubles for the orchestrator's collaborators.
#![allow(dead_code)]

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use clinovia_audit::alert::RecordingAlertChannel;
use clinovia_audit::memory::MemoryAuditSink;
use clinovia_audit::error::AuditError;
use clinovia_audit::sink::{Ack, AuditSink};
use clinovia_calculators::calculators::pce::PceTable;
use clinovia_core::models::audit::AuditRecord;
use clinovia_core::models::identity::Identity;
use clinovia_core::models::input::ClinicalInput;
use clinovia_inference::artifact::MemoryArtifactStore;
use clinovia_inference::classifier::{Classifier, RawClassification};
use clinovia_inference::ef::{EfEstimator, RawEjectionFraction};
use clinovia_inference::error::InferenceError;
use clinovia_inference::video::VideoArtifact;
use clinovia_orchestrator::orchestrator::{Orchestrator, OrchestratorConfig};
use clinovia_orchestrator::registry::{Backends, StrategyRegistry};
use uuid::Uuid;

pub fn identity() -> Identity {
    Identity {
        user_id: Uuid::new_v4(),
        organization_id: Uuid::new_v4(),
    }
}

pub fn diagnosis(probabilities: [f64; 3]) -> RawClassification {
    RawClassification {
        labels: vec!["CN".into(), "MCI".into(), "AD".into()],
        probabilities: probabilities.to_vec(),
        reported_version: None,
        warnings: Vec::new(),
    }
}

/// Replays a script of responses, one per call, optionally after a delay.
/// Repeats the last response once the script runs out.
pub struct ScriptedClassifier {
    script: Mutex<VecDeque<Result<RawClassification, InferenceError>>>,
    delay: Duration,
    pub calls: AtomicUsize,
    pub completed: AtomicUsize,
}

impl ScriptedClassifier {
    pub fn new(script: Vec<Result<RawClassification, InferenceError>>) -> Arc<Self> {
        Self::slow(script, Duration::ZERO)
    }

    pub fn slow(
        script: Vec<Result<RawClassification, InferenceError>>,
        delay: Duration,
    ) -> Arc<Self> {
        Arc::new(Self {
            script: Mutex::new(script.into()),
            delay,
            calls: AtomicUsize::new(0),
            completed: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn completed(&self) -> usize {
        self.completed.load(Ordering::SeqCst)
    }

    fn next(&self) -> Result<RawClassification, InferenceError> {
        let mut script = self.script.lock().unwrap();
        if script.len() > 1 {
            script.pop_front().unwrap()
        } else {
            clone_response(script.front().unwrap())
        }
    }
}

fn clone_response(
    r: &Result<RawClassification, InferenceError>,
) -> Result<RawClassification, InferenceError> {
    match r {
        Ok(raw) => Ok(raw.clone()),
        Err(InferenceError::Unavailable(m)) => Err(InferenceError::Unavailable(m.clone())),
        Err(InferenceError::Timeout(d)) => Err(InferenceError::Timeout(*d)),
        Err(InferenceError::MalformedOutput(m)) => Err(InferenceError::MalformedOutput(m.clone())),
        Err(e) => Err(InferenceError::Rejected(e.to_string())),
    }
}

#[async_trait]
impl Classifier for ScriptedClassifier {
    async fn classify(&self, _input: &ClinicalInput) -> Result<RawClassification, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        let response = self.next();
        self.completed.fetch_add(1, Ordering::SeqCst);
        response
    }
}

/// Delays every write before handing it to an in-memory sink.
pub struct SlowAuditSink {
    pub inner: Arc<MemoryAuditSink>,
    pub delay: Duration,
}

impl SlowAuditSink {
    pub fn new(delay: Duration) -> Arc<Self> {
        Arc::new(Self {
            inner: Arc::new(MemoryAuditSink::new()),
            delay,
        })
    }
}

#[async_trait]
impl AuditSink for SlowAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<Ack, AuditError> {
        tokio::time::sleep(self.delay).await;
        self.inner.record(record).await
    }
}

pub struct FixedEf {
    pub ef_percent: f64,
    pub calls: AtomicUsize,
}

impl FixedEf {
    pub fn new(ef_percent: f64) -> Arc<Self> {
        Arc::new(Self {
            ef_percent,
            calls: AtomicUsize::new(0),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl EfEstimator for FixedEf {
    async fn estimate(&self, _video: &VideoArtifact) -> Result<RawEjectionFraction, InferenceError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Ok(RawEjectionFraction {
            ef_percent: self.ef_percent,
            reported_version: Some("1.0.0".into()),
        })
    }
}

pub fn backends(ef: Arc<dyn EfEstimator>) -> (Backends, Arc<MemoryArtifactStore>) {
    let artifacts = Arc::new(MemoryArtifactStore::new());
    let backends = Backends {
        pce_table: PceTable::default(),
        artifacts: artifacts.clone(),
        ef,
    };
    (backends, artifacts)
}

pub struct Harness {
    pub orchestrator: Orchestrator,
    pub sink: Arc<MemoryAuditSink>,
    pub alerts: Arc<RecordingAlertChannel>,
}

pub fn harness(registry: StrategyRegistry, config: OrchestratorConfig) -> Harness {
    let sink = Arc::new(MemoryAuditSink::new());
    harness_with_sink(registry, config, sink.clone(), sink)
}

pub fn harness_with_sink(
    registry: StrategyRegistry,
    config: OrchestratorConfig,
    audit: Arc<dyn AuditSink>,
    sink: Arc<MemoryAuditSink>,
) -> Harness {
    registry.verify().unwrap();
    let alerts = Arc::new(RecordingAlertChannel::new());
    Harness {
        orchestrator: Orchestrator::new(registry, audit, alerts.clone(), config),
        sink,
        alerts,
    }
}

pub fn quick_config() -> OrchestratorConfig {
    OrchestratorConfig {
        inference_timeout: Duration::from_millis(200),
        inference_retries: 1,
        ..OrchestratorConfig::default()
    }
}
