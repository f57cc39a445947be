use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{info, warn};
use uuid::Uuid;

use clinovia_audit::alert::{AlertChannel, AuditWriteFailure};
use clinovia_audit::events::AuditEvent;
use clinovia_audit::sink::{Ack, AuditSink};
use clinovia_calculators::schema::{Constraint, FieldViolation, ValidationError};
use clinovia_core::calculator::CalculatorId;
use clinovia_core::clock::MonotonicClock;
use clinovia_core::digest::InputDigest;
use clinovia_core::models::audit::AuditRecord;
use clinovia_core::models::identity::Identity;
use clinovia_core::models::input::ClinicalInput;
use clinovia_core::models::output::ClinicalOutput;
use clinovia_core::models::result::{ClinicalResult, Prediction};
use clinovia_inference::error::InferenceError;
use clinovia_inference::normalize;
use clinovia_inference::video::{DEFAULT_MAX_VIDEO_BYTES, VideoArtifact};

use crate::error::PredictionError;
use crate::registry::{Registration, Strategy, StrategyRegistry};
use crate::state::{Lifecycle, RequestState};

#[derive(Debug, Clone)]
pub struct OrchestratorConfig {
    /// Per-attempt limit on a model call.
    pub inference_timeout: Duration,
    /// Extra attempts after a transient inference failure.
    pub inference_retries: u32,
    pub max_video_bytes: usize,
    /// How long a caller waits on the audit write before alerting and
    /// returning the prediction anyway.
    pub audit_wait: Duration,
}

impl Default for OrchestratorConfig {
    fn default() -> Self {
        Self {
            inference_timeout: Duration::from_secs(120),
            inference_retries: 1,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
            audit_wait: Duration::from_secs(10),
        }
    }
}

/// What the caller submitted.
#[derive(Debug, Clone)]
pub enum Payload {
    /// A JSON object of calculator fields.
    Fields(serde_json::Value),
    /// An uploaded video, for the ejection-fraction calculator.
    Video(VideoArtifact),
}

#[derive(Debug, Clone)]
pub struct PredictionRequest {
    pub identity: Identity,
    pub calculator: CalculatorId,
    pub payload: Payload,
}

/// Result of the background audit write.
#[derive(Debug, Clone, PartialEq)]
pub enum AuditStatus {
    Recorded(Ack),
    Failed(String),
}

/// The pending audit write for a returned prediction. Dropping it does not
/// cancel the write. A write that is torn down before it finishes, for
/// example by runtime shutdown, raises an alert on its own.
pub struct AuditHandle {
    task: JoinHandle<AuditStatus>,
    pending: AuditWriteFailure,
    alerts: Arc<dyn AlertChannel>,
}

impl AuditHandle {
    pub async fn wait(self) -> AuditStatus {
        match self.task.await {
            Ok(status) => status,
            Err(e) => AuditStatus::Failed(format!("audit task aborted: {e}")),
        }
    }

    /// Wait at most `limit` for the write. On timeout an alert is raised and
    /// the write keeps running.
    pub async fn settle(self, limit: Duration) -> AuditStatus {
        let Self {
            task,
            mut pending,
            alerts,
        } = self;
        match tokio::time::timeout(limit, task).await {
            Ok(Ok(status)) => status,
            Ok(Err(e)) => AuditStatus::Failed(format!("audit task aborted: {e}")),
            Err(_elapsed) => {
                pending.reason = format!("audit write still pending after {limit:?}");
                alerts.audit_write_failed(&pending);
                AuditStatus::Failed(pending.reason)
            }
        }
    }
}

/// Alerts when dropped while armed, so a write cut short by cancellation or
/// shutdown is never silent.
struct AbandonGuard {
    failure: Option<AuditWriteFailure>,
    alerts: Arc<dyn AlertChannel>,
}

impl AbandonGuard {
    fn disarm(&mut self) {
        self.failure = None;
    }
}

impl Drop for AbandonGuard {
    fn drop(&mut self) {
        if let Some(failure) = self.failure.take() {
            self.alerts.audit_write_failed(&failure);
        }
    }
}

pub struct PredictionOutcome {
    pub prediction: Prediction,
    /// State at the time the prediction was returned.
    pub state: RequestState,
    pub audit: AuditHandle,
}

/// Runs prediction requests against a verified [`StrategyRegistry`].
///
/// Holds no per-request state; one instance serves concurrent requests.
pub struct Orchestrator {
    registry: Arc<StrategyRegistry>,
    audit: Arc<dyn AuditSink>,
    alerts: Arc<dyn AlertChannel>,
    clock: Arc<MonotonicClock>,
    config: OrchestratorConfig,
}

impl Orchestrator {
    pub fn new(
        registry: StrategyRegistry,
        audit: Arc<dyn AuditSink>,
        alerts: Arc<dyn AlertChannel>,
        config: OrchestratorConfig,
    ) -> Self {
        Self {
            registry: Arc::new(registry),
            audit,
            alerts,
            clock: Arc::new(MonotonicClock::new()),
            config,
        }
    }

    pub fn registry(&self) -> &StrategyRegistry {
        &self.registry
    }

    pub fn config(&self) -> &OrchestratorConfig {
        &self.config
    }

    /// Resolve a calculator by its catalog id string.
    pub fn resolve(&self, id: &str) -> Result<&Registration, PredictionError> {
        id.parse::<CalculatorId>()
            .ok()
            .and_then(|id| self.registry.get(id))
            .ok_or_else(|| PredictionError::UnknownCalculator(id.to_string()))
    }

    /// Validate, score, stamp and return one prediction.
    ///
    /// The audit write runs on its own task; the returned handle reports
    /// its outcome and should be settled before the response leaves the
    /// process. If this future is dropped before it resolves, any model call
    /// in flight runs to completion but nothing is audited.
    pub async fn predict(
        &self,
        request: PredictionRequest,
    ) -> Result<PredictionOutcome, PredictionError> {
        let calculator = request.calculator;
        let registration = self
            .registry
            .get(calculator)
            .ok_or_else(|| PredictionError::UnknownCalculator(calculator.to_string()))?;
        let mut lifecycle = Lifecycle::new(calculator);

        // 1. Validate
        let validated = match self.validate(registration, request.payload) {
            Ok(validated) => validated,
            Err(e) => {
                lifecycle.advance(RequestState::Rejected);
                info!(
                    calculator = %calculator,
                    fields = ?e.fields(),
                    "prediction rejected"
                );
                return Err(e.into());
            }
        };
        lifecycle.advance(RequestState::Validated);

        // 2. Score
        lifecycle.advance(RequestState::Scoring);
        let scored = match self.score(registration, &validated).await {
            Ok(scored) => scored,
            Err(source) => {
                lifecycle.advance(RequestState::Failed);
                warn!(
                    calculator = %calculator,
                    error = %source,
                    transient = source.is_transient(),
                    "prediction failed"
                );
                return Err(PredictionError::Inference { calculator, source });
            }
        };

        // 3. Stamp provenance from the registration
        let spec = registration.spec();
        let mismatch = scored
            .reported_version
            .as_deref()
            .filter(|reported| *reported != spec.provenance.model_version);
        if let Some(reported) = mismatch {
            warn!(
                calculator = %calculator,
                reported,
                registered = spec.provenance.model_version,
                "strategy reported a model version that differs from its registration"
            );
        }
        let result = ClinicalResult {
            calculator,
            calculator_version: spec.version.to_string(),
            model_name: spec.provenance.model_name.to_string(),
            model_version: spec.provenance.model_version.to_string(),
            output: scored.output,
            confidence: scored.confidence,
            warnings: scored.warnings,
        };
        let prediction = Prediction {
            prediction_id: Uuid::new_v4(),
            created_at: self.clock.now(),
            result,
        };
        lifecycle.advance(RequestState::Scored);
        info!(
            calculator = %calculator,
            prediction_id = %prediction.prediction_id,
            input_digest = %validated.digest.short(),
            "prediction scored"
        );

        // 4. Audit in the background
        let record = AuditRecord::new(
            request.identity,
            prediction.prediction_id,
            validated.digest,
            prediction.result.clone(),
            prediction.created_at,
        );
        let audit = self.spawn_audit(record, lifecycle.clone());

        Ok(PredictionOutcome {
            prediction,
            state: lifecycle.state(),
            audit,
        })
    }

    fn validate(
        &self,
        registration: &Registration,
        payload: Payload,
    ) -> Result<Validated, ValidationError> {
        let calculator = registration.calculator.id();
        match (&registration.strategy, payload) {
            (Strategy::EjectionFraction(_), Payload::Video(video)) => {
                let digest = InputDigest::from_bytes(&video.bytes);
                Ok(Validated {
                    input: ClinicalInput::new(calculator),
                    video: Some(Arc::new(video)),
                    digest,
                })
            }
            (Strategy::EjectionFraction(_), Payload::Fields(_)) => Err(single_violation(
                calculator,
                "video",
                Constraint::Required,
            )),
            (_, Payload::Video(_)) => Err(single_violation(
                calculator,
                "body",
                Constraint::NotAnObject,
            )),
            (_, Payload::Fields(raw)) => {
                let input = registration.calculator.validate(&raw)?;
                let digest = input.digest();
                Ok(Validated {
                    input,
                    video: None,
                    digest,
                })
            }
        }
    }

    async fn score(
        &self,
        registration: &Registration,
        validated: &Validated,
    ) -> Result<Scored, InferenceError> {
        match &registration.strategy {
            Strategy::Rule(rule) => Ok(Scored {
                output: rule.evaluate(&validated.input),
                confidence: None,
                warnings: Vec::new(),
                reported_version: None,
            }),
            Strategy::Classifier { classifier, labels } => {
                let input = Arc::new(validated.input.clone());
                let classifier = classifier.clone();
                let raw = self
                    .with_retry(registration.calculator.id(), || {
                        let classifier = classifier.clone();
                        let input = input.clone();
                        async move { classifier.classify(&input).await }
                    })
                    .await?;
                let (output, confidence) = normalize::classification(&raw, *labels)?;
                Ok(Scored {
                    output: ClinicalOutput::Classification(output),
                    confidence: Some(confidence),
                    warnings: raw.warnings,
                    reported_version: raw.reported_version,
                })
            }
            Strategy::EjectionFraction(estimator) => {
                let video = validated.video.clone().ok_or_else(|| {
                    InferenceError::UnsupportedArtifact("no video uploaded".into())
                })?;
                video.check(self.config.max_video_bytes)?;
                let estimator = estimator.clone();
                let raw = self
                    .with_retry(registration.calculator.id(), || {
                        let estimator = estimator.clone();
                        let video = video.clone();
                        async move { estimator.estimate(&video).await }
                    })
                    .await?;
                let output = normalize::ejection_fraction(raw.ef_percent)?;
                Ok(Scored {
                    output: ClinicalOutput::EjectionFraction(output),
                    confidence: None,
                    warnings: Vec::new(),
                    reported_version: raw.reported_version,
                })
            }
        }
    }

    /// Run a model call on its own task under the configured timeout,
    /// retrying transient failures.
    ///
    /// The call is spawned so that a caller going away does not cancel
    /// work already handed to the model; its result is simply dropped.
    async fn with_retry<T, F, Fut>(
        &self,
        calculator: CalculatorId,
        call: F,
    ) -> Result<T, InferenceError>
    where
        T: Send + 'static,
        F: Fn() -> Fut,
        Fut: Future<Output = Result<T, InferenceError>> + Send + 'static,
    {
        let timeout = self.config.inference_timeout;
        let mut attempt = 0;
        loop {
            let task = tokio::spawn(tokio::time::timeout(timeout, call()));
            let result = match task.await {
                Ok(Ok(result)) => result,
                Ok(Err(_elapsed)) => Err(InferenceError::Timeout(timeout)),
                Err(e) => Err(InferenceError::Unavailable(format!(
                    "inference task failed: {e}"
                ))),
            };
            match result {
                Err(e) if e.is_transient() && attempt < self.config.inference_retries => {
                    attempt += 1;
                    warn!(
                        calculator = %calculator,
                        attempt,
                        error = %e,
                        "retrying transient inference failure"
                    );
                }
                other => return other,
            }
        }
    }

    fn spawn_audit(&self, record: AuditRecord, mut lifecycle: Lifecycle) -> AuditHandle {
        let sink = self.audit.clone();
        let alerts = self.alerts.clone();
        let pending = AuditWriteFailure::with_reason(&record, "audit write did not complete");
        let mut guard = AbandonGuard {
            failure: Some(AuditWriteFailure::with_reason(
                &record,
                "audit write abandoned before completion",
            )),
            alerts: alerts.clone(),
        };
        let task = tokio::spawn(async move {
            let written = sink.record(&record).await;
            guard.disarm();
            match written {
                Ok(ack) => {
                    lifecycle.advance(RequestState::Audited);
                    AuditEvent::for_ack(&record, ack).emit();
                    AuditStatus::Recorded(ack)
                }
                Err(e) => {
                    alerts.audit_write_failed(&AuditWriteFailure::new(&record, &e));
                    AuditStatus::Failed(e.to_string())
                }
            }
        });
        AuditHandle {
            task,
            pending,
            alerts: self.alerts.clone(),
        }
    }
}

struct Validated {
    input: ClinicalInput,
    video: Option<Arc<VideoArtifact>>,
    digest: InputDigest,
}

struct Scored {
    output: ClinicalOutput,
    confidence: Option<f64>,
    warnings: Vec<String>,
    reported_version: Option<String>,
}

fn single_violation(
    calculator: CalculatorId,
    field: &str,
    constraint: Constraint,
) -> ValidationError {
    ValidationError {
        calculator,
        violations: vec![FieldViolation {
            field: field.to_string(),
            constraint,
        }],
    }
}
