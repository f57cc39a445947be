//! The router driven in-process with `oneshot`.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use clinovia_api::build_router;
use clinovia_api::middleware::identity::{ORGANIZATION_HEADER, USER_HEADER};
use clinovia_api::state::AppState;
use clinovia_audit::alert::RecordingAlertChannel;
use clinovia_audit::error::AuditError;
use clinovia_audit::memory::MemoryAuditSink;
use clinovia_audit::sink::{Ack, AuditSink};
use clinovia_calculators::calculators::pce::PceTable;
use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::audit::AuditRecord;
use clinovia_core::models::input::ClinicalInput;
use clinovia_inference::artifact::MemoryArtifactStore;
use clinovia_inference::classifier::{Classifier, RawClassification};
use clinovia_inference::ef::{EfEstimator, RawEjectionFraction};
use clinovia_inference::error::InferenceError;
use clinovia_inference::video::VideoArtifact;
use clinovia_orchestrator::orchestrator::{Orchestrator, OrchestratorConfig};
use clinovia_orchestrator::registry::{Backends, StrategyRegistry};
use serde_json::{Value, json};
use tower::ServiceExt;
use uuid::Uuid;

struct FixedEf(f64);

#[async_trait]
impl EfEstimator for FixedEf {
    async fn estimate(&self, _video: &VideoArtifact) -> Result<RawEjectionFraction, InferenceError> {
        Ok(RawEjectionFraction {
            ef_percent: self.0,
            reported_version: None,
        })
    }
}

struct DownClassifier;

#[async_trait]
impl Classifier for DownClassifier {
    async fn classify(&self, _input: &ClinicalInput) -> Result<RawClassification, InferenceError> {
        Err(InferenceError::Unavailable("model server starting".into()))
    }
}

/// Accepts a write and never finishes it.
struct StuckAuditSink;

#[async_trait]
impl AuditSink for StuckAuditSink {
    async fn record(&self, _record: &AuditRecord) -> Result<Ack, AuditError> {
        std::future::pending().await
    }
}

struct Fixture {
    app: Router,
    sink: Arc<MemoryAuditSink>,
    alerts: Arc<RecordingAlertChannel>,
}

fn fixture() -> Fixture {
    let sink = Arc::new(MemoryAuditSink::new());
    fixture_with(sink.clone(), sink, OrchestratorConfig::default().audit_wait)
}

fn fixture_with(
    audit: Arc<dyn AuditSink>,
    sink: Arc<MemoryAuditSink>,
    audit_wait: Duration,
) -> Fixture {
    let backends = Backends {
        pce_table: PceTable::default(),
        artifacts: Arc::new(MemoryArtifactStore::new()),
        ef: Arc::new(FixedEf(35.0)),
    };
    let registry = StrategyRegistry::standard(&backends)
        .with_classifier(CalculatorId::AlzheimerPrognosis2yr, Arc::new(DownClassifier));
    let alerts = Arc::new(RecordingAlertChannel::new());
    let orchestrator = Orchestrator::new(
        registry,
        audit,
        alerts.clone(),
        OrchestratorConfig {
            inference_retries: 0,
            audit_wait,
            ..OrchestratorConfig::default()
        },
    );
    let state = AppState {
        orchestrator: Arc::new(orchestrator),
        ef_client: None,
        max_video_bytes: 64 * 1024,
    };
    Fixture {
        app: build_router(state),
        sink,
        alerts,
    }
}

fn post_json(uri: &str, body: &str) -> Request<Body> {
    Request::post(uri)
        .header("content-type", "application/json")
        .header(USER_HEADER, Uuid::new_v4().to_string())
        .header(ORGANIZATION_HEADER, Uuid::new_v4().to_string())
        .body(Body::from(body.to_string()))
        .unwrap()
}

const BOUNDARY: &str = "clinovia-test-boundary";

fn post_video(uri: &str, file_name: &str, content_type: &str, bytes: &[u8]) -> Request<Body> {
    let mut body = Vec::new();
    body.extend_from_slice(
        format!(
            "--{BOUNDARY}\r\nContent-Disposition: form-data; name=\"video\"; filename=\"{file_name}\"\r\nContent-Type: {content_type}\r\n\r\n"
        )
        .as_bytes(),
    );
    body.extend_from_slice(bytes);
    body.extend_from_slice(format!("\r\n--{BOUNDARY}--\r\n").as_bytes());

    Request::post(uri)
        .header(
            "content-type",
            format!("multipart/form-data; boundary={BOUNDARY}"),
        )
        .header(USER_HEADER, Uuid::new_v4().to_string())
        .header(ORGANIZATION_HEADER, Uuid::new_v4().to_string())
        .body(Body::from(body))
        .unwrap()
}

async fn send(app: &Router, req: Request<Body>) -> (StatusCode, Value) {
    let response = app.clone().oneshot(req).await.unwrap();
    let status = response.status();
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, body)
}

fn get(uri: &str) -> Request<Body> {
    Request::get(uri).body(Body::empty()).unwrap()
}

// ── Public routes ──

#[tokio::test]
async fn health_reports_the_registry() {
    let f = fixture();
    let (status, body) = send(&f.app, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["calculators"], 11);
    assert!(body.get("ef_service").is_none());
}

#[tokio::test]
async fn catalog_lists_every_calculator_with_its_route() {
    let f = fixture();
    let (status, body) = send(&f.app, get("/api/v1/calculators")).await;
    assert_eq!(status, StatusCode::OK);
    let list = body.as_array().unwrap();
    assert_eq!(list.len(), 11);
    let ascvd = list.iter().find(|c| c["id"] == "ascvd").unwrap();
    assert_eq!(ascvd["route"], "/api/v1/cardiology/ascvd");
    assert_eq!(ascvd["strategy"], "rule");
    assert_eq!(ascvd["model_version"], "2013.1");
}

#[tokio::test]
async fn calculator_detail_exposes_the_input_table() {
    let f = fixture();
    let (status, body) = send(&f.app, get("/api/v1/calculators/ascvd")).await;
    assert_eq!(status, StatusCode::OK);
    let age = body["fields"]
        .as_array()
        .unwrap()
        .iter()
        .find(|f| f["name"] == "age")
        .unwrap();
    assert_eq!(age["kind"], "integer");
    assert_eq!(age["range"]["min"], 40.0);
    assert_eq!(age["required"], true);

    let (status, body) = send(&f.app, get("/api/v1/calculators/ef_prediction")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["upload_field"], "video");

    let (status, body) = send(&f.app, get("/api/v1/calculators/framingham")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].as_str().unwrap().contains("framingham"));
}

#[tokio::test]
async fn unknown_routes_are_json_404s() {
    let f = fixture();
    let (status, body) = send(&f.app, post_json("/api/v1/cardiology/framingham", "{}")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert!(body["error"].is_string());
}

// ── Predictions ──

#[tokio::test]
async fn predictions_require_an_identity() {
    let f = fixture();
    let req = Request::post("/api/v1/cardiology/bp-category")
        .header("content-type", "application/json")
        .body(Body::from(r#"{"systolic_bp":120,"diastolic_bp":80}"#))
        .unwrap();
    let (status, body) = send(&f.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(body["error"].as_str().unwrap().contains(USER_HEADER));

    let req = Request::post("/api/v1/cardiology/bp-category")
        .header(USER_HEADER, "not-a-uuid")
        .header(ORGANIZATION_HEADER, Uuid::new_v4().to_string())
        .body(Body::from(r#"{"systolic_bp":120,"diastolic_bp":80}"#))
        .unwrap();
    let (status, _) = send(&f.app, req).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert!(f.sink.is_empty().await);
}

#[tokio::test]
async fn valid_rule_prediction_returns_the_result() {
    let f = fixture();
    let (status, body) = send(
        &f.app,
        post_json(
            "/api/v1/cardiology/bp-category",
            r#"{"systolic_bp":150,"diastolic_bp":95}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["calculator"], "bp_category");
    assert_eq!(body["model_name"], "bp_category_rule");
    assert_eq!(body["model_version"], "2017.1");
    assert_eq!(body["output"]["kind"], "blood_pressure");
    assert_eq!(body["output"]["category"], "hypertension_stage_2");
    assert!(Uuid::parse_str(body["prediction_id"].as_str().unwrap()).is_ok());
    assert!(body["created_at"].is_string());
}

#[tokio::test]
async fn the_audit_record_is_stored_before_the_response_returns() {
    let f = fixture();
    let (status, body) = send(
        &f.app,
        post_json(
            "/api/v1/cardiology/bp-category",
            r#"{"systolic_bp":118,"diastolic_bp":76}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let records = f.sink.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(
        records[0].prediction_id.to_string(),
        body["prediction_id"].as_str().unwrap()
    );
    assert!(f.alerts.failures().is_empty());
}

#[tokio::test]
async fn a_stuck_audit_store_alerts_but_still_returns_the_prediction() {
    let f = fixture_with(
        Arc::new(StuckAuditSink),
        Arc::new(MemoryAuditSink::new()),
        Duration::from_millis(50),
    );
    let (status, body) = send(
        &f.app,
        post_json(
            "/api/v1/cardiology/bp-category",
            r#"{"systolic_bp":150,"diastolic_bp":95}"#,
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"]["category"], "hypertension_stage_2");

    let failures = f.alerts.failures();
    assert_eq!(failures.len(), 1);
    assert_eq!(failures[0].prediction_id, body["prediction_id"].as_str().unwrap());
    assert_eq!(failures[0].calculator, CalculatorId::BpCategory);
}

#[tokio::test]
async fn out_of_range_input_is_a_422_naming_the_field() {
    let f = fixture();
    let body = json!({
        "age": 30, "sex": "male", "race": "white",
        "total_cholesterol": 213, "hdl_cholesterol": 50, "systolic_bp": 120,
        "on_hypertension_treatment": false, "smoker": false, "diabetes": false
    });
    let (status, body) = send(
        &f.app,
        post_json("/api/v1/cardiology/ascvd", &body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["calculator"], "ascvd");
    assert_eq!(body["violations"][0]["field"], "age");
    assert_eq!(body["violations"][0]["constraint"]["type"], "out_of_range");
    assert!(body["error"].as_str().unwrap().contains("age"));
    assert!(f.sink.is_empty().await);
}

#[tokio::test]
async fn malformed_json_is_a_400() {
    let f = fixture();
    let (status, body) = send(
        &f.app,
        post_json("/api/v1/cardiology/bp-category", "{ systolic"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().starts_with("malformed JSON"));
}

#[tokio::test]
async fn unavailable_model_is_a_503() {
    let f = fixture();
    let body = json!({
        "AGE": 70, "PTGENDER": "male", "PTEDUCAT": 12, "ADAS13": 20,
        "MOCA": 21, "CDRSB": 2, "FAQ": 5, "APOE4_count": 1, "GDTOTAL": 2
    });
    let (status, body) = send(
        &f.app,
        post_json("/api/v1/alzheimer/prognosis2yrBasic", &body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["calculator"], "alzheimer_prognosis_2yr");
}

#[tokio::test]
async fn missing_model_artifact_is_a_500_with_a_reason() {
    let f = fixture();
    let body = json!({
        "age": 70, "education_years": 12, "moca_score": 24, "adas13_score": 15,
        "cdr_sum": 1, "faq_total": 2, "gender": "female"
    });
    let (status, body) = send(
        &f.app,
        post_json("/api/v1/alzheimer/diagnosisScreening", &body.to_string()),
    )
    .await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["calculator"], "alzheimer_diagnosis_screening");
    assert!(body["error"].as_str().unwrap().contains("no model artifact"));
}

// ── Ejection fraction ──

#[tokio::test]
async fn video_upload_is_scored() {
    let f = fixture();
    let (status, body) = send(
        &f.app,
        post_video(
            "/api/v1/cardiology/ejection-fraction",
            "a4c.avi",
            "video/x-msvideo",
            &[0u8; 4096],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["output"]["kind"], "ejection_fraction");
    assert_eq!(body["output"]["ef_percent"], 35.0);
    assert_eq!(body["output"]["severity"], "Moderate");
    assert_eq!(body["model_name"], "echonet_3dcnn");
}

#[tokio::test]
async fn non_video_upload_is_a_415() {
    let f = fixture();
    let (status, body) = send(
        &f.app,
        post_video(
            "/api/v1/cardiology/ejection-fraction",
            "scan.gif",
            "image/gif",
            &[0u8; 128],
        ),
    )
    .await;
    assert_eq!(status, StatusCode::UNSUPPORTED_MEDIA_TYPE);
    assert_eq!(body["calculator"], "ef_prediction");
}

#[tokio::test]
async fn json_to_the_video_route_is_a_400() {
    let f = fixture();
    let (status, _) = send(
        &f.app,
        post_json("/api/v1/cardiology/ejection-fraction", "{}"),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
