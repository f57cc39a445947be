use axum::body::Bytes;
use axum::extract::multipart::{MultipartError, MultipartRejection};
use axum::extract::{Multipart, State};
use axum::http::StatusCode;
use axum::{Extension, Json};

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::identity::Identity;
use clinovia_core::models::result::Prediction;
use clinovia_inference::error::InferenceError;
use clinovia_inference::video::VideoArtifact;
use clinovia_orchestrator::orchestrator::{AuditStatus, Payload, PredictionRequest};

use crate::error::ApiError;
use crate::state::AppState;

pub const VIDEO_FIELD: &str = "video";

/// `POST /api/v1/<domain>/<calculator>` with a JSON object of fields.
pub async fn predict_fields(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    calculator: CalculatorId,
    body: Bytes,
) -> Result<Json<Prediction>, ApiError> {
    let raw: serde_json::Value = serde_json::from_slice(&body)?;
    run(&state, identity, calculator, Payload::Fields(raw)).await
}

/// `POST /api/v1/cardiology/ejection-fraction` with a multipart `video` part.
pub async fn predict_video(
    State(state): State<AppState>,
    Extension(identity): Extension<Identity>,
    calculator: CalculatorId,
    multipart: Result<Multipart, MultipartRejection>,
) -> Result<Json<Prediction>, ApiError> {
    let mut multipart =
        multipart.map_err(|e| ApiError::BadRequest(format!("expected multipart/form-data: {e}")))?;

    let mut video = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| multipart_error(calculator, e, state.max_video_bytes))?
    {
        if field.name() != Some(VIDEO_FIELD) {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let content_type = field.content_type().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| multipart_error(calculator, e, state.max_video_bytes))?;
        video = Some(VideoArtifact::new(file_name, content_type, bytes.to_vec()));
        break;
    }

    let video = video.ok_or_else(|| {
        ApiError::BadRequest(format!("multipart field '{VIDEO_FIELD}' is required"))
    })?;
    run(&state, identity, calculator, Payload::Video(video)).await
}

async fn run(
    state: &AppState,
    identity: Identity,
    calculator: CalculatorId,
    payload: Payload,
) -> Result<Json<Prediction>, ApiError> {
    let outcome = state
        .orchestrator
        .predict(PredictionRequest {
            identity,
            calculator,
            payload,
        })
        .await?;
    // Hold the response until the audit write settles: once it is sent the
    // Lambda environment may be frozen. Audit failure never fails the
    // response; the orchestrator has already alerted.
    let status = outcome
        .audit
        .settle(state.orchestrator.config().audit_wait)
        .await;
    if let AuditStatus::Failed(reason) = status {
        tracing::warn!(
            prediction_id = %outcome.prediction.prediction_id,
            reason = %reason,
            "returning prediction without a confirmed audit record"
        );
    }
    Ok(Json(outcome.prediction))
}

fn multipart_error(calculator: CalculatorId, e: MultipartError, max_bytes: usize) -> ApiError {
    if e.status() == StatusCode::PAYLOAD_TOO_LARGE {
        ApiError::Inference {
            calculator,
            source: InferenceError::UnsupportedArtifact(format!(
                "video exceeds the {max_bytes} byte limit"
            )),
        }
    } else {
        ApiError::BadRequest(format!("malformed multipart body: {e}"))
    }
}
