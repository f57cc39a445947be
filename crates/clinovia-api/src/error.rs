use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;

use clinovia_calculators::schema::{FieldViolation, ValidationError};
use clinovia_core::calculator::CalculatorId;
use clinovia_inference::error::InferenceError;
use clinovia_orchestrator::error::PredictionError;

/// Unified API error type for all route handlers.
#[derive(Debug)]
pub enum ApiError {
    NotFound(String),
    BadRequest(String),
    Unauthorized(String),
    Validation(ValidationError),
    Inference {
        calculator: CalculatorId,
        source: InferenceError,
    },
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    calculator: Option<CalculatorId>,
    #[serde(skip_serializing_if = "Option::is_none")]
    violations: Option<Vec<FieldViolation>>,
}

impl ErrorBody {
    fn message(error: String) -> Self {
        Self {
            error,
            calculator: None,
            violations: None,
        }
    }
}

impl ApiError {
    pub fn status(&self) -> StatusCode {
        match self {
            ApiError::NotFound(_) => StatusCode::NOT_FOUND,
            ApiError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ApiError::Unauthorized(_) => StatusCode::UNAUTHORIZED,
            ApiError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            ApiError::Inference { source, .. } => match source {
                InferenceError::UnsupportedArtifact(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
                e if e.is_transient() => StatusCode::SERVICE_UNAVAILABLE,
                _ => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();
        let body = match self {
            ApiError::NotFound(msg) | ApiError::BadRequest(msg) | ApiError::Unauthorized(msg) => {
                ErrorBody::message(msg)
            }
            ApiError::Validation(e) => ErrorBody {
                error: e.to_string(),
                calculator: Some(e.calculator),
                violations: Some(e.violations),
            },
            ApiError::Inference { calculator, source } => ErrorBody {
                error: source.to_string(),
                calculator: Some(calculator),
                violations: None,
            },
        };

        (status, Json(body)).into_response()
    }
}

impl From<PredictionError> for ApiError {
    fn from(e: PredictionError) -> Self {
        match e {
            PredictionError::Validation(e) => ApiError::Validation(e),
            PredictionError::Inference { calculator, source } => {
                ApiError::Inference { calculator, source }
            }
            PredictionError::UnknownCalculator(id) => {
                ApiError::NotFound(format!("calculator not found: {id}"))
            }
        }
    }
}

impl From<serde_json::Error> for ApiError {
    fn from(e: serde_json::Error) -> Self {
        ApiError::BadRequest(format!("malformed JSON body: {e}"))
    }
}
