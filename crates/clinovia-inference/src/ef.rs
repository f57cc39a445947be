//! Ejection fraction from echocardiogram video.
//!
//! The 3D-CNN regressor runs in a separate inference service. This module
//! owns the client side of that contract:
//!
//! ```text
//! POST <base_url>/predict-ef     multipart field "video"
//!   200 { "ef_value": 57.3, "model_version": "1.0.0", ... }
//!   400 / 413                    unreadable or oversized video
//!   503                          service starting, retry later
//! GET  <base_url>/health
//!   200 { "status": "healthy", "model_loaded": true }
//! ```

use std::time::Duration;

use async_trait::async_trait;
use reqwest::StatusCode;
use reqwest::multipart::{Form, Part};
use serde::{Deserialize, Serialize};

use crate::error::InferenceError;
use crate::video::VideoArtifact;

/// Un-normalized regression output.
#[derive(Debug, Clone, PartialEq)]
pub struct RawEjectionFraction {
    pub ef_percent: f64,
    pub reported_version: Option<String>,
}

#[async_trait]
pub trait EfEstimator: Send + Sync {
    async fn estimate(&self, video: &VideoArtifact) -> Result<RawEjectionFraction, InferenceError>;
}

#[derive(Debug, Deserialize)]
struct PredictEfResponse {
    ef_value: Option<f64>,
    #[serde(default)]
    model_version: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ServiceErrorBody {
    detail: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EfServiceHealth {
    pub status: String,
    #[serde(default)]
    pub model_loaded: bool,
}

/// HTTP client for the ejection fraction service.
#[derive(Debug, Clone)]
pub struct HttpEfClient {
    base_url: String,
    timeout: Duration,
    http: reqwest::Client,
}

impl HttpEfClient {
    pub fn new(base_url: &str, timeout: Duration) -> Result<Self, InferenceError> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("clinovia/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()
            .map_err(|e| InferenceError::Unavailable(format!("building HTTP client: {e}")))?;
        Ok(Self {
            base_url: base_url.trim_end_matches('/').to_string(),
            timeout,
            http,
        })
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// Service readiness. Never fails; an unreachable service reports
    /// status `unavailable`.
    pub async fn health(&self) -> EfServiceHealth {
        let url = format!("{}/health", self.base_url);
        let response = match self
            .http
            .get(&url)
            .timeout(Duration::from_secs(5))
            .send()
            .await
        {
            Ok(response) => response,
            Err(_) => {
                return EfServiceHealth {
                    status: "unavailable".into(),
                    model_loaded: false,
                };
            }
        };
        if !response.status().is_success() {
            return EfServiceHealth {
                status: "unhealthy".into(),
                model_loaded: false,
            };
        }
        response.json().await.unwrap_or(EfServiceHealth {
            status: "unhealthy".into(),
            model_loaded: false,
        })
    }

    fn send_error(&self, err: reqwest::Error) -> InferenceError {
        if err.is_timeout() {
            InferenceError::Timeout(self.timeout)
        } else {
            InferenceError::Unavailable(format!("EF service at {}: {err}", self.base_url))
        }
    }
}

#[async_trait]
impl EfEstimator for HttpEfClient {
    async fn estimate(&self, video: &VideoArtifact) -> Result<RawEjectionFraction, InferenceError> {
        let mime = video.content_type.as_deref().unwrap_or("video/avi");
        let part = Part::bytes(video.bytes.clone())
            .file_name(video.upload_name())
            .mime_str(mime)
            .map_err(|e| InferenceError::UnsupportedArtifact(format!("content type {mime}: {e}")))?;
        let form = Form::new().part("video", part);

        let url = format!("{}/predict-ef", self.base_url);
        let response = self
            .http
            .post(&url)
            .multipart(form)
            .send()
            .await
            .map_err(|e| self.send_error(e))?;

        let status = response.status();
        if status.is_success() {
            let body: PredictEfResponse = response
                .json()
                .await
                .map_err(|e| InferenceError::MalformedOutput(e.to_string()))?;
            let ef_percent = body.ef_value.ok_or_else(|| {
                InferenceError::MalformedOutput("response has no ef_value".into())
            })?;
            return Ok(RawEjectionFraction {
                ef_percent,
                reported_version: body.model_version,
            });
        }

        let detail = response
            .json::<ServiceErrorBody>()
            .await
            .ok()
            .and_then(|b| b.detail)
            .unwrap_or_else(|| status.to_string());
        tracing::warn!(status = status.as_u16(), %detail, "EF service returned an error");

        Err(match status {
            StatusCode::BAD_REQUEST | StatusCode::PAYLOAD_TOO_LARGE => {
                InferenceError::UnsupportedArtifact(detail)
            }
            StatusCode::SERVICE_UNAVAILABLE
            | StatusCode::BAD_GATEWAY
            | StatusCode::GATEWAY_TIMEOUT
            | StatusCode::TOO_MANY_REQUESTS => InferenceError::Unavailable(detail),
            _ => InferenceError::Rejected(detail),
        })
    }
}
