use std::fmt::Display;
use std::ops::RangeInclusive;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

use clinovia_inference::video::DEFAULT_MAX_VIDEO_BYTES;
use clinovia_orchestrator::orchestrator::OrchestratorConfig;

/// Retries beyond this are refused at startup.
pub const MAX_INFERENCE_RETRIES: u32 = 3;

const INFERENCE_TIMEOUT_SECS: RangeInclusive<u64> = 1..=900;
const AUDIT_WAIT_SECS: RangeInclusive<u64> = 1..=60;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("invalid value for {var}: {value:?} ({reason})")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuditBackend {
    /// Write-once objects in an S3 bucket.
    S3,
    /// In-process only. Records are lost on restart.
    Memory,
}

impl FromStr for AuditBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "s3" => Ok(AuditBackend::S3),
            "memory" => Ok(AuditBackend::Memory),
            _ => Err("expected `s3` or `memory`".to_string()),
        }
    }
}

/// Service settings, read once at startup.
#[derive(Debug, Clone, PartialEq)]
pub struct ServiceConfig {
    pub audit_backend: AuditBackend,
    pub audit_bucket: String,
    pub model_root: PathBuf,
    pub ef_service_url: String,
    pub inference_timeout: Duration,
    pub inference_retries: u32,
    /// Bound on how long a response waits for its audit write.
    pub audit_wait: Duration,
    /// Optional pooled-cohort coefficient table replacing the published one.
    pub ascvd_coefficients: Option<PathBuf>,
    pub max_video_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            audit_backend: AuditBackend::S3,
            audit_bucket: "clinovia-audit".to_string(),
            model_root: PathBuf::from("/opt/clinovia/models"),
            ef_service_url: "http://localhost:8081".to_string(),
            inference_timeout: Duration::from_secs(120),
            inference_retries: 1,
            audit_wait: Duration::from_secs(10),
            ascvd_coefficients: None,
            max_video_bytes: DEFAULT_MAX_VIDEO_BYTES,
        }
    }
}

impl ServiceConfig {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|var| std::env::var(var).ok())
    }

    /// Build from an arbitrary variable source. Unset or empty variables
    /// take their defaults; malformed ones are an error.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let get = |var: &str| lookup(var).filter(|v| !v.trim().is_empty());
        let defaults = Self::default();

        Ok(Self {
            audit_backend: parse(&get, "CLINOVIA_AUDIT_BACKEND")?
                .unwrap_or(defaults.audit_backend),
            audit_bucket: get("CLINOVIA_AUDIT_BUCKET").unwrap_or(defaults.audit_bucket),
            model_root: get("CLINOVIA_MODEL_ROOT")
                .map(PathBuf::from)
                .unwrap_or(defaults.model_root),
            ef_service_url: get("CLINOVIA_EF_SERVICE_URL").unwrap_or(defaults.ef_service_url),
            inference_timeout: bounded(
                &get,
                "CLINOVIA_INFERENCE_TIMEOUT_SECS",
                INFERENCE_TIMEOUT_SECS,
            )?
            .map(Duration::from_secs)
            .unwrap_or(defaults.inference_timeout),
            inference_retries: bounded(
                &get,
                "CLINOVIA_INFERENCE_RETRIES",
                0..=MAX_INFERENCE_RETRIES,
            )?
            .unwrap_or(defaults.inference_retries),
            audit_wait: bounded(&get, "CLINOVIA_AUDIT_WAIT_SECS", AUDIT_WAIT_SECS)?
                .map(Duration::from_secs)
                .unwrap_or(defaults.audit_wait),
            ascvd_coefficients: get("CLINOVIA_ASCVD_COEFFICIENTS").map(PathBuf::from),
            max_video_bytes: parse(&get, "CLINOVIA_MAX_VIDEO_BYTES")?
                .unwrap_or(defaults.max_video_bytes),
        })
    }

    pub fn orchestrator_config(&self) -> OrchestratorConfig {
        OrchestratorConfig {
            inference_timeout: self.inference_timeout,
            inference_retries: self.inference_retries,
            max_video_bytes: self.max_video_bytes,
            audit_wait: self.audit_wait,
        }
    }
}

fn parse<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr,
    T::Err: ToString,
{
    get(var)
        .map(|value| {
            value.trim().parse::<T>().map_err(|e| ConfigError::Invalid {
                var,
                value: value.clone(),
                reason: e.to_string(),
            })
        })
        .transpose()
}

fn bounded<T>(
    get: &impl Fn(&str) -> Option<String>,
    var: &'static str,
    range: RangeInclusive<T>,
) -> Result<Option<T>, ConfigError>
where
    T: FromStr + PartialOrd + Display,
    T::Err: ToString,
{
    match parse::<T>(get, var)? {
        Some(value) if !range.contains(&value) => Err(ConfigError::Invalid {
            var,
            reason: format!("must be between {} and {}", range.start(), range.end()),
            value: value.to_string(),
        }),
        other => Ok(other),
    }
}
