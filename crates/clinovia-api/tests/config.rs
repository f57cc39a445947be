use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

use clinovia_api::config::{AuditBackend, ConfigError, MAX_INFERENCE_RETRIES, ServiceConfig};

fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
    let vars: HashMap<String, String> = vars
        .iter()
        .map(|(k, v)| (k.to_string(), v.to_string()))
        .collect();
    move |key| vars.get(key).cloned()
}

#[test]
fn defaults_apply_when_unset() {
    let config = ServiceConfig::from_lookup(lookup(&[])).unwrap();
    assert_eq!(config, ServiceConfig::default());
    assert_eq!(config.audit_backend, AuditBackend::S3);
    assert_eq!(config.audit_bucket, "clinovia-audit");
    assert_eq!(config.inference_timeout, Duration::from_secs(120));
    assert_eq!(config.inference_retries, 1);
    assert_eq!(config.max_video_bytes, 100 * 1024 * 1024);
    assert_eq!(config.audit_wait, Duration::from_secs(10));
    assert!(config.ascvd_coefficients.is_none());
}

#[test]
fn variables_override_defaults() {
    let config = ServiceConfig::from_lookup(lookup(&[
        ("CLINOVIA_AUDIT_BACKEND", "memory"),
        ("CLINOVIA_AUDIT_BUCKET", "audit-prod"),
        ("CLINOVIA_MODEL_ROOT", "/var/models"),
        ("CLINOVIA_EF_SERVICE_URL", "http://ef.internal:9000"),
        ("CLINOVIA_INFERENCE_TIMEOUT_SECS", "30"),
        ("CLINOVIA_INFERENCE_RETRIES", "0"),
        ("CLINOVIA_ASCVD_COEFFICIENTS", "/etc/clinovia/pce.json"),
        ("CLINOVIA_MAX_VIDEO_BYTES", "1048576"),
        ("CLINOVIA_AUDIT_WAIT_SECS", "3"),
    ]))
    .unwrap();

    assert_eq!(config.audit_backend, AuditBackend::Memory);
    assert_eq!(config.audit_bucket, "audit-prod");
    assert_eq!(config.model_root, PathBuf::from("/var/models"));
    assert_eq!(config.ef_service_url, "http://ef.internal:9000");
    assert_eq!(config.inference_timeout, Duration::from_secs(30));
    assert_eq!(config.inference_retries, 0);
    assert_eq!(
        config.ascvd_coefficients,
        Some(PathBuf::from("/etc/clinovia/pce.json"))
    );
    assert_eq!(config.max_video_bytes, 1_048_576);

    let orchestrator = config.orchestrator_config();
    assert_eq!(orchestrator.inference_timeout, Duration::from_secs(30));
    assert_eq!(orchestrator.inference_retries, 0);
    assert_eq!(orchestrator.max_video_bytes, 1_048_576);
    assert_eq!(orchestrator.audit_wait, Duration::from_secs(3));
}

#[test]
fn empty_values_fall_back_to_defaults() {
    let config =
        ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_RETRIES", "  ")])).unwrap();
    assert_eq!(config.inference_retries, 1);
}

#[test]
fn malformed_values_are_startup_errors() {
    let err = ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_TIMEOUT_SECS", "2m")]))
        .unwrap_err();
    assert!(matches!(
        err,
        ConfigError::Invalid { var: "CLINOVIA_INFERENCE_TIMEOUT_SECS", ref value, .. } if value == "2m"
    ));

    let err =
        ServiceConfig::from_lookup(lookup(&[("CLINOVIA_AUDIT_BACKEND", "dynamo")])).unwrap_err();
    assert!(err.to_string().contains("CLINOVIA_AUDIT_BACKEND"));

    assert!(
        ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_RETRIES", "-1")])).is_err()
    );
}

#[test]
fn retries_are_capped() {
    let config =
        ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_RETRIES", "3")])).unwrap();
    assert_eq!(config.inference_retries, MAX_INFERENCE_RETRIES);

    for value in ["4", "4294967295"] {
        let err = ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_RETRIES", value)]))
            .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Invalid { var: "CLINOVIA_INFERENCE_RETRIES", ref reason, .. }
                if reason.contains("between 0 and 3")
        ));
    }
}

#[test]
fn zero_second_waits_are_refused() {
    for var in ["CLINOVIA_INFERENCE_TIMEOUT_SECS", "CLINOVIA_AUDIT_WAIT_SECS"] {
        let err = ServiceConfig::from_lookup(lookup(&[(var, "0")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { var: v, .. } if v == var));
    }
    assert!(
        ServiceConfig::from_lookup(lookup(&[("CLINOVIA_INFERENCE_TIMEOUT_SECS", "1")])).is_ok()
    );
    assert!(ServiceConfig::from_lookup(lookup(&[("CLINOVIA_AUDIT_WAIT_SECS", "61")])).is_err());
}
