use std::sync::Mutex;

use serde::Serialize;

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::audit::AuditRecord;

use crate::error::AuditError;

/// An audit write that could not be completed.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AuditWriteFailure {
    pub record_key: String,
    pub prediction_id: String,
    pub calculator: CalculatorId,
    pub reason: String,
}

impl AuditWriteFailure {
    pub fn new(record: &AuditRecord, error: &AuditError) -> Self {
        Self::with_reason(record, error.to_string())
    }

    /// A failure that did not come from the sink, such as a write that was
    /// abandoned or did not finish in time.
    pub fn with_reason(record: &AuditRecord, reason: impl Into<String>) -> Self {
        Self {
            record_key: record.record_key.clone(),
            prediction_id: record.prediction_id.to_string(),
            calculator: record.calculator,
            reason: reason.into(),
        }
    }
}

/// Operational channel for failures that must not be silent but must not
/// reach the end user either.
pub trait AlertChannel: Send + Sync {
    fn audit_write_failed(&self, failure: &AuditWriteFailure);
}

/// Raises alerts as `error` events on the `clinovia::alert` target, where
/// log-based alarms pick them up.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingAlertChannel;

impl AlertChannel for TracingAlertChannel {
    fn audit_write_failed(&self, failure: &AuditWriteFailure) {
        tracing::error!(
            target: "clinovia::alert",
            alert = "audit_write_failure",
            calculator = %failure.calculator,
            prediction_id = %failure.prediction_id,
            record_key = %failure.record_key,
            reason = %failure.reason,
            "audit record was not written"
        );
    }
}

/// Collects alerts in memory. For tests and local runs.
#[derive(Debug, Default)]
pub struct RecordingAlertChannel {
    failures: Mutex<Vec<AuditWriteFailure>>,
}

impl RecordingAlertChannel {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failures(&self) -> Vec<AuditWriteFailure> {
        match self.failures.lock() {
            Ok(failures) => failures.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }
}

impl AlertChannel for RecordingAlertChannel {
    fn audit_write_failed(&self, failure: &AuditWriteFailure) {
        let mut failures = match self.failures.lock() {
            Ok(failures) => failures,
            Err(poisoned) => poisoned.into_inner(),
        };
        failures.push(failure.clone());
    }
}
