use serde::Serialize;
use tracing::info;

use clinovia_core::models::audit::AuditRecord;

use crate::sink::Ack;

/// A structured audit event for a stored prediction record.
///
/// Logged via `tracing` so it lands in CloudWatch Logs next to the request
/// log. Carries identifiers and the input digest only, never input values.
#[derive(Debug, Clone, Serialize)]
pub struct AuditEvent {
    pub action: &'static str,
    pub calculator: String,
    pub record_key: String,
    pub prediction_id: String,
    pub organization_id: String,
    pub user_id: String,
    pub input_digest: String,
}

impl AuditEvent {
    pub fn new(action: &'static str, record: &AuditRecord) -> Self {
        Self {
            action,
            calculator: record.calculator.to_string(),
            record_key: record.record_key.clone(),
            prediction_id: record.prediction_id.to_string(),
            organization_id: record.organization_id.to_string(),
            user_id: record.user_id.to_string(),
            input_digest: record.input_digest.short().to_string(),
        }
    }

    /// The event for a completed `record` call.
    pub fn for_ack(record: &AuditRecord, ack: Ack) -> Self {
        match ack {
            Ack::Written => Self::new("prediction.recorded", record),
            Ack::AlreadyPresent => Self::new("prediction.redelivered", record),
        }
    }

    /// Emit this audit event via tracing.
    pub fn emit(&self) {
        info!(
            audit.action = self.action,
            audit.calculator = %self.calculator,
            audit.record_key = %self.record_key,
            audit.prediction_id = %self.prediction_id,
            audit.organization_id = %self.organization_id,
            audit.user_id = %self.user_id,
            audit.input_digest = %self.input_digest,
            "audit event"
        );
    }
}
