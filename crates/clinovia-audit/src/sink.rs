use async_trait::async_trait;
use serde::Serialize;

use clinovia_core::models::audit::AuditRecord;

use crate::error::AuditError;

/// Outcome of a successful `record` call.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Ack {
    /// The record was stored by this call.
    Written,
    /// A record with the same key was already stored; nothing changed.
    AlreadyPresent,
}

/// Append-only store for audit records.
///
/// Implementations must be idempotent on `record.record_key`: delivering the
/// same record any number of times leaves exactly one stored copy.
#[async_trait]
pub trait AuditSink: Send + Sync {
    async fn record(&self, record: &AuditRecord) -> Result<Ack, AuditError>;
}
