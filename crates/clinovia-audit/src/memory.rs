use std::collections::BTreeMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use tokio::sync::Mutex;

use clinovia_core::models::audit::AuditRecord;

use crate::error::AuditError;
use crate::sink::{Ack, AuditSink};

/// In-process audit sink, keyed by record key.
///
/// Used for local runs (`CLINOVIA_AUDIT_BACKEND=memory`) and tests.
#[derive(Debug, Default)]
pub struct MemoryAuditSink {
    records: Mutex<BTreeMap<String, AuditRecord>>,
    deliveries: AtomicUsize,
}

impl MemoryAuditSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stored records, ordered by key.
    pub async fn records(&self) -> Vec<AuditRecord> {
        self.records.lock().await.values().cloned().collect()
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    /// Number of `record` calls, including redeliveries.
    pub fn deliveries(&self) -> usize {
        self.deliveries.load(Ordering::Relaxed)
    }
}

#[async_trait]
impl AuditSink for MemoryAuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<Ack, AuditError> {
        self.deliveries.fetch_add(1, Ordering::Relaxed);
        let mut records = self.records.lock().await;
        if records.contains_key(&record.record_key) {
            return Ok(Ack::AlreadyPresent);
        }
        records.insert(record.record_key.clone(), record.clone());
        Ok(Ack::Written)
    }
}

/// A sink whose store is always down.
#[derive(Debug, Default)]
pub struct UnavailableAuditSink;

#[async_trait]
impl AuditSink for UnavailableAuditSink {
    async fn record(&self, _record: &AuditRecord) -> Result<Ack, AuditError> {
        Err(AuditError::Unavailable("audit store is offline".into()))
    }
}
