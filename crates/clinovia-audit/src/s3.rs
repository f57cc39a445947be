use async_trait::async_trait;
use aws_sdk_s3::Client;

use clinovia_core::audit_keys;
use clinovia_core::models::audit::AuditRecord;
use clinovia_storage::error::StorageError;
use clinovia_storage::json;

use crate::error::AuditError;
use crate::sink::{Ack, AuditSink};

/// Audit sink backed by write-once S3 objects.
///
/// Each record lands at `audit/{org}/{calculator}/{record_key}.json` with
/// `If-None-Match: *`, so S3 itself rejects a second write to the same key.
/// Retention is handled by the bucket's lifecycle and object-lock settings.
#[derive(Clone)]
pub struct S3AuditSink {
    client: Client,
    bucket: String,
}

impl S3AuditSink {
    pub fn new(client: Client, bucket: impl Into<String>) -> Self {
        Self {
            client,
            bucket: bucket.into(),
        }
    }

    pub fn bucket(&self) -> &str {
        &self.bucket
    }

    pub fn object_key(record: &AuditRecord) -> String {
        audit_keys::audit_record(record.organization_id, record.calculator, &record.record_key)
    }

    /// Read a stored record back.
    pub async fn load(&self, key: &str) -> Result<AuditRecord, AuditError> {
        Ok(json::load_json(&self.client, &self.bucket, key).await?)
    }
}

#[async_trait]
impl AuditSink for S3AuditSink {
    async fn record(&self, record: &AuditRecord) -> Result<Ack, AuditError> {
        let key = Self::object_key(record);
        match json::create_json(&self.client, &self.bucket, &key, record).await {
            Ok(_) => Ok(Ack::Written),
            Err(StorageError::AlreadyExists { .. }) => {
                tracing::debug!(key = %key, "audit record already present");
                Ok(Ack::AlreadyPresent)
            }
            Err(e) => Err(e.into()),
        }
    }
}
