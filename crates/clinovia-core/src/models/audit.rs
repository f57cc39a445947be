use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;
use uuid::Uuid;

use super::identity::Identity;
use super::result::ClinicalResult;
use crate::calculator::CalculatorId;
use crate::digest::InputDigest;

/// Write-once proof that a prediction was returned.
///
/// Never carries the raw input, only its digest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct AuditRecord {
    /// Deterministic store key; see [`record_key`].
    pub record_key: String,
    pub prediction_id: Uuid,
    pub organization_id: Uuid,
    pub user_id: Uuid,
    pub calculator: CalculatorId,
    pub input_digest: InputDigest,
    pub result: ClinicalResult,
    pub recorded_at: jiff::Timestamp,
}

impl AuditRecord {
    pub fn new(
        identity: Identity,
        prediction_id: Uuid,
        input_digest: InputDigest,
        result: ClinicalResult,
        recorded_at: jiff::Timestamp,
    ) -> Self {
        let record_key = record_key(
            identity.organization_id,
            result.calculator,
            recorded_at,
            &input_digest,
        );
        Self {
            record_key,
            prediction_id,
            organization_id: identity.organization_id,
            user_id: identity.user_id,
            calculator: result.calculator,
            input_digest,
            result,
            recorded_at,
        }
    }
}

/// Derive the idempotency key for an audit record from
/// organization + calculator + timestamp + input digest.
///
/// Redelivering the same record always lands on the same key.
pub fn record_key(
    organization_id: Uuid,
    calculator: CalculatorId,
    recorded_at: jiff::Timestamp,
    input_digest: &InputDigest,
) -> String {
    let mut hasher = Sha256::new();
    hasher.update(organization_id.as_bytes());
    hasher.update([0u8]);
    hasher.update(calculator.as_str().as_bytes());
    hasher.update([0u8]);
    hasher.update(recorded_at.as_nanosecond().to_be_bytes());
    hasher.update([0u8]);
    hasher.update(input_digest.as_str().as_bytes());
    hex::encode(hasher.finalize())
}
