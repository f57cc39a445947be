use thiserror::Error;

use clinovia_storage::error::StorageError;

#[derive(Debug, Error)]
pub enum AuditError {
    #[error("audit store error: {0}")]
    Storage(#[from] StorageError),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("audit store unavailable: {0}")]
    Unavailable(String),
}
