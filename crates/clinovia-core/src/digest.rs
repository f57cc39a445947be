use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;

use crate::error::CoreError;

/// SHA-256 digest (lowercase hex) of a clinical input.
///
/// Audit records carry this instead of the input itself.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, TS)]
#[serde(try_from = "String", into = "String")]
#[ts(export)]
pub struct InputDigest(String);

impl InputDigest {
    pub fn from_bytes(data: &[u8]) -> Self {
        InputDigest(hex::encode(Sha256::digest(data)))
    }

    pub(crate) fn from_hasher(hasher: Sha256) -> Self {
        InputDigest(hex::encode(hasher.finalize()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// First 12 hex chars, for log lines.
    pub fn short(&self) -> &str {
        &self.0[..12.min(self.0.len())]
    }
}

impl TryFrom<String> for InputDigest {
    type Error = CoreError;

    fn try_from(s: String) -> Result<Self, Self::Error> {
        if s.len() != 64 || !s.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(CoreError::InvalidDigest(s));
        }
        Ok(InputDigest(s.to_ascii_lowercase()))
    }
}

impl From<InputDigest> for String {
    fn from(d: InputDigest) -> Self {
        d.0
    }
}

impl std::fmt::Display for InputDigest {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}
