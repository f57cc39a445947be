//! clinovia-audit
//!
//! Write-once audit records for returned predictions, plus the alert
//! channel that makes a lost audit write visible to operators.

pub mod alert;
pub mod error;
pub mod events;
pub mod memory;
pub mod s3;
pub mod sink;
