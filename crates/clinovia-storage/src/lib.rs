//! clinovia-storage
//!
//! S3 operations. Thin wrapper around the AWS S3 SDK, including the
//! write-once puts the audit store relies on.

pub mod client;
pub mod error;
pub mod json;
pub mod objects;
