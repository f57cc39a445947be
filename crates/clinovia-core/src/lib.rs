//! clinovia-core
//!
//! Pure domain types, the calculator catalog, and audit key conventions.
//! No I/O. This is the shared vocabulary of the Clinovia prediction engine.

pub mod audit_keys;
pub mod calculator;
pub mod clock;
pub mod digest;
pub mod error;
pub mod models;
