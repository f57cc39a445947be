//! clinovia-orchestrator
//!
//! Runs one prediction request end to end: validate, dispatch to the
//! calculator's registered strategy, stamp provenance, hand off to audit.

pub mod error;
pub mod orchestrator;
pub mod registry;
pub mod state;
