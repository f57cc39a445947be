//! clinovia-inference
//!
//! Model inference adapter: loads trained classifier artifacts, calls the
//! ejection fraction service, and normalizes raw model output into result
//! fields. Failures are `InferenceError`s that say whether a retry can help.

pub mod artifact;
pub mod classifier;
pub mod ef;
pub mod error;
pub mod normalize;
pub mod video;
