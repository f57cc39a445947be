use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use ts_rs::TS;

use crate::calculator::CalculatorId;
use crate::digest::InputDigest;

/// A single typed, already-validated input value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(untagged)]
#[ts(export)]
pub enum FieldValue {
    Bool(bool),
    Number(f64),
    Category(String),
}

/// De-identified inputs for one calculator, keyed by field name.
///
/// Only the input validator builds these, so every value present has
/// already passed its table's type and range checks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct ClinicalInput {
    pub calculator: CalculatorId,
    pub fields: BTreeMap<String, FieldValue>,
}

impl ClinicalInput {
    pub fn new(calculator: CalculatorId) -> Self {
        Self {
            calculator,
            fields: BTreeMap::new(),
        }
    }

    pub fn insert(&mut self, name: impl Into<String>, value: FieldValue) {
        self.fields.insert(name.into(), value);
    }

    pub fn with(mut self, name: impl Into<String>, value: FieldValue) -> Self {
        self.insert(name, value);
        self
    }

    pub fn contains(&self, name: &str) -> bool {
        self.fields.contains_key(name)
    }

    pub fn number(&self, name: &str) -> Option<f64> {
        match self.fields.get(name) {
            Some(FieldValue::Number(n)) => Some(*n),
            _ => None,
        }
    }

    pub fn flag(&self, name: &str) -> Option<bool> {
        match self.fields.get(name) {
            Some(FieldValue::Bool(b)) => Some(*b),
            _ => None,
        }
    }

    /// Optional boolean inputs read as `false` when absent.
    pub fn flag_or_false(&self, name: &str) -> bool {
        self.flag(name).unwrap_or(false)
    }

    pub fn category(&self, name: &str) -> Option<&str> {
        match self.fields.get(name) {
            Some(FieldValue::Category(c)) => Some(c.as_str()),
            _ => None,
        }
    }

    /// Deterministic one-way digest of the calculator id and every field.
    ///
    /// Field order is fixed by the `BTreeMap`, numbers are hashed by their
    /// IEEE-754 bits (with `-0.0` folded into `0.0`), and each value is
    /// type-tagged so `"1"` and `1` never collide.
    pub fn digest(&self) -> InputDigest {
        let mut hasher = Sha256::new();
        hasher.update(self.calculator.as_str().as_bytes());
        hasher.update([0u8]);
        for (name, value) in &self.fields {
            hasher.update(name.as_bytes());
            hasher.update([0u8]);
            match value {
                FieldValue::Bool(b) => {
                    hasher.update(b"b");
                    hasher.update([u8::from(*b)]);
                }
                FieldValue::Number(n) => {
                    let n = if *n == 0.0 { 0.0f64 } else { *n };
                    hasher.update(b"n");
                    hasher.update(n.to_bits().to_be_bytes());
                }
                FieldValue::Category(c) => {
                    hasher.update(b"c");
                    hasher.update(c.as_bytes());
                }
            }
            hasher.update([0u8]);
        }
        InputDigest::from_hasher(hasher)
    }
}
