use serde::{Deserialize, Serialize};
use thiserror::Error;
use ts_rs::TS;

use clinovia_core::calculator::CalculatorId;

/// The type a field's raw value must have.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, TS)]
#[serde(rename_all = "snake_case")]
#[ts(export)]
pub enum FieldKind {
    /// Any finite number. Numeric strings are parsed.
    Number,
    /// A whole number. Numeric strings are parsed.
    Integer,
    /// JSON `true` / `false` only.
    Boolean,
    /// One of the field's `allowed` values, matched exactly.
    Category,
}

/// Inclusive numeric bounds.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldRange {
    pub min: f64,
    pub max: f64,
}

impl FieldRange {
    pub fn contains(&self, value: f64) -> bool {
        value >= self.min && value <= self.max
    }
}

/// One row of a calculator's input table.
#[derive(Debug, Clone, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldSpec {
    pub name: String,
    pub kind: FieldKind,
    pub range: Option<FieldRange>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub allowed: Vec<String>,
    pub required: bool,
    pub description: Option<String>,
}

impl FieldSpec {
    pub fn number(name: &str, min: f64, max: f64) -> Self {
        Self::numeric(name, FieldKind::Number, min, max)
    }

    pub fn integer(name: &str, min: f64, max: f64) -> Self {
        Self::numeric(name, FieldKind::Integer, min, max)
    }

    /// A number with only a lower bound.
    pub fn at_least(name: &str, min: f64) -> Self {
        Self::numeric(name, FieldKind::Number, min, f64::MAX)
    }

    pub fn boolean(name: &str) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Boolean,
            range: None,
            allowed: Vec::new(),
            required: true,
            description: None,
        }
    }

    pub fn category(name: &str, allowed: &[&str]) -> Self {
        Self {
            name: name.to_string(),
            kind: FieldKind::Category,
            range: None,
            allowed: allowed.iter().map(|s| s.to_string()).collect(),
            required: true,
            description: None,
        }
    }

    pub fn optional(mut self) -> Self {
        self.required = false;
        self
    }

    pub fn describe(mut self, description: &str) -> Self {
        self.description = Some(description.to_string());
        self
    }

    fn numeric(name: &str, kind: FieldKind, min: f64, max: f64) -> Self {
        Self {
            name: name.to_string(),
            kind,
            range: Some(FieldRange { min, max }),
            allowed: Vec::new(),
            required: true,
            description: None,
        }
    }
}

/// The constraint a field violated.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[serde(tag = "type", rename_all = "snake_case")]
#[ts(export)]
pub enum Constraint {
    Required,
    WrongType { expected: FieldKind },
    NotInteger { value: f64 },
    OutOfRange { value: f64, min: f64, max: f64 },
    NotAllowed { value: String, allowed: Vec<String> },
    NotAnObject,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS)]
#[ts(export)]
pub struct FieldViolation {
    pub field: String,
    pub constraint: Constraint,
}

impl FieldViolation {
    pub fn message(&self) -> String {
        match &self.constraint {
            Constraint::Required => format!("{} is required", self.field),
            Constraint::WrongType { expected } => {
                format!("{} must be of type {expected:?}", self.field)
            }
            Constraint::NotInteger { value } => {
                format!("{} must be a whole number (got {value})", self.field)
            }
            Constraint::OutOfRange { value, min, max } => {
                format!("{} value {value} is outside range [{min}, {max}]", self.field)
            }
            Constraint::NotAllowed { value, allowed } => format!(
                "{} value '{value}' is not one of: {}",
                self.field,
                allowed.join(", ")
            ),
            Constraint::NotAnObject => "request body must be a JSON object".to_string(),
        }
    }
}

/// Input rejected before any scoring ran. Carries every offending field.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, TS, Error)]
#[ts(export)]
#[error("invalid input for {calculator}: {}", summary(.violations))]
pub struct ValidationError {
    pub calculator: CalculatorId,
    pub violations: Vec<FieldViolation>,
}

impl ValidationError {
    /// Names of the offending fields, in table order.
    pub fn fields(&self) -> Vec<&str> {
        self.violations.iter().map(|v| v.field.as_str()).collect()
    }
}

fn summary(violations: &[FieldViolation]) -> String {
    violations
        .iter()
        .map(FieldViolation::message)
        .collect::<Vec<_>>()
        .join("; ")
}
