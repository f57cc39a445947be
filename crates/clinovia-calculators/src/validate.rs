use serde_json::Value;

use clinovia_core::calculator::CalculatorId;
use clinovia_core::models::input::{ClinicalInput, FieldValue};

use crate::schema::{Constraint, FieldKind, FieldSpec, FieldViolation, ValidationError};

/// Build a typed [`ClinicalInput`] from a raw JSON object, or collect every
/// field that violates its row in `fields`.
///
/// Numeric strings are parsed; nothing else is coerced. Values outside a
/// range are rejected, never clamped. Keys with no row in the table are
/// dropped and never reach the input.
pub fn validate_fields(
    calculator: CalculatorId,
    fields: &[FieldSpec],
    raw: &Value,
) -> Result<ClinicalInput, ValidationError> {
    let Some(object) = raw.as_object() else {
        return Err(ValidationError {
            calculator,
            violations: vec![FieldViolation {
                field: "body".to_string(),
                constraint: Constraint::NotAnObject,
            }],
        });
    };

    let mut input = ClinicalInput::new(calculator);
    let mut violations = Vec::new();

    for spec in fields {
        match object.get(&spec.name) {
            None | Some(Value::Null) => {
                if spec.required {
                    violations.push(FieldViolation {
                        field: spec.name.clone(),
                        constraint: Constraint::Required,
                    });
                }
            }
            Some(value) => match check_value(spec, value) {
                Ok(typed) => input.insert(spec.name.clone(), typed),
                Err(constraint) => violations.push(FieldViolation {
                    field: spec.name.clone(),
                    constraint,
                }),
            },
        }
    }

    let dropped = object
        .keys()
        .filter(|key| !fields.iter().any(|f| &f.name == *key))
        .count();
    if dropped > 0 {
        tracing::debug!(%calculator, dropped, "ignored fields outside the input table");
    }

    if violations.is_empty() {
        Ok(input)
    } else {
        Err(ValidationError {
            calculator,
            violations,
        })
    }
}

fn check_value(spec: &FieldSpec, value: &Value) -> Result<FieldValue, Constraint> {
    match spec.kind {
        FieldKind::Number | FieldKind::Integer => {
            let n = as_number(value).ok_or(Constraint::WrongType {
                expected: spec.kind,
            })?;
            if spec.kind == FieldKind::Integer && n.fract() != 0.0 {
                return Err(Constraint::NotInteger { value: n });
            }
            if let Some(range) = spec.range
                && !range.contains(n)
            {
                return Err(Constraint::OutOfRange {
                    value: n,
                    min: range.min,
                    max: range.max,
                });
            }
            Ok(FieldValue::Number(n))
        }
        FieldKind::Boolean => value.as_bool().map(FieldValue::Bool).ok_or(Constraint::WrongType {
            expected: FieldKind::Boolean,
        }),
        FieldKind::Category => {
            let s = value.as_str().ok_or(Constraint::WrongType {
                expected: FieldKind::Category,
            })?;
            if spec.allowed.iter().any(|a| a == s) {
                Ok(FieldValue::Category(s.to_string()))
            } else {
                Err(Constraint::NotAllowed {
                    value: s.to_string(),
                    allowed: spec.allowed.clone(),
                })
            }
        }
    }
}

fn as_number(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok().filter(|n| n.is_finite()),
        _ => None,
    }
}
