//! Audit store key conventions.
//!
//! Pure string functions with no storage dependency. These define the canonical
//! layout of write-once audit objects.

use uuid::Uuid;

use crate::calculator::CalculatorId;

pub const AUDIT_PREFIX: &str = "audit/";

pub fn organization_prefix(organization_id: Uuid) -> String {
    format!("{AUDIT_PREFIX}{organization_id}/")
}

pub fn calculator_prefix(organization_id: Uuid, calculator: CalculatorId) -> String {
    format!("{}{calculator}/", organization_prefix(organization_id))
}

pub fn audit_record(organization_id: Uuid, calculator: CalculatorId, record_key: &str) -> String {
    format!(
        "{}{record_key}.json",
        calculator_prefix(organization_id, calculator)
    )
}
