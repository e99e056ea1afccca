//! Field contract checks.
//!
//! Every declared check runs on every present field; one field can surface
//! several violations at once. Payload keys with no field contract are
//! allowed.

use super::domain::{Violation, ViolationOrigin, rules};
use crate::registry::domain::{FieldContract, FieldType};
use serde_json::{Value, json};

/// Checks `payload` against the ordered field contracts.
#[must_use]
pub fn validate_schema(payload: &Value, fields: &[FieldContract]) -> Vec<Violation> {
    let mut violations = Vec::new();
    for field in fields {
        match lookup(payload, field.name()) {
            Some(value) => check_present(field, value, &mut violations),
            None if field.is_required() => violations.push(
                Violation::new(
                    &rules::MISSING_REQUIRED_FIELD,
                    ViolationOrigin::Schema,
                    format!("required field '{}' is missing", field.name()),
                )
                .with_field(field.name()),
            ),
            None => {}
        }
    }
    violations
}

/// Returns the value under `name`, treating `null` as absent.
fn lookup<'a>(payload: &'a Value, name: &str) -> Option<&'a Value> {
    payload.get(name).filter(|value| !value.is_null())
}

/// Renders a value the way patterns see it: strings bare, the rest as JSON.
fn stringify(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

fn check_present(field: &FieldContract, value: &Value, violations: &mut Vec<Violation>) {
    let name = field.name();
    let schema_violation = |rule, message: String| {
        Violation::new(rule, ViolationOrigin::Schema, message).with_field(name)
    };

    if !field.field_type().matches(value) {
        violations.push(
            schema_violation(
                &rules::TYPE_MISMATCH,
                format!(
                    "field '{name}' expected {} but got {}",
                    field.field_type(),
                    FieldType::name_of(value)
                ),
            )
            .with_evidence(json!({
                "expected": field.field_type().as_str(),
                "actual": FieldType::name_of(value),
            })),
        );
    }

    if let Some(pattern) = field.pattern()
        && !pattern.is_match(&stringify(value))
    {
        violations.push(
            schema_violation(
                &rules::PATTERN_MISMATCH,
                format!("field '{name}' does not match pattern {}", pattern.as_str()),
            )
            .with_evidence(json!({ "pattern": pattern.as_str() })),
        );
    }

    if !field.allowed_values().is_empty() && !field.allowed_values().contains(value) {
        violations.push(
            schema_violation(
                &rules::INVALID_ENUM_VALUE,
                format!("field '{name}' is not one of the allowed values"),
            )
            .with_evidence(json!({ "allowed": field.allowed_values() })),
        );
    }

    if let Some(range) = field.range()
        && let Some(number) = value.as_f64()
        && !range.contains(number)
    {
        violations.push(
            schema_violation(
                &rules::OUT_OF_RANGE,
                format!("field '{name}' value {number} is outside {range}"),
            )
            .with_evidence(json!({ "min": range.min, "max": range.max, "actual": number })),
        );
    }

    if let Some(max_length) = field.max_length()
        && let Some(length) = measured_length(value)
        && length > max_length
    {
        violations.push(
            schema_violation(
                &rules::EXCEEDS_MAX_LENGTH,
                format!("field '{name}' has length {length}, maximum is {max_length}"),
            )
            .with_evidence(json!({ "max_length": max_length, "actual": length })),
        );
    }
}

fn measured_length(value: &Value) -> Option<usize> {
    match value {
        Value::String(text) => Some(text.chars().count()),
        Value::Array(items) => Some(items.len()),
        _ => None,
    }
}
