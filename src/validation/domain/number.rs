//! Numeric reading of JSON values.

use serde_json::Value;

/// Reads a JSON number, or a string holding one, as a finite `f64`.
///
/// Surrounding whitespace in strings is ignored. Anything else, including
/// `"NaN"` and `"inf"`, yields `None`.
///
/// # Examples
///
/// ```
/// use handoff_guard::validation::domain::numeric_value;
/// use serde_json::json;
///
/// assert_eq!(numeric_value(&json!(7500)), Some(7500.0));
/// assert_eq!(numeric_value(&json!(" 7500.5 ")), Some(7500.5));
/// assert_eq!(numeric_value(&json!("seven")), None);
/// ```
#[must_use]
pub fn numeric_value(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    };
    parsed.filter(|number| number.is_finite())
}
