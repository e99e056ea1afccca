//! Opaque evidence attached to a violation.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Supporting detail for a violation, carried without interpretation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Evidence {
    /// Free text.
    Text(String),
    /// Any structured value.
    Structured(Value),
}

impl From<String> for Evidence {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<&str> for Evidence {
    fn from(value: &str) -> Self {
        Self::Text(value.to_owned())
    }
}

impl From<Value> for Evidence {
    fn from(value: Value) -> Self {
        match value {
            Value::String(text) => Self::Text(text),
            other => Self::Structured(other),
        }
    }
}
