//! Helpers for agent-to-agent protocol messages.
//!
//! An A2A message carries its content under `message.parts`, each part
//! tagged `text` or `data`, and free-form `message.metadata`.

use super::error::HandoffBlockedError;
use super::request::{ForwardedHandoff, HandoffRequest};
use super::service::HandoffGuard;
use crate::registry::domain::AgentName;
use crate::validation::domain::{Metadata, TraceId, ValidationResult};
use mockable::Clock;
use serde_json::{Map, Value, json};

/// Metadata key under which the validation stamp is written.
pub const VALIDATION_METADATA_KEY: &str = "handoff_validation";

/// Flattens the parts of an A2A message into one payload object.
///
/// A text part holding a JSON object replaces what was collected so far;
/// any other text becomes `{"text": ...}`. Data parts merge their keys in.
#[must_use]
pub fn a2a_payload(message: &Value) -> Value {
    let parts = message
        .pointer("/message/parts")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    let mut payload = Map::new();
    for part in parts {
        match part.get("type").and_then(Value::as_str) {
            Some("text") => {
                let text = part.get("text").and_then(Value::as_str).unwrap_or_default();
                payload = match serde_json::from_str::<Value>(text) {
                    Ok(Value::Object(parsed)) => parsed,
                    _ => Map::from_iter([("text".to_owned(), Value::from(text))]),
                };
            }
            Some("data") => {
                if let Some(Value::Object(data)) = part.get("data") {
                    payload.extend(data.clone());
                }
            }
            _ => {}
        }
    }
    Value::Object(payload)
}

/// Returns `message.metadata` of an A2A message, or an empty map.
#[must_use]
pub fn a2a_metadata(message: &Value) -> Metadata {
    message
        .pointer("/message/metadata")
        .and_then(Value::as_object)
        .cloned()
        .unwrap_or_default()
}

/// Returns a copy of `message` stamped with the validation outcome under
/// `message.metadata.handoff_validation`.
#[must_use]
pub fn annotate_a2a_message(message: &Value, trace_id: &TraceId, result: &ValidationResult) -> Value {
    let mut root = message.as_object().cloned().unwrap_or_default();
    let mut inner = take_object(&mut root, "message");
    let mut metadata = take_object(&mut inner, "metadata");
    metadata.insert(
        VALIDATION_METADATA_KEY.to_owned(),
        json!({
            "validated": true,
            "trace_id": trace_id.as_str(),
            "verdict": result.verdict().as_str(),
            "violations": result.violations().len(),
            "blocked": result.is_blocked(),
        }),
    );
    inner.insert("metadata".to_owned(), Value::Object(metadata));
    root.insert("message".to_owned(), Value::Object(inner));
    Value::Object(root)
}

fn take_object(map: &mut Map<String, Value>, key: &str) -> Map<String, Value> {
    match map.remove(key) {
        Some(Value::Object(object)) => object,
        _ => Map::new(),
    }
}

impl<C> HandoffGuard<C>
where
    C: Clock + Send + Sync,
{
    /// Validates an A2A message and returns the forwarded handoff together
    /// with the annotated message.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffBlockedError`] when the handoff is blocked.
    pub async fn validate_a2a(
        &self,
        source: AgentName,
        target: AgentName,
        message: &Value,
    ) -> Result<(ForwardedHandoff, Value), HandoffBlockedError> {
        let request = HandoffRequest::new(source, target, a2a_payload(message))
            .with_metadata(a2a_metadata(message));
        let forwarded = self.validate(request).await?;
        let annotated = annotate_a2a_message(message, &forwarded.trace_id, &forwarded.result);
        Ok((forwarded, annotated))
    }
}
