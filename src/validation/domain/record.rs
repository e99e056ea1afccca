//! The handoff being validated.

use crate::registry::domain::{AgentName, HandoffContract};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::sync::Arc;
use thiserror::Error;
use uuid::Uuid;

/// Caller-supplied metadata accompanying a handoff.
pub type Metadata = Map<String, Value>;

/// Maximum trace id length, matching the audit column.
const MAX_TRACE_ID_LENGTH: usize = 100;

/// A caller-supplied trace id was rejected.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid trace id '{value}': {reason}")]
pub struct InvalidTraceId {
    /// The rejected value.
    pub value: String,
    /// Why it was rejected.
    pub reason: &'static str,
}

/// Correlates a handoff across agents and audit entries.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct TraceId(String);

impl TraceId {
    /// Generates a random trace id.
    #[must_use]
    pub fn generate() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Validates an externally supplied trace id.
    ///
    /// The input is trimmed.
    ///
    /// # Errors
    ///
    /// Returns [`InvalidTraceId`] when the value is empty, longer than 100
    /// characters, or contains whitespace.
    pub fn new(raw: impl Into<String>) -> Result<Self, InvalidTraceId> {
        let value = raw.into();
        let trimmed = value.trim();
        let reason = if trimmed.is_empty() {
            "must not be empty"
        } else if trimmed.chars().count() > MAX_TRACE_ID_LENGTH {
            "exceeds 100 characters"
        } else if trimmed.chars().any(char::is_whitespace) {
            "must not contain whitespace"
        } else {
            return Ok(Self(trimmed.to_owned()));
        };
        Err(InvalidTraceId { value, reason })
    }

    /// Returns the trace id as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for TraceId {
    type Error = InvalidTraceId;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<TraceId> for String {
    fn from(value: TraceId) -> Self {
        value.0
    }
}

impl fmt::Display for TraceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// One validation attempt. Never mutated after construction.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffRecord {
    trace_id: TraceId,
    source: AgentName,
    target: AgentName,
    contract: Option<Arc<HandoffContract>>,
    payload: Value,
    metadata: Metadata,
    timestamp: DateTime<Utc>,
}

impl HandoffRecord {
    /// Creates a record with empty metadata.
    #[must_use]
    pub fn new(
        trace_id: TraceId,
        source: AgentName,
        target: AgentName,
        contract: Option<Arc<HandoffContract>>,
        payload: Value,
        timestamp: DateTime<Utc>,
    ) -> Self {
        Self {
            trace_id,
            source,
            target,
            contract,
            payload,
            metadata: Metadata::new(),
            timestamp,
        }
    }

    /// Attaches caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Returns the trace id.
    #[must_use]
    pub const fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns the source agent.
    #[must_use]
    pub const fn source(&self) -> &AgentName {
        &self.source
    }

    /// Returns the target agent.
    #[must_use]
    pub const fn target(&self) -> &AgentName {
        &self.target
    }

    /// Returns the governing contract, if one was resolved.
    #[must_use]
    pub fn contract(&self) -> Option<&HandoffContract> {
        self.contract.as_deref()
    }

    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &Value {
        &self.payload
    }

    /// Returns the caller metadata.
    #[must_use]
    pub const fn metadata(&self) -> &Metadata {
        &self.metadata
    }

    /// Returns `true` when metadata `key` is the boolean `true`.
    #[must_use]
    pub fn metadata_flag(&self, key: &str) -> bool {
        matches!(self.metadata.get(key), Some(Value::Bool(true)))
    }

    /// Returns the creation timestamp.
    #[must_use]
    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    /// Consumes the record and returns its payload.
    #[must_use]
    pub fn into_payload(self) -> Value {
        self.payload
    }
}
