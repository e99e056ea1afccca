//! Guard inputs and outputs.

use crate::audit::domain::SequenceId;
use crate::registry::domain::AgentName;
use crate::validation::domain::{Metadata, TraceId, ValidationResult};
use serde_json::Value;

/// A handoff captured at the call boundary.
#[derive(Debug, Clone, PartialEq)]
pub struct HandoffRequest {
    source: AgentName,
    target: AgentName,
    payload: Value,
    metadata: Metadata,
    trace_id: Option<TraceId>,
}

impl HandoffRequest {
    /// Creates a request with empty metadata and a generated trace id.
    #[must_use]
    pub fn new(source: AgentName, target: AgentName, payload: Value) -> Self {
        Self {
            source,
            target,
            payload,
            metadata: Metadata::new(),
            trace_id: None,
        }
    }

    /// Attaches caller metadata.
    #[must_use]
    pub fn with_metadata(mut self, metadata: Metadata) -> Self {
        self.metadata = metadata;
        self
    }

    /// Uses a caller-supplied trace id instead of generating one.
    #[must_use]
    pub fn with_trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Returns the handing-off agent.
    #[must_use]
    pub const fn source(&self) -> &AgentName {
        &self.source
    }

    /// Returns the receiving agent.
    #[must_use]
    pub const fn target(&self) -> &AgentName {
        &self.target
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

    pub(crate) fn into_parts(self) -> (AgentName, AgentName, Value, Metadata, TraceId) {
        (
            self.source,
            self.target,
            self.payload,
            self.metadata,
            self.trace_id.unwrap_or_else(TraceId::generate),
        )
    }
}

/// A handoff the guard let through.
///
/// The payload is the caller's original, unmasked value. The result may
/// still carry violations when the contract only warns.
#[derive(Debug, Clone, PartialEq)]
pub struct ForwardedHandoff {
    /// Payload to deliver to the target.
    pub payload: Value,
    /// Validation outcome.
    pub result: ValidationResult,
    /// Audit entry recorded for the handoff.
    pub sequence_id: SequenceId,
    /// Trace id of the handoff.
    pub trace_id: TraceId,
}
