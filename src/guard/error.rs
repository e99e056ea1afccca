//! Blocking signal raised by the guard.

use crate::audit::domain::SequenceId;
use crate::registry::domain::AgentName;
use crate::validation::domain::{TraceId, ValidationResult};
use thiserror::Error;

/// A handoff refused because its verdict was FAIL under a blocking contract.
///
/// The audit entry is already recorded when this is returned.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("handoff {from_agent} -> {to_agent} blocked [{trace_id}]: {blocking_rules}")]
pub struct HandoffBlockedError {
    trace_id: TraceId,
    from_agent: AgentName,
    to_agent: AgentName,
    sequence_id: SequenceId,
    blocking_rules: String,
    result: Box<ValidationResult>,
}

impl HandoffBlockedError {
    pub(crate) fn new(
        trace_id: TraceId,
        from_agent: AgentName,
        to_agent: AgentName,
        sequence_id: SequenceId,
        result: ValidationResult,
    ) -> Self {
        let blocking_rules = result
            .failing_violations()
            .map(|violation| format!("{} {}", violation.rule_id(), violation.rule()))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            trace_id,
            from_agent,
            to_agent,
            sequence_id,
            blocking_rules,
            result: Box::new(result),
        }
    }

    /// Returns the trace id of the blocked handoff.
    #[must_use]
    pub const fn trace_id(&self) -> &TraceId {
        &self.trace_id
    }

    /// Returns the handing-off agent.
    #[must_use]
    pub const fn from_agent(&self) -> &AgentName {
        &self.from_agent
    }

    /// Returns the intended receiver.
    #[must_use]
    pub const fn to_agent(&self) -> &AgentName {
        &self.to_agent
    }

    /// Returns the audit entry recorded for the handoff.
    #[must_use]
    pub const fn sequence_id(&self) -> SequenceId {
        self.sequence_id
    }

    /// Returns the validation outcome.
    #[must_use]
    pub fn result(&self) -> &ValidationResult {
        &self.result
    }
}
