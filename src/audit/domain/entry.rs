//! The durable record of one validation decision.

use crate::policy::PayloadMasker;
use crate::registry::domain::{AgentName, ComplianceScope, ContractMode, ContractName};
use crate::validation::domain::{
    HandoffRecord, Metadata, StageTimings, TraceId, ValidationResult, Verdict, Violation,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::fmt;

/// Monotonic position of an entry in the audit log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SequenceId(u64);

impl SequenceId {
    /// Wraps a raw sequence number.
    #[must_use]
    pub const fn new(value: u64) -> Self {
        Self(value)
    }

    /// Returns the raw sequence number.
    #[must_use]
    pub const fn value(self) -> u64 {
        self.0
    }

    /// Returns the following sequence id.
    #[must_use]
    pub const fn next(self) -> Self {
        Self(self.0.saturating_add(1))
    }
}

impl fmt::Display for SequenceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Hex SHA-256 of the canonical JSON rendering of `payload`.
///
/// Object keys are already sorted in `serde_json`'s default map, so equal
/// payloads always hash equally.
#[must_use]
pub fn payload_hash(payload: &Value) -> String {
    Sha256::digest(payload.to_string().as_bytes())
        .iter()
        .map(|byte| format!("{byte:02x}"))
        .collect()
}

/// An audit entry before the logger assigns its sequence id.
///
/// Payload and metadata are already masked.
#[derive(Debug, Clone, PartialEq)]
pub struct AuditDraft {
    record: HandoffRecord,
    result: ValidationResult,
    masked_payload: Value,
    masked_metadata: Metadata,
    payload_hash: String,
}

impl AuditDraft {
    /// Captures a validated handoff, masking its payload and metadata.
    #[must_use]
    pub fn capture(record: &HandoffRecord, result: &ValidationResult, masker: &PayloadMasker) -> Self {
        Self {
            record: record.clone(),
            result: result.clone(),
            masked_payload: masker.mask(record.payload()),
            masked_metadata: masker.mask_map(record.metadata()),
            payload_hash: payload_hash(record.payload()),
        }
    }

    /// Returns the captured handoff.
    #[must_use]
    pub const fn record(&self) -> &HandoffRecord {
        &self.record
    }

    /// Seals the draft into an entry.
    #[must_use]
    pub fn into_entry(self, sequence_id: SequenceId, recorded_at: DateTime<Utc>) -> AuditEntry {
        let contract = self.record.contract();
        AuditEntry {
            sequence_id,
            trace_id: self.record.trace_id().clone(),
            source: self.record.source().clone(),
            target: self.record.target().clone(),
            contract: contract.map(|governing| governing.name().clone()),
            compliance_scopes: contract
                .map(|governing| governing.required_scopes().iter().cloned().collect())
                .unwrap_or_default(),
            mode: self.result.mode(),
            verdict: self.result.verdict(),
            blocked: self.result.is_blocked(),
            violations: self.result.violations().to_vec(),
            timings: *self.result.timings(),
            payload: self.masked_payload,
            payload_hash: self.payload_hash,
            metadata: self.masked_metadata,
            handoff_at: self.record.timestamp(),
            recorded_at,
        }
    }
}

/// Immutable, persisted record of one validation decision.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuditEntry {
    /// Position in the audit log.
    pub sequence_id: SequenceId,
    /// Trace id of the handoff.
    pub trace_id: TraceId,
    /// Handing-off agent.
    pub source: AgentName,
    /// Receiving agent.
    pub target: AgentName,
    /// Governing contract, if any.
    pub contract: Option<ContractName>,
    /// Scopes the governing contract required.
    pub compliance_scopes: Vec<ComplianceScope>,
    /// Effective enforcement mode.
    pub mode: ContractMode,
    /// Verdict.
    pub verdict: Verdict,
    /// Whether the payload was withheld.
    pub blocked: bool,
    /// Every violation, in detection order.
    pub violations: Vec<Violation>,
    /// Stage timings.
    pub timings: StageTimings,
    /// Masked payload.
    pub payload: Value,
    /// SHA-256 of the unmasked payload.
    pub payload_hash: String,
    /// Masked caller metadata.
    pub metadata: Metadata,
    /// When the handoff was attempted.
    pub handoff_at: DateTime<Utc>,
    /// When the entry was sequenced.
    pub recorded_at: DateTime<Utc>,
}

impl AuditEntry {
    /// Returns `true` for a PASS verdict.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Returns the total validation time in microseconds.
    #[must_use]
    pub const fn duration_us(&self) -> u64 {
        self.timings.total_us
    }
}
