//! Audit entry and draft builders shared by audit tests.

use crate::audit::domain::{AuditDraft, AuditEntry, SequenceId};
use crate::policy::masking::DEFAULT_MASK_TOKEN;
use crate::policy::ports::PolicyPack;
use crate::policy::{FinancePolicyPack, PayloadMasker};
use crate::registry::domain::{AgentName, ComplianceScope, ContractMode, ContractName};
use crate::validation::domain::{
    HandoffRecord, Metadata, StageTimings, TraceId, ValidationResult, Verdict, Violation,
    ViolationOrigin, rules,
};
use chrono::{DateTime, TimeZone, Utc};
use serde_json::{Value, json};

pub fn agent(name: &str) -> AgentName {
    AgentName::new(name).expect("valid agent name")
}

pub fn at(hour: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0)
        .single()
        .expect("valid timestamp")
}

pub fn violations_for(verdict: Verdict) -> Vec<Violation> {
    match verdict {
        Verdict::Pass => Vec::new(),
        Verdict::Warn => vec![Violation::new(
            &rules::EXCEEDS_MAX_LENGTH,
            ViolationOrigin::Schema,
            "too long",
        )],
        Verdict::Fail => vec![
            Violation::new(&rules::PATTERN_MISMATCH, ViolationOrigin::Schema, "bad id"),
            Violation::new(&rules::EXCEEDS_MAX_LENGTH, ViolationOrigin::Schema, "too long"),
        ],
    }
}

/// A sealed entry with the given identity and outcome.
pub fn entry(sequence: u64, source: &str, target: &str, verdict: Verdict, hour: u32) -> AuditEntry {
    let violations = violations_for(verdict);
    AuditEntry {
        sequence_id: SequenceId::new(sequence),
        trace_id: TraceId::new(format!("trace-{sequence}")).expect("valid trace id"),
        source: agent(source),
        target: agent(target),
        contract: Some(ContractName::new("CTR-1").expect("valid contract name")),
        compliance_scopes: Vec::new(),
        mode: ContractMode::Block,
        verdict,
        blocked: verdict == Verdict::Fail,
        violations,
        timings: StageTimings {
            total_us: 100,
            ..StageTimings::default()
        },
        payload: json!({}),
        payload_hash: String::new(),
        metadata: Metadata::new(),
        handoff_at: at(hour),
        recorded_at: at(hour),
    }
}

pub fn with_scope(mut audit_entry: AuditEntry, scope: &str) -> AuditEntry {
    audit_entry.compliance_scopes.push(ComplianceScope::new(scope));
    audit_entry
}

pub fn masker() -> PayloadMasker {
    PayloadMasker::new(FinancePolicyPack::default().masking_rules(), DEFAULT_MASK_TOKEN)
}

/// A draft for an uncontracted handoff with the given verdict.
pub fn draft(payload: Value, verdict: Verdict) -> AuditDraft {
    let record = HandoffRecord::new(
        TraceId::generate(),
        agent("cs"),
        agent("research"),
        None,
        payload,
        at(9),
    );
    let result = ValidationResult::resolve(
        violations_for(verdict),
        StageTimings::default(),
        ContractMode::Block,
    );
    AuditDraft::capture(&record, &result, &masker())
}
