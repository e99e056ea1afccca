//! Audit log filters.

use super::AuditEntry;
use crate::registry::domain::{AgentName, ComplianceScope, ContractName};
use crate::validation::domain::{TraceId, Verdict};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Half-open time window `[start, end)`; either side may be open.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct TimeRange {
    /// Inclusive lower bound.
    pub start: Option<DateTime<Utc>>,
    /// Exclusive upper bound.
    pub end: Option<DateTime<Utc>>,
}

impl TimeRange {
    /// The unbounded window.
    #[must_use]
    pub const fn all() -> Self {
        Self {
            start: None,
            end: None,
        }
    }

    /// A window with both bounds.
    #[must_use]
    pub const fn between(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self {
            start: Some(start),
            end: Some(end),
        }
    }

    /// Returns `true` when `instant` lies in the window.
    #[must_use]
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.is_none_or(|start| instant >= start)
            && self.end.is_none_or(|end| instant < end)
    }
}

/// Filter over audit entries. Every unset field matches everything.
///
/// Results are ordered newest first.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
#[must_use]
pub struct AuditQuery {
    /// Source agent.
    pub source: Option<AgentName>,
    /// Target agent.
    pub target: Option<AgentName>,
    /// `true` for PASS verdicts only, `false` for WARN and FAIL.
    pub passed: Option<bool>,
    /// Exact verdict.
    pub verdict: Option<Verdict>,
    /// Blocked flag.
    pub blocked: Option<bool>,
    /// Governing contract.
    pub contract: Option<ContractName>,
    /// Required compliance scope.
    pub scope: Option<ComplianceScope>,
    /// Trace id.
    pub trace_id: Option<TraceId>,
    /// Window over the handoff timestamp.
    pub time_range: TimeRange,
    /// Maximum entries returned.
    pub limit: Option<usize>,
    /// Entries skipped before `limit` applies.
    pub offset: usize,
}

impl AuditQuery {
    /// Matches every entry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Filters by source agent.
    pub fn source(mut self, source: AgentName) -> Self {
        self.source = Some(source);
        self
    }

    /// Filters by target agent.
    pub fn target(mut self, target: AgentName) -> Self {
        self.target = Some(target);
        self
    }

    /// Filters by whether the verdict was PASS.
    pub const fn passed(mut self, passed: bool) -> Self {
        self.passed = Some(passed);
        self
    }

    /// Filters by verdict.
    pub const fn verdict(mut self, verdict: Verdict) -> Self {
        self.verdict = Some(verdict);
        self
    }

    /// Filters by the blocked flag.
    pub const fn blocked(mut self, blocked: bool) -> Self {
        self.blocked = Some(blocked);
        self
    }

    /// Filters by contract.
    pub fn contract(mut self, contract: ContractName) -> Self {
        self.contract = Some(contract);
        self
    }

    /// Filters by required compliance scope.
    pub fn scope(mut self, scope: ComplianceScope) -> Self {
        self.scope = Some(scope);
        self
    }

    /// Filters by trace id.
    pub fn trace_id(mut self, trace_id: TraceId) -> Self {
        self.trace_id = Some(trace_id);
        self
    }

    /// Restricts to a time window.
    pub const fn time_range(mut self, range: TimeRange) -> Self {
        self.time_range = range;
        self
    }

    /// Caps the number of results.
    pub const fn limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Skips the first `offset` results.
    pub const fn offset(mut self, offset: usize) -> Self {
        self.offset = offset;
        self
    }

    /// The same filters with no paging.
    pub fn unpaged(&self) -> Self {
        Self {
            limit: None,
            offset: 0,
            ..self.clone()
        }
    }

    /// Returns `true` when `entry` satisfies every filter.
    #[must_use]
    pub fn matches(&self, entry: &AuditEntry) -> bool {
        self.source.as_ref().is_none_or(|source| &entry.source == source)
            && self.target.as_ref().is_none_or(|target| &entry.target == target)
            && self.passed.is_none_or(|passed| entry.passed() == passed)
            && self.verdict.is_none_or(|verdict| entry.verdict == verdict)
            && self.blocked.is_none_or(|blocked| entry.blocked == blocked)
            && self
                .contract
                .as_ref()
                .is_none_or(|contract| entry.contract.as_ref() == Some(contract))
            && self
                .scope
                .as_ref()
                .is_none_or(|scope| entry.compliance_scopes.contains(scope))
            && self
                .trace_id
                .as_ref()
                .is_none_or(|trace_id| &entry.trace_id == trace_id)
            && self.time_range.contains(entry.handoff_at)
    }

    /// Filters, orders newest first and pages `entries`.
    #[must_use]
    pub fn apply(&self, entries: impl IntoIterator<Item = AuditEntry>) -> Vec<AuditEntry> {
        let mut selected: Vec<AuditEntry> = entries
            .into_iter()
            .filter(|entry| self.matches(entry))
            .collect();
        selected.sort_by(|left, right| right.sequence_id.cmp(&left.sequence_id));
        selected.dedup_by_key(|entry| entry.sequence_id);
        selected
            .into_iter()
            .skip(self.offset)
            .take(self.limit.unwrap_or(usize::MAX))
            .collect()
    }
}
