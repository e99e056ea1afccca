//! Stable rule identifiers.

use super::Severity;

/// A rule's stable identifier, name and default severity.
///
/// Identifiers follow `{CATEGORY}-{NUM}` so audit reports can be keyed by
/// rule across releases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rule {
    /// Stable identifier, e.g. `SCHEMA-003`.
    pub id: &'static str,
    /// Machine-readable name, e.g. `pattern_mismatch`.
    pub name: &'static str,
    /// Severity of violations raised by this rule.
    pub severity: Severity,
}

impl Rule {
    /// Declares a rule.
    #[must_use]
    pub const fn new(id: &'static str, name: &'static str, severity: Severity) -> Self {
        Self { id, name, severity }
    }
}

/// Rules raised by the core stages.
pub mod rules {
    use super::{Rule, Severity};

    /// No contract governs the handoff.
    pub const CONTRACT_VIOLATION: Rule =
        Rule::new("CONTRACT-001", "CONTRACT_VIOLATION", Severity::Critical);

    /// A required field is absent.
    pub const MISSING_REQUIRED_FIELD: Rule =
        Rule::new("SCHEMA-001", "missing_required_field", Severity::Critical);
    /// A field has the wrong JSON type.
    pub const TYPE_MISMATCH: Rule = Rule::new("SCHEMA-002", "type_mismatch", Severity::High);
    /// A field does not match its pattern.
    pub const PATTERN_MISMATCH: Rule = Rule::new("SCHEMA-003", "pattern_mismatch", Severity::High);
    /// A field is outside its enumeration.
    pub const INVALID_ENUM_VALUE: Rule =
        Rule::new("SCHEMA-004", "invalid_enum_value", Severity::High);
    /// A numeric field is outside its range.
    pub const OUT_OF_RANGE: Rule = Rule::new("SCHEMA-005", "out_of_range", Severity::High);
    /// A field is longer than allowed.
    pub const EXCEEDS_MAX_LENGTH: Rule =
        Rule::new("SCHEMA-006", "exceeds_max_length", Severity::Medium);

    /// The source or target is not registered.
    pub const UNREGISTERED_AGENT: Rule =
        Rule::new("AUTH-001", "unregistered_agent", Severity::Critical);
    /// The target's authority is below the requirement.
    pub const INSUFFICIENT_AUTHORITY: Rule =
        Rule::new("AUTH-002", "insufficient_authority", Severity::Critical);
    /// An agent is not cleared for the data classification.
    pub const CLEARANCE_VIOLATION: Rule =
        Rule::new("AUTH-003", "clearance_violation", Severity::Critical);
    /// The requested action is not permitted.
    pub const PROHIBITED_ACTION: Rule =
        Rule::new("AUTH-004", "prohibited_action", Severity::Critical);
    /// Required compliance scopes are not shared by both agents.
    pub const COMPLIANCE_SCOPE_GAP: Rule =
        Rule::new("AUTH-005", "compliance_scope_gap", Severity::High);
    /// A numeric field exceeds an agent's limit.
    pub const AMOUNT_EXCEEDS_LIMIT: Rule =
        Rule::new("AUTH-006", "amount_exceeds_limit", Severity::Critical);

    /// A policy pack failed to evaluate.
    pub const POLICY_PACK_FAILURE: Rule =
        Rule::new("POLICY-001", "policy_pack_failure", Severity::Critical);
}
