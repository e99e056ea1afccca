//! A single detected problem with a handoff.

use super::{Evidence, Rule, Severity};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Which part of the pipeline raised a violation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationOrigin {
    /// Contract resolution.
    Contract,
    /// Field contract checks.
    Schema,
    /// Authority checks.
    Authority,
    /// A policy pack.
    Policy,
    /// The natural-language judge.
    Judge,
}

impl ViolationOrigin {
    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Contract => "contract",
            Self::Schema => "schema",
            Self::Authority => "authority",
            Self::Policy => "policy",
            Self::Judge => "judge",
        }
    }
}

/// One rule failure.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Violation {
    rule_id: String,
    rule: String,
    severity: Severity,
    origin: ViolationOrigin,
    message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    field: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pack: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    evidence: Option<Evidence>,
}

impl Violation {
    /// Creates a violation of a declared rule.
    #[must_use]
    pub fn new(rule: &Rule, origin: ViolationOrigin, message: impl Into<String>) -> Self {
        Self::custom(rule.id, rule.name, rule.severity, origin, message)
    }

    /// Creates a violation whose rule is only known at runtime.
    #[must_use]
    pub fn custom(
        rule_id: impl Into<String>,
        rule: impl Into<String>,
        severity: Severity,
        origin: ViolationOrigin,
        message: impl Into<String>,
    ) -> Self {
        Self {
            rule_id: rule_id.into(),
            rule: rule.into(),
            severity,
            origin,
            message: message.into(),
            field: None,
            pack: None,
            evidence: None,
        }
    }

    /// Names the offending field.
    #[must_use]
    pub fn with_field(mut self, field: impl Into<String>) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Names the policy pack that raised the violation.
    #[must_use]
    pub fn with_pack(mut self, pack: impl Into<String>) -> Self {
        self.pack = Some(pack.into());
        self
    }

    /// Attaches evidence.
    #[must_use]
    pub fn with_evidence(mut self, evidence: impl Into<Evidence>) -> Self {
        self.evidence = Some(evidence.into());
        self
    }

    /// Returns the stable rule identifier.
    #[must_use]
    pub fn rule_id(&self) -> &str {
        &self.rule_id
    }

    /// Returns the rule name.
    #[must_use]
    pub fn rule(&self) -> &str {
        &self.rule
    }

    /// Returns the severity.
    #[must_use]
    pub const fn severity(&self) -> Severity {
        self.severity
    }

    /// Returns where the violation was raised.
    #[must_use]
    pub const fn origin(&self) -> ViolationOrigin {
        self.origin
    }

    /// Returns the human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the offending field, if any.
    #[must_use]
    pub fn field(&self) -> Option<&str> {
        self.field.as_deref()
    }

    /// Returns the policy pack name, if any.
    #[must_use]
    pub fn pack(&self) -> Option<&str> {
        self.pack.as_deref()
    }

    /// Returns the evidence, if any.
    #[must_use]
    pub const fn evidence(&self) -> Option<&Evidence> {
        self.evidence.as_ref()
    }

    /// Returns `true` when this violation is of `rule`.
    #[must_use]
    pub fn is(&self, rule: &Rule) -> bool {
        self.rule_id == rule.id
    }
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {} ({}): {}", self.severity, self.rule_id, self.rule, self.message)
    }
}
