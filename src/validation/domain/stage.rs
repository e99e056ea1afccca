//! Validation state machine states.

use serde::{Deserialize, Serialize};
use std::fmt;

/// Progress of one validation through the engine.
///
/// Every validation visits each state in declaration order; no state is ever
/// skipped.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationStage {
    /// Created, nothing checked yet.
    Pending,
    /// Field contracts checked.
    SchemaChecked,
    /// Authority, clearance, scopes and limits checked.
    AuthorityChecked,
    /// Policy packs evaluated.
    PolicyChecked,
    /// Verdict computed.
    Resolved,
}

impl ValidationStage {
    /// Returns the state that follows this one, or `None` once resolved.
    #[must_use]
    pub const fn next(self) -> Option<Self> {
        match self {
            Self::Pending => Some(Self::SchemaChecked),
            Self::SchemaChecked => Some(Self::AuthorityChecked),
            Self::AuthorityChecked => Some(Self::PolicyChecked),
            Self::PolicyChecked => Some(Self::Resolved),
            Self::Resolved => None,
        }
    }

    /// Returns the canonical representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::SchemaChecked => "schema_checked",
            Self::AuthorityChecked => "authority_checked",
            Self::PolicyChecked => "policy_checked",
            Self::Resolved => "resolved",
        }
    }
}

impl fmt::Display for ValidationStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
