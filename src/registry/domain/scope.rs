//! Compliance scope tags.

use serde::{Deserialize, Serialize};
use std::fmt;

/// A regulatory regime an agent operates under or a contract requires.
///
/// Scopes form an open set; values are trimmed and upper-cased so `sox` and
/// `SOX` compare equal.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct ComplianceScope(String);

impl ComplianceScope {
    /// Sarbanes-Oxley.
    pub const SOX: &'static str = "SOX";
    /// Securities and Exchange Commission rules.
    pub const SEC: &'static str = "SEC";
    /// Financial Industry Regulatory Authority rules.
    pub const FINRA: &'static str = "FINRA";
    /// Payment Card Industry Data Security Standard.
    pub const PCI_DSS: &'static str = "PCI-DSS";

    /// Creates a normalized scope tag.
    #[must_use]
    pub fn new(value: impl AsRef<str>) -> Self {
        Self(value.as_ref().trim().to_ascii_uppercase())
    }

    /// Returns the scope as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when this scope is the named regime.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

impl From<String> for ComplianceScope {
    fn from(value: String) -> Self {
        Self::new(value)
    }
}

impl From<&str> for ComplianceScope {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<ComplianceScope> for String {
    fn from(value: ComplianceScope) -> Self {
        value.0
    }
}

impl fmt::Display for ComplianceScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
