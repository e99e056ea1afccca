//! Ordered authority and classification tiers, and contract enforcement mode.

use super::ParseLevelError;
use serde::{Deserialize, Serialize};
use std::fmt;

fn normalize(value: &str) -> String {
    value.trim().to_ascii_lowercase().replace('-', "_")
}

/// Ordinal permission tier assigned to an agent.
///
/// Variants are declared in ascending order so the derived [`Ord`] is the
/// authority hierarchy: `ReadOnly < ReadWrite < Execute < Admin`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AuthorityLevel {
    /// May only read data handed to it.
    #[default]
    ReadOnly,
    /// May read and modify data.
    ReadWrite,
    /// May trigger side-effecting actions such as trades.
    Execute,
    /// Unrestricted.
    Admin,
}

impl AuthorityLevel {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ReadOnly => "read_only",
            Self::ReadWrite => "read_write",
            Self::Execute => "execute",
            Self::Admin => "admin",
        }
    }

    /// Returns `true` when this level dominates `required`.
    #[must_use]
    pub fn satisfies(self, required: Self) -> bool {
        self >= required
    }
}

impl fmt::Display for AuthorityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for AuthorityLevel {
    type Error = ParseLevelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "read_only" => Ok(Self::ReadOnly),
            "read_write" => Ok(Self::ReadWrite),
            "execute" => Ok(Self::Execute),
            "admin" => Ok(Self::Admin),
            _ => Err(ParseLevelError {
                kind: "authority level",
                value: value.to_owned(),
            }),
        }
    }
}

/// Sensitivity tier of data, doubling as an agent's clearance.
///
/// Ordered `Public < Internal < Confidential < Restricted`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataClassification {
    /// Safe to share with anyone.
    #[default]
    Public,
    /// Internal to the organisation.
    Internal,
    /// Restricted to need-to-know agents.
    Confidential,
    /// Highest sensitivity, e.g. regulated personal data.
    Restricted,
}

impl DataClassification {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Public => "public",
            Self::Internal => "internal",
            Self::Confidential => "confidential",
            Self::Restricted => "restricted",
        }
    }
}

impl fmt::Display for DataClassification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for DataClassification {
    type Error = ParseLevelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "public" => Ok(Self::Public),
            "internal" => Ok(Self::Internal),
            "confidential" => Ok(Self::Confidential),
            "restricted" => Ok(Self::Restricted),
            _ => Err(ParseLevelError {
                kind: "data classification",
                value: value.to_owned(),
            }),
        }
    }
}

/// What the guard does with a failing handoff.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ContractMode {
    /// Record violations but always forward the payload.
    Warn,
    /// Refuse to forward a payload whose verdict is FAIL.
    #[default]
    Block,
}

impl ContractMode {
    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Warn => "warn",
            Self::Block => "block",
        }
    }
}

impl fmt::Display for ContractMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for ContractMode {
    type Error = ParseLevelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match normalize(value).as_str() {
            "warn" => Ok(Self::Warn),
            "block" => Ok(Self::Block),
            _ => Err(ParseLevelError {
                kind: "contract mode",
                value: value.to_owned(),
            }),
        }
    }
}
