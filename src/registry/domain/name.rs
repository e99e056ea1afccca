//! Validated agent and contract names.

use super::RegistrationError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length for agent and contract names, matching the audit columns.
const MAX_NAME_LENGTH: usize = 100;

fn validate_name(value: String) -> Result<String, RegistrationError> {
    let trimmed = value.trim();
    if trimmed.is_empty() {
        return Err(RegistrationError::InvalidName {
            value,
            reason: "must not be empty",
        });
    }
    if trimmed.chars().count() > MAX_NAME_LENGTH {
        return Err(RegistrationError::InvalidName {
            value,
            reason: "exceeds 100 characters",
        });
    }
    if trimmed.chars().any(char::is_whitespace) {
        return Err(RegistrationError::InvalidName {
            value,
            reason: "must not contain whitespace",
        });
    }
    Ok(trimmed.to_owned())
}

/// Unique name of a registered agent (e.g. `cs`, `research`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct AgentName(String);

impl AgentName {
    /// Creates a validated agent name.
    ///
    /// The input is trimmed; case is preserved.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidName`] when the value is empty,
    /// longer than 100 characters, or contains whitespace.
    pub fn new(value: impl Into<String>) -> Result<Self, RegistrationError> {
        validate_name(value.into()).map(Self)
    }

    /// Returns the agent name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

/// Unique name of a registered contract (e.g. `CTR-1`).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ContractName(String);

impl ContractName {
    /// Creates a validated contract name.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::InvalidName`] under the same rules as
    /// [`AgentName::new`].
    pub fn new(value: impl Into<String>) -> Result<Self, RegistrationError> {
        validate_name(value.into()).map(Self)
    }

    /// Returns the contract name as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

macro_rules! name_conversions {
    ($name:ident) => {
        impl TryFrom<String> for $name {
            type Error = RegistrationError;

            fn try_from(value: String) -> Result<Self, Self::Error> {
                Self::new(value)
            }
        }

        impl From<$name> for String {
            fn from(value: $name) -> Self {
                value.0
            }
        }

        impl AsRef<str> for $name {
            fn as_ref(&self) -> &str {
                self.as_str()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(&self.0)
            }
        }
    };
}

name_conversions!(AgentName);
name_conversions!(ContractName);
