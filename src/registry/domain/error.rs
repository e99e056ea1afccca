//! Error types for registry construction and registration.

use super::{AgentName, ContractName};
use thiserror::Error;

/// Errors returned by registry registration calls.
///
/// A registration error is local to the failing call: the registry is left
/// exactly as it was before the call.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum RegistrationError {
    /// An agent with the same name is already registered.
    #[error("agent '{0}' is already registered")]
    DuplicateAgent(AgentName),

    /// A contract references an agent that has not been registered.
    #[error("contract '{contract}' references unknown agent '{agent}'")]
    UnknownAgent {
        /// Contract being registered.
        contract: ContractName,
        /// The missing agent.
        agent: AgentName,
    },

    /// A contract with the same name is already registered.
    #[error("contract '{0}' is already registered")]
    DuplicateContract(ContractName),

    /// Re-registration targeted a name that is not registered.
    #[error("'{0}' is not registered and cannot be replaced")]
    NotRegistered(String),

    /// An agent or contract name failed validation.
    #[error("invalid name '{value}': {reason}")]
    InvalidName {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: &'static str,
    },
}

/// Errors raised while building a field contract.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ContractDefinitionError {
    /// The declared regular expression does not compile.
    #[error("field '{field}' has an invalid pattern: {message}")]
    InvalidPattern {
        /// Field carrying the pattern.
        field: String,
        /// Compiler message from the regex engine.
        message: String,
    },

    /// The declared numeric range has `min > max`.
    #[error("field '{field}' declares an empty range")]
    EmptyRange {
        /// Field carrying the range.
        field: String,
    },
}

/// Error returned while parsing an authority level, classification or mode.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
#[error("unknown {kind}: {value}")]
pub struct ParseLevelError {
    /// The enumeration being parsed.
    pub kind: &'static str,
    /// The rejected input.
    pub value: String,
}
