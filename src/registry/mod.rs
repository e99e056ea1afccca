//! Agent identities and handoff contracts.
//!
//! The registry is the single owned source of truth that the validation
//! engine and the guard consult. It follows the same split as the other
//! contexts:
//!
//! - Domain types in [`domain`]
//! - The pair coverage view in [`coverage`]
//! - The snapshot-based [`ContractRegistry`] in [`service`]

pub mod coverage;
pub mod domain;
pub mod service;

pub use coverage::{CoverageMatrix, CoverageStatus};
pub use service::{ContractRegistry, RegistrySnapshot};

#[cfg(test)]
mod tests;
