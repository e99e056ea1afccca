//! Domain model for agents and the contracts that govern their handoffs.
//!
//! Identities and contracts are immutable once built. Replacing one is an
//! explicit re-registration on [`crate::registry::ContractRegistry`].

mod authority;
mod contract;
mod error;
mod field;
mod identity;
mod name;
mod scope;

pub use authority::{AuthorityLevel, ContractMode, DataClassification};
pub use contract::{HandoffContract, HandoffContractBuilder};
pub use error::{ContractDefinitionError, ParseLevelError, RegistrationError};
pub use field::{FieldContract, FieldPattern, FieldType, NumericRange};
pub use identity::AgentIdentity;
pub use name::{AgentName, ContractName};
pub use scope::ComplianceScope;
