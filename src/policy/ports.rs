//! Policy pack port.

use super::masking::MaskingRules;
use crate::registry::domain::{AgentIdentity, ComplianceScope, HandoffContract};
use crate::validation::domain::{HandoffRecord, Violation};
use serde_json::Value;
use thiserror::Error;

/// Errors a policy pack may return instead of violations.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum PolicyPackError {
    /// The pack could not evaluate the handoff.
    #[error("policy pack '{pack}' failed: {message}")]
    Evaluation {
        /// Failing pack.
        pack: String,
        /// Failure detail.
        message: String,
    },

    /// The pack was configured with an unusable setting.
    #[error("policy pack '{pack}' is misconfigured: {message}")]
    Configuration {
        /// Misconfigured pack.
        pack: String,
        /// Offending setting.
        message: String,
    },
}

/// Everything a pack may inspect for one handoff.
#[derive(Debug, Clone, Copy)]
pub struct PolicyContext<'a> {
    /// The handoff under validation.
    pub record: &'a HandoffRecord,
    /// Its governing contract.
    pub contract: &'a HandoffContract,
    /// The source identity, when registered.
    pub source: Option<&'a AgentIdentity>,
    /// The target identity, when registered.
    pub target: Option<&'a AgentIdentity>,
}

impl<'a> PolicyContext<'a> {
    /// Returns the payload.
    #[must_use]
    pub const fn payload(&self) -> &'a Value {
        self.record.payload()
    }

    /// Returns `true` when the target carries the data-domain tag.
    #[must_use]
    pub fn target_has_domain(&self, domain: &str) -> bool {
        self.target.is_some_and(|identity| identity.has_domain(domain))
    }
}

/// A bundle of domain-specific compliance rules.
///
/// Implementations must not keep mutable state between calls: the engine
/// evaluates packs concurrently across unrelated handoffs.
pub trait PolicyPack: Send + Sync {
    /// Stable pack name used in violations and logs.
    fn name(&self) -> &str;

    /// Compliance scopes this pack covers. An empty slice means the pack
    /// runs for every contract.
    fn scopes(&self) -> &[ComplianceScope];

    /// Evaluates one handoff.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyPackError`] when the pack cannot reach a decision.
    fn evaluate(&self, context: &PolicyContext<'_>) -> Result<Vec<Violation>, PolicyPackError>;

    /// Keys and value patterns this pack wants masked before persistence.
    fn masking_rules(&self) -> MaskingRules {
        MaskingRules::default()
    }
}
