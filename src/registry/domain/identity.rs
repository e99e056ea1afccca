//! Registered agent identity.

use super::{AgentName, AuthorityLevel, ComplianceScope, DataClassification};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Immutable description of what an agent may see and do.
///
/// # Examples
///
/// ```
/// use handoff_guard::registry::domain::{AgentIdentity, AgentName, AuthorityLevel};
///
/// let name = AgentName::new("trader").expect("valid name");
/// let trader = AgentIdentity::new(name, AuthorityLevel::Execute)
///     .with_domains(["financial_records"])
///     .with_scopes(["SOX", "SEC"])
///     .with_limit("amount", 50_000.0);
///
/// assert!(trader.has_domain("financial_records"));
/// assert_eq!(trader.limit("amount"), Some(50_000.0));
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgentIdentity {
    name: AgentName,
    authority: AuthorityLevel,
    clearance: DataClassification,
    domains: BTreeSet<String>,
    scopes: BTreeSet<ComplianceScope>,
    limits: BTreeMap<String, f64>,
}

impl AgentIdentity {
    /// Creates an identity with no domains, scopes or limits and public
    /// clearance.
    #[must_use]
    pub const fn new(name: AgentName, authority: AuthorityLevel) -> Self {
        Self {
            name,
            authority,
            clearance: DataClassification::Public,
            domains: BTreeSet::new(),
            scopes: BTreeSet::new(),
            limits: BTreeMap::new(),
        }
    }

    /// Sets the highest data classification the agent may receive.
    #[must_use]
    pub const fn with_clearance(mut self, clearance: DataClassification) -> Self {
        self.clearance = clearance;
        self
    }

    /// Adds data-domain tags the agent may access.
    #[must_use]
    pub fn with_domains<I, S>(mut self, domains: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.domains.extend(domains.into_iter().map(Into::into));
        self
    }

    /// Adds compliance scopes the agent carries.
    #[must_use]
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ComplianceScope>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Declares a numeric ceiling for the payload field `field`.
    #[must_use]
    pub fn with_limit(mut self, field: impl Into<String>, max: f64) -> Self {
        self.limits.insert(field.into(), max);
        self
    }

    /// Returns the agent name.
    #[must_use]
    pub const fn name(&self) -> &AgentName {
        &self.name
    }

    /// Returns the authority level.
    #[must_use]
    pub const fn authority(&self) -> AuthorityLevel {
        self.authority
    }

    /// Returns the data clearance.
    #[must_use]
    pub const fn clearance(&self) -> DataClassification {
        self.clearance
    }

    /// Returns the data-domain tags.
    #[must_use]
    pub const fn domains(&self) -> &BTreeSet<String> {
        &self.domains
    }

    /// Returns `true` when the agent may access `domain`.
    #[must_use]
    pub fn has_domain(&self, domain: &str) -> bool {
        self.domains.contains(domain)
    }

    /// Returns the compliance scopes.
    #[must_use]
    pub const fn scopes(&self) -> &BTreeSet<ComplianceScope> {
        &self.scopes
    }

    /// Returns all declared numeric limits keyed by payload field.
    #[must_use]
    pub const fn limits(&self) -> &BTreeMap<String, f64> {
        &self.limits
    }

    /// Returns the limit declared for `field`, if any.
    #[must_use]
    pub fn limit(&self, field: &str) -> Option<f64> {
        self.limits.get(field).copied()
    }
}
