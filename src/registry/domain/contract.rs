//! Handoff contract aggregate and its builder.

use super::{
    AgentName, AuthorityLevel, ComplianceScope, ContractMode, ContractName, DataClassification,
    FieldContract,
};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::{BTreeMap, BTreeSet};

/// Declarative rule set governing handoffs from `source` to `target`.
///
/// Contracts are built once with [`HandoffContract::builder`] and are
/// read-only afterwards.
///
/// # Examples
///
/// ```
/// use handoff_guard::registry::domain::{
///     AgentName, ContractMode, ContractName, FieldContract, FieldType, HandoffContract,
/// };
///
/// let contract = HandoffContract::builder(
///     ContractName::new("CTR-1").expect("valid name"),
///     AgentName::new("cs").expect("valid name"),
///     AgentName::new("research").expect("valid name"),
/// )
/// .mode(ContractMode::Block)
/// .field(
///     FieldContract::required("customer_id", FieldType::String)
///         .with_pattern(r"^CUST-\d{6}$")
///         .expect("valid pattern"),
/// )
/// .build();
///
/// assert_eq!(contract.fields().len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HandoffContract {
    name: ContractName,
    source: AgentName,
    target: AgentName,
    mode: ContractMode,
    description: Option<String>,
    fields: Vec<FieldContract>,
    nl_rules: Vec<String>,
    required_authority: AuthorityLevel,
    data_classification: Option<DataClassification>,
    allowed_actions: BTreeSet<String>,
    prohibited_actions: BTreeSet<String>,
    required_scopes: BTreeSet<ComplianceScope>,
    metadata: BTreeMap<String, Value>,
}

impl HandoffContract {
    /// Starts building a contract in `block` mode with no rules.
    #[must_use]
    pub const fn builder(
        name: ContractName,
        source: AgentName,
        target: AgentName,
    ) -> HandoffContractBuilder {
        HandoffContractBuilder {
            contract: Self {
                name,
                source,
                target,
                mode: ContractMode::Block,
                description: None,
                fields: Vec::new(),
                nl_rules: Vec::new(),
                required_authority: AuthorityLevel::ReadOnly,
                data_classification: None,
                allowed_actions: BTreeSet::new(),
                prohibited_actions: BTreeSet::new(),
                required_scopes: BTreeSet::new(),
                metadata: BTreeMap::new(),
            },
        }
    }

    /// Returns the contract name.
    #[must_use]
    pub const fn name(&self) -> &ContractName {
        &self.name
    }

    /// Returns the source agent.
    #[must_use]
    pub const fn source(&self) -> &AgentName {
        &self.source
    }

    /// Returns the target agent.
    #[must_use]
    pub const fn target(&self) -> &AgentName {
        &self.target
    }

    /// Returns the enforcement mode.
    #[must_use]
    pub const fn mode(&self) -> ContractMode {
        self.mode
    }

    /// Returns the free-text description.
    #[must_use]
    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    /// Returns the ordered field contracts.
    #[must_use]
    pub fn fields(&self) -> &[FieldContract] {
        &self.fields
    }

    /// Returns the natural-language rules routed to the judge.
    #[must_use]
    pub fn nl_rules(&self) -> &[String] {
        &self.nl_rules
    }

    /// Returns the authority the target must hold.
    #[must_use]
    pub const fn required_authority(&self) -> AuthorityLevel {
        self.required_authority
    }

    /// Returns the classification both agents must be cleared for.
    #[must_use]
    pub const fn data_classification(&self) -> Option<DataClassification> {
        self.data_classification
    }

    /// Returns the allowed actions; empty means unrestricted.
    #[must_use]
    pub const fn allowed_actions(&self) -> &BTreeSet<String> {
        &self.allowed_actions
    }

    /// Returns the prohibited actions.
    #[must_use]
    pub const fn prohibited_actions(&self) -> &BTreeSet<String> {
        &self.prohibited_actions
    }

    /// Returns the compliance scopes the contract requires.
    #[must_use]
    pub const fn required_scopes(&self) -> &BTreeSet<ComplianceScope> {
        &self.required_scopes
    }

    /// Returns `true` when the contract requires the named regime.
    #[must_use]
    pub fn requires_scope(&self, name: &str) -> bool {
        self.required_scopes.iter().any(|scope| scope.is(name))
    }

    /// Returns free-form metadata.
    #[must_use]
    pub const fn metadata(&self) -> &BTreeMap<String, Value> {
        &self.metadata
    }
}

/// Builder for [`HandoffContract`].
#[derive(Debug, Clone)]
#[must_use]
pub struct HandoffContractBuilder {
    contract: HandoffContract,
}

impl HandoffContractBuilder {
    /// Sets the enforcement mode.
    pub const fn mode(mut self, mode: ContractMode) -> Self {
        self.contract.mode = mode;
        self
    }

    /// Sets a description.
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.contract.description = Some(description.into());
        self
    }

    /// Appends a field contract.
    pub fn field(mut self, field: FieldContract) -> Self {
        self.contract.fields.push(field);
        self
    }

    /// Appends several field contracts in order.
    pub fn fields(mut self, fields: impl IntoIterator<Item = FieldContract>) -> Self {
        self.contract.fields.extend(fields);
        self
    }

    /// Appends a natural-language rule.
    pub fn nl_rule(mut self, rule: impl Into<String>) -> Self {
        self.contract.nl_rules.push(rule.into());
        self
    }

    /// Sets the authority the target must hold.
    pub const fn required_authority(mut self, level: AuthorityLevel) -> Self {
        self.contract.required_authority = level;
        self
    }

    /// Sets the classification both agents must be cleared for.
    pub const fn data_classification(mut self, classification: DataClassification) -> Self {
        self.contract.data_classification = Some(classification);
        self
    }

    /// Adds allowed actions.
    pub fn allow_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contract
            .allowed_actions
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Adds prohibited actions.
    pub fn prohibit_actions<I, S>(mut self, actions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.contract
            .prohibited_actions
            .extend(actions.into_iter().map(Into::into));
        self
    }

    /// Adds required compliance scopes.
    pub fn require_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<ComplianceScope>,
    {
        self.contract
            .required_scopes
            .extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Adds a metadata entry.
    pub fn metadata(mut self, key: impl Into<String>, value: Value) -> Self {
        self.contract.metadata.insert(key.into(), value);
        self
    }

    /// Finishes the contract.
    #[must_use]
    pub fn build(self) -> HandoffContract {
        self.contract
    }
}
