//! Registry of agent identities and handoff contracts.

use super::coverage::CoverageMatrix;
use super::domain::{AgentIdentity, AgentName, ContractName, HandoffContract, RegistrationError};
use std::collections::{BTreeMap, HashMap};
use std::sync::{Arc, PoisonError, RwLock};

type Pair = (AgentName, AgentName);

/// Immutable view of the registry at one point in time.
///
/// Validation reads a snapshot once per handoff so a concurrent registration
/// never changes the identities or contract a validation is working with.
#[derive(Debug, Clone, Default)]
pub struct RegistrySnapshot {
    agents: BTreeMap<AgentName, Arc<AgentIdentity>>,
    contracts: BTreeMap<ContractName, Arc<HandoffContract>>,
    pair_index: HashMap<Pair, Arc<HandoffContract>>,
    registration_order: Vec<ContractName>,
}

impl RegistrySnapshot {
    /// Returns the identity registered under `name`.
    #[must_use]
    pub fn agent(&self, name: &AgentName) -> Option<Arc<AgentIdentity>> {
        self.agents.get(name).cloned()
    }

    /// Returns the contract registered under `name`.
    #[must_use]
    pub fn contract(&self, name: &ContractName) -> Option<Arc<HandoffContract>> {
        self.contracts.get(name).cloned()
    }

    /// Returns the active contract for `(source, target)`.
    ///
    /// When several contracts share the pair, the most recently registered
    /// one is active.
    #[must_use]
    pub fn get_contract(
        &self,
        source: &AgentName,
        target: &AgentName,
    ) -> Option<Arc<HandoffContract>> {
        self.pair_index
            .get(&(source.clone(), target.clone()))
            .cloned()
    }

    /// Returns every contract for `(source, target)`, newest first.
    #[must_use]
    pub fn contracts_for_pair(
        &self,
        source: &AgentName,
        target: &AgentName,
    ) -> Vec<Arc<HandoffContract>> {
        self.registration_order
            .iter()
            .rev()
            .filter_map(|name| self.contracts.get(name))
            .filter(|contract| contract.source() == source && contract.target() == target)
            .cloned()
            .collect()
    }

    /// Returns all identities sorted by name.
    #[must_use]
    pub fn agents(&self) -> Vec<Arc<AgentIdentity>> {
        self.agents.values().cloned().collect()
    }

    /// Returns all contracts sorted by name.
    #[must_use]
    pub fn contracts(&self) -> Vec<Arc<HandoffContract>> {
        self.contracts.values().cloned().collect()
    }

    /// Computes the coverage matrix over every registered agent pair.
    #[must_use]
    pub fn coverage(&self) -> CoverageMatrix {
        CoverageMatrix::build(self.agents.keys().cloned().collect(), |source, target| {
            self.pair_index
                .contains_key(&(source.clone(), target.clone()))
        })
    }

    fn check_endpoints(&self, contract: &HandoffContract) -> Result<(), RegistrationError> {
        for agent in [contract.source(), contract.target()] {
            if !self.agents.contains_key(agent) {
                return Err(RegistrationError::UnknownAgent {
                    contract: contract.name().clone(),
                    agent: agent.clone(),
                });
            }
        }
        Ok(())
    }

    fn insert_contract(&mut self, contract: Arc<HandoffContract>) {
        let name = contract.name().clone();
        self.registration_order.retain(|existing| existing != &name);
        self.registration_order.push(name.clone());
        if let Some(previous) = self.contracts.insert(name, Arc::clone(&contract)) {
            self.reindex_pair(previous.source(), previous.target());
        }
        self.pair_index.insert(
            (contract.source().clone(), contract.target().clone()),
            contract,
        );
    }

    fn reindex_pair(&mut self, source: &AgentName, target: &AgentName) {
        let pair = (source.clone(), target.clone());
        match self.contracts_for_pair(source, target).into_iter().next() {
            Some(latest) => {
                self.pair_index.insert(pair, latest);
            }
            None => {
                self.pair_index.remove(&pair);
            }
        }
    }
}

/// Process-wide owner of identities and contracts.
///
/// Reads clone an `Arc` to the current [`RegistrySnapshot`]; registration
/// builds a new snapshot and swaps it in under the write lock. Writes are
/// expected only at setup or explicit re-registration time.
#[derive(Debug, Default)]
pub struct ContractRegistry {
    current: RwLock<Arc<RegistrySnapshot>>,
}

impl ContractRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the current snapshot.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RegistrySnapshot> {
        let guard = self.current.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&guard)
    }

    fn update<T>(
        &self,
        apply: impl FnOnce(&mut RegistrySnapshot) -> Result<T, RegistrationError>,
    ) -> Result<T, RegistrationError> {
        let mut guard = self.current.write().unwrap_or_else(PoisonError::into_inner);
        let mut next = RegistrySnapshot::clone(&guard);
        let outcome = apply(&mut next)?;
        *guard = Arc::new(next);
        Ok(outcome)
    }

    /// Registers a new agent identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::DuplicateAgent`] if the name is taken.
    pub fn register_agent(&self, identity: AgentIdentity) -> Result<(), RegistrationError> {
        self.update(|snapshot| {
            if snapshot.agents.contains_key(identity.name()) {
                return Err(RegistrationError::DuplicateAgent(identity.name().clone()));
            }
            tracing::info!(agent = %identity.name(), authority = %identity.authority(), "registered agent");
            snapshot
                .agents
                .insert(identity.name().clone(), Arc::new(identity));
            Ok(())
        })
    }

    /// Replaces an already registered identity.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotRegistered`] if no agent has the name.
    pub fn reregister_agent(&self, identity: AgentIdentity) -> Result<(), RegistrationError> {
        self.update(|snapshot| {
            if !snapshot.agents.contains_key(identity.name()) {
                return Err(RegistrationError::NotRegistered(
                    identity.name().to_string(),
                ));
            }
            tracing::info!(agent = %identity.name(), "re-registered agent");
            snapshot
                .agents
                .insert(identity.name().clone(), Arc::new(identity));
            Ok(())
        })
    }

    /// Registers a new contract and makes it active for its pair.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::UnknownAgent`] if the source or target is
    /// not registered, or [`RegistrationError::DuplicateContract`] if the name
    /// is taken.
    pub fn register_contract(
        &self,
        contract: HandoffContract,
    ) -> Result<Arc<HandoffContract>, RegistrationError> {
        self.update(|snapshot| {
            snapshot.check_endpoints(&contract)?;
            if snapshot.contracts.contains_key(contract.name()) {
                return Err(RegistrationError::DuplicateContract(
                    contract.name().clone(),
                ));
            }
            tracing::info!(
                contract = %contract.name(),
                source = %contract.source(),
                target = %contract.target(),
                mode = %contract.mode(),
                "registered contract"
            );
            let shared = Arc::new(contract);
            snapshot.insert_contract(Arc::clone(&shared));
            Ok(shared)
        })
    }

    /// Replaces an already registered contract and makes it active for its
    /// pair.
    ///
    /// # Errors
    ///
    /// Returns [`RegistrationError::NotRegistered`] if no contract has the
    /// name, or [`RegistrationError::UnknownAgent`] if the new endpoints are
    /// not registered.
    pub fn reregister_contract(
        &self,
        contract: HandoffContract,
    ) -> Result<Arc<HandoffContract>, RegistrationError> {
        self.update(|snapshot| {
            if !snapshot.contracts.contains_key(contract.name()) {
                return Err(RegistrationError::NotRegistered(
                    contract.name().to_string(),
                ));
            }
            snapshot.check_endpoints(&contract)?;
            tracing::info!(contract = %contract.name(), "re-registered contract");
            let shared = Arc::new(contract);
            snapshot.insert_contract(Arc::clone(&shared));
            Ok(shared)
        })
    }

    /// Returns the active contract for `(source, target)`.
    #[must_use]
    pub fn get_contract(
        &self,
        source: &AgentName,
        target: &AgentName,
    ) -> Option<Arc<HandoffContract>> {
        self.snapshot().get_contract(source, target)
    }

    /// Returns the identity registered under `name`.
    #[must_use]
    pub fn agent(&self, name: &AgentName) -> Option<Arc<AgentIdentity>> {
        self.snapshot().agent(name)
    }

    /// Returns the contract registered under `name`.
    #[must_use]
    pub fn contract(&self, name: &ContractName) -> Option<Arc<HandoffContract>> {
        self.snapshot().contract(name)
    }

    /// Returns the coverage matrix for the current snapshot.
    #[must_use]
    pub fn coverage(&self) -> CoverageMatrix {
        self.snapshot().coverage()
    }
}
