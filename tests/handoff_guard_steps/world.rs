//! Shared world state for handoff guard BDD scenarios.

use std::sync::Arc;

use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::config::GuardConfig;
use handoff_guard::guard::{ForwardedHandoff, HandoffBlockedError, HandoffGuard, HandoffRequest};
use handoff_guard::policy::FinancePolicyPack;
use handoff_guard::registry::ContractRegistry;
use handoff_guard::registry::domain::AgentName;
use handoff_guard::validation::ValidationEngine;
use handoff_guard::validation::domain::{Metadata, ValidationResult};
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;

/// Guard type used by the BDD world.
pub type TestGuard = HandoffGuard<DefaultClock>;

/// Scenario world for handoff guard behaviour tests.
pub struct GuardWorld {
    /// Registry populated by the given steps.
    pub registry: Arc<ContractRegistry>,
    /// Audit store shared with the guard.
    pub store: InMemoryAuditStore,
    /// Guard configuration, fixed once the guard is built.
    pub config: GuardConfig,
    /// Guard under test, built on first use.
    pub guard: Option<TestGuard>,
    /// Outcome of the last handoff.
    pub last_outcome: Option<Result<ForwardedHandoff, HandoffBlockedError>>,
}

impl GuardWorld {
    /// Creates a world with an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self {
            registry: Arc::new(ContractRegistry::new()),
            store: InMemoryAuditStore::new(),
            config: GuardConfig::default(),
            guard: None,
            last_outcome: None,
        }
    }

    /// Returns the guard, building it with the finance pack if needed.
    ///
    /// Must be called from within a Tokio runtime.
    ///
    /// # Errors
    ///
    /// Returns an error if the audit store cannot be read.
    pub fn guard(&mut self) -> Result<&TestGuard, eyre::Report> {
        if self.guard.is_none() {
            let engine = ValidationEngine::new(Arc::clone(&self.registry))
                .with_policy_pack(FinancePolicyPack::default());
            let built = run_async(HandoffGuard::new(
                engine,
                Arc::new(self.store.clone()),
                Arc::new(DefaultClock),
                self.config.clone(),
            ))?;
            self.guard = Some(built);
        }
        self.guard
            .as_ref()
            .ok_or_else(|| eyre::eyre!("guard was not built"))
    }

    /// Validates one handoff and keeps its outcome.
    ///
    /// # Errors
    ///
    /// Returns an error if either agent name is invalid.
    pub fn send(
        &mut self,
        source: &str,
        target: &str,
        payload: Value,
        metadata: Metadata,
    ) -> Result<(), eyre::Report> {
        let request = HandoffRequest::new(AgentName::new(source)?, AgentName::new(target)?, payload)
            .with_metadata(metadata);
        let outcome = run_async(self.guard()?.validate(request));
        self.last_outcome = Some(outcome);
        Ok(())
    }

    /// Returns the validation result of the last handoff, forwarded or not.
    ///
    /// # Errors
    ///
    /// Returns an error if no handoff has been sent.
    pub fn last_result(&self) -> Result<&ValidationResult, eyre::Report> {
        match self.last_outcome.as_ref() {
            Some(Ok(forwarded)) => Ok(&forwarded.result),
            Some(Err(blocked)) => Ok(blocked.result()),
            None => Err(eyre::eyre!("no handoff sent in scenario world")),
        }
    }
}

impl Default for GuardWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> GuardWorld {
    GuardWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}
