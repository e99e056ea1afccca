//! Shared test helpers for in-memory guard integration tests.

use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::config::GuardConfig;
use handoff_guard::guard::{HandoffGuard, HandoffRequest};
use handoff_guard::policy::FinancePolicyPack;
use handoff_guard::registry::ContractRegistry;
use handoff_guard::registry::domain::{
    AgentIdentity, AgentName, AuthorityLevel, ContractName, FieldContract, FieldType,
    HandoffContract, RegistrationError,
};
use handoff_guard::validation::ValidationEngine;
use mockable::DefaultClock;
use rstest::fixture;
use serde_json::Value;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// Boxed error used by integration tests.
pub type TestResult<T = ()> = Result<T, Box<dyn std::error::Error + Send + Sync>>;

/// Guard type used by integration tests.
pub type TestGuard = HandoffGuard<DefaultClock>;

/// Provides a tokio runtime for async operations in tests.
///
/// # Errors
///
/// Returns an error if the runtime cannot be created.
#[fixture]
pub fn runtime() -> io::Result<Runtime> {
    tokio::runtime::Builder::new_multi_thread()
        .worker_threads(2)
        .enable_all()
        .build()
}

/// Provides a fresh in-memory audit store for each test.
#[fixture]
pub fn store() -> InMemoryAuditStore {
    InMemoryAuditStore::new()
}

/// Parses an agent name.
///
/// # Errors
///
/// Returns an error if the name is invalid.
pub fn agent(name: &str) -> Result<AgentName, RegistrationError> {
    AgentName::new(name)
}

/// Registry with the support desk pair and the trading desk pair.
///
/// * `cs` (read-write) -> `research` (read-only) under `CTR-1`, which
///   requires `customer_id` to match `^CUST-\d{6}$`.
/// * `desk` (execute) -> `analyst` (read-only, no PII domain) under `FIN-1`,
///   which requires the FINRA scope.
///
/// # Errors
///
/// Returns an error if any registration fails.
pub fn build_registry() -> TestResult<Arc<ContractRegistry>> {
    let registry = ContractRegistry::new();
    registry.register_agent(AgentIdentity::new(agent("cs")?, AuthorityLevel::ReadWrite))?;
    registry.register_agent(AgentIdentity::new(agent("research")?, AuthorityLevel::ReadOnly))?;
    registry.register_agent(
        AgentIdentity::new(agent("desk")?, AuthorityLevel::Execute)
            .with_domains(["financial_records", "pii"])
            .with_scopes(["FINRA"]),
    )?;
    registry.register_agent(
        AgentIdentity::new(agent("analyst")?, AuthorityLevel::ReadOnly)
            .with_domains(["financial_records"])
            .with_scopes(["FINRA"]),
    )?;

    registry.register_contract(
        HandoffContract::builder(ContractName::new("CTR-1")?, agent("cs")?, agent("research")?)
            .field(
                FieldContract::required("customer_id", FieldType::String)
                    .with_pattern(r"^CUST-\d{6}$")?,
            )
            .build(),
    )?;
    registry.register_contract(
        HandoffContract::builder(ContractName::new("FIN-1")?, agent("desk")?, agent("analyst")?)
            .require_scopes(["FINRA"])
            .build(),
    )?;
    Ok(Arc::new(registry))
}

/// Builds a guard with the finance pack over `registry`, spawning its
/// audit writer on `rt`.
///
/// # Errors
///
/// Returns an error if the audit store cannot be read.
pub fn build_guard(
    rt: &Runtime,
    registry: &Arc<ContractRegistry>,
    store: &InMemoryAuditStore,
    config: GuardConfig,
) -> TestResult<TestGuard> {
    let engine = ValidationEngine::new(Arc::clone(registry))
        .with_policy_pack(FinancePolicyPack::default());
    Ok(rt.block_on(HandoffGuard::new(
        engine,
        Arc::new(store.clone()),
        Arc::new(DefaultClock),
        config,
    ))?)
}

/// Builds a request between two named agents.
///
/// # Errors
///
/// Returns an error if either name is invalid.
pub fn request(source: &str, target: &str, payload: Value) -> TestResult<HandoffRequest> {
    Ok(HandoffRequest::new(agent(source)?, agent(target)?, payload))
}
