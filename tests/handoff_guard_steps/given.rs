//! Given steps for handoff guard BDD scenarios.

use super::world::GuardWorld;
use eyre::WrapErr;
use handoff_guard::config::GuardConfig;
use handoff_guard::registry::domain::{
    AgentIdentity, AgentName, AuthorityLevel, ContractName, FieldContract, FieldType,
    HandoffContract,
};
use rstest_bdd_macros::given;

#[given("the support and trading agents are registered")]
fn agents_registered(world: &mut GuardWorld) -> Result<(), eyre::Report> {
    let registry = &world.registry;
    let name = |value: &str| AgentName::new(value);

    registry.register_agent(AgentIdentity::new(name("cs")?, AuthorityLevel::ReadWrite))?;
    registry.register_agent(AgentIdentity::new(name("research")?, AuthorityLevel::ReadOnly))?;
    registry.register_agent(
        AgentIdentity::new(name("desk")?, AuthorityLevel::Execute)
            .with_domains(["financial_records", "pii"])
            .with_scopes(["FINRA"]),
    )?;
    registry.register_agent(
        AgentIdentity::new(name("analyst")?, AuthorityLevel::ReadOnly)
            .with_domains(["financial_records"])
            .with_scopes(["FINRA"]),
    )?;

    registry
        .register_contract(
            HandoffContract::builder(ContractName::new("CTR-1")?, name("cs")?, name("research")?)
                .field(
                    FieldContract::required("customer_id", FieldType::String)
                        .with_pattern(r"^CUST-\d{6}$")?,
                )
                .build(),
        )
        .wrap_err("register CTR-1")?;
    registry
        .register_contract(
            HandoffContract::builder(ContractName::new("FIN-1")?, name("desk")?, name("analyst")?)
                .require_scopes(["FINRA"])
                .build(),
        )
        .wrap_err("register FIN-1")?;
    Ok(())
}

#[given("the guard treats uncovered handoffs as warnings")]
fn lenient_guard(world: &mut GuardWorld) -> Result<(), eyre::Report> {
    if world.guard.is_some() {
        return Err(eyre::eyre!("guard already built; configure it first"));
    }
    world.config = GuardConfig::lenient();
    Ok(())
}
