//! Then steps for handoff guard BDD scenarios.

use super::world::{GuardWorld, run_async};
use handoff_guard::audit::domain::AuditQuery;
use handoff_guard::policy::masking::DEFAULT_MASK_TOKEN;
use rstest_bdd_macros::then;
use serde_json::json;

#[then(r#"the handoff is forwarded with verdict "{verdict}""#)]
fn forwarded_with_verdict(world: &mut GuardWorld, verdict: String) -> Result<(), eyre::Report> {
    match world.last_outcome.as_ref() {
        Some(Ok(forwarded)) if forwarded.result.verdict().as_str() == verdict => Ok(()),
        Some(Ok(forwarded)) => Err(eyre::eyre!(
            "expected verdict {verdict}, got {}",
            forwarded.result.verdict()
        )),
        Some(Err(blocked)) => Err(eyre::eyre!("expected forwarding, got {blocked}")),
        None => Err(eyre::eyre!("no handoff sent in scenario world")),
    }
}

#[then("the handoff is blocked")]
fn handoff_blocked(world: &mut GuardWorld) -> Result<(), eyre::Report> {
    match world.last_outcome.as_ref() {
        Some(Err(_)) => Ok(()),
        Some(Ok(forwarded)) => Err(eyre::eyre!(
            "expected a block, handoff forwarded with verdict {}",
            forwarded.result.verdict()
        )),
        None => Err(eyre::eyre!("no handoff sent in scenario world")),
    }
}

#[then(r#"the result contains the violation "{rule}""#)]
fn result_contains(world: &mut GuardWorld, rule: String) -> Result<(), eyre::Report> {
    let result = world.last_result()?;
    if !result.has_rule(&rule) {
        return Err(eyre::eyre!(
            "expected violation {rule}, got {:?}",
            result
                .violations()
                .iter()
                .map(|violation| violation.rule())
                .collect::<Vec<_>>()
        ));
    }
    Ok(())
}

#[then("the result has {count:usize} violations")]
fn result_has_count(world: &mut GuardWorld, count: usize) -> Result<(), eyre::Report> {
    let found = world.last_result()?.violations().len();
    if found != count {
        return Err(eyre::eyre!("expected {count} violations, found {found}"));
    }
    Ok(())
}

#[then("the audit log holds {count:usize} entries")]
fn audit_holds(world: &mut GuardWorld, count: usize) -> Result<(), eyre::Report> {
    let guard = world.guard()?;
    run_async(guard.audit().flush())?;
    let found = world.store.len();
    if found != count {
        return Err(eyre::eyre!("expected {count} persisted entries, found {found}"));
    }
    Ok(())
}

#[then("the audited payload masks the SSN")]
fn audited_payload_masked(world: &mut GuardWorld) -> Result<(), eyre::Report> {
    let guard = world.guard()?;
    let entries = run_async(guard.audit().query(&AuditQuery::new().limit(1)))?;
    let entry = entries
        .first()
        .ok_or_else(|| eyre::eyre!("no audit entry recorded"))?;
    if entry.payload.pointer("/client/ssn") != Some(&json!(DEFAULT_MASK_TOKEN)) {
        return Err(eyre::eyre!("SSN not masked in {}", entry.payload));
    }
    Ok(())
}
