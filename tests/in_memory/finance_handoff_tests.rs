//! Finance pack behaviour observed through the guard.

use crate::in_memory::helpers::{TestResult, build_guard, build_registry, request, runtime, store};
use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::audit::domain::AuditQuery;
use handoff_guard::config::GuardConfig;
use handoff_guard::policy::masking::DEFAULT_MASK_TOKEN;
use handoff_guard::validation::domain::{Severity, Verdict};
use rstest::rstest;
use serde_json::json;
use std::io;
use tokio::runtime::Runtime;

/// A nested SSN fires both PII rules and is masked in the audit log.
#[rstest]
fn nested_ssn_is_blocked_and_masked(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    let outcome = rt.block_on(guard.validate(request(
        "desk",
        "analyst",
        json!({"client": {"ssn": "111-22-3333"}}),
    )?));

    let Err(blocked) = outcome else {
        return Err("expected the handoff to be blocked".into());
    };
    let mut rules: Vec<&str> = blocked
        .result()
        .violations()
        .iter()
        .map(|violation| violation.rule())
        .collect();
    rules.sort_unstable();
    assert_eq!(rules, vec!["pii_exposure_to_unauthorized_agent", "ssn_in_payload"]);
    assert!(
        blocked
            .result()
            .violations()
            .iter()
            .all(|violation| violation.severity() == Severity::Critical)
    );

    rt.block_on(guard.audit().flush())?;
    let stored = rt.block_on(guard.audit().query(&AuditQuery::new()))?;
    let entry = stored.first().ok_or("audit entry missing")?;
    assert_eq!(entry.payload["client"]["ssn"], json!(DEFAULT_MASK_TOKEN));
    Ok(())
}

/// A large amount needs `human_approved`.
#[rstest]
fn large_transaction_needs_approval(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    let outcome = rt.block_on(guard.validate(request("desk", "analyst", json!({"amount": 80000}))?));
    let Err(blocked) = outcome else {
        return Err("expected the handoff to be blocked".into());
    };
    let violations = blocked.result().violations();
    assert_eq!(violations.len(), 1);
    let violation = violations.first().ok_or("violation missing")?;
    assert_eq!(violation.rule(), "large_transaction_no_approval");
    assert_eq!(violation.severity(), Severity::High);

    let mut metadata = serde_json::Map::new();
    metadata.insert("human_approved".to_owned(), json!(true));
    let approved = rt.block_on(guard.validate(
        request("desk", "analyst", json!({"amount": 80000}))?.with_metadata(metadata),
    ))?;
    assert_eq!(approved.result.verdict(), Verdict::Pass);
    Ok(())
}
