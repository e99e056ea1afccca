//! End-to-end forwarding and blocking through [`HandoffGuard`].

use crate::in_memory::helpers::{TestResult, build_guard, build_registry, request, runtime, store};
use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::audit::domain::AuditQuery;
use handoff_guard::config::GuardConfig;
use handoff_guard::validation::domain::Verdict;
use rstest::rstest;
use serde_json::json;
use std::io;
use std::sync::Arc;
use tokio::runtime::Runtime;

/// A conforming payload reaches the target untouched.
#[rstest]
fn conforming_handoff_passes(runtime: io::Result<Runtime>, store: InMemoryAuditStore) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;
    let payload = json!({"customer_id": "CUST-000123"});

    let forwarded = rt.block_on(guard.validate(request("cs", "research", payload.clone())?))?;

    assert_eq!(forwarded.payload, payload);
    assert_eq!(forwarded.result.verdict(), Verdict::Pass);
    assert!(forwarded.result.violations().is_empty());
    Ok(())
}

/// A pattern mismatch blocks and names the rule.
#[rstest]
fn pattern_mismatch_blocks(runtime: io::Result<Runtime>, store: InMemoryAuditStore) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    let outcome =
        rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": "abc"}))?));

    let Err(blocked) = outcome else {
        return Err("expected the handoff to be blocked".into());
    };
    assert!(blocked.to_string().contains("SCHEMA-003 pattern_mismatch"));
    let violations = blocked.result().violations();
    assert_eq!(violations.len(), 1);
    assert_eq!(
        violations.first().and_then(|violation| violation.field()),
        Some("customer_id")
    );
    Ok(())
}

/// Every outcome is persisted, blocked ones included.
#[rstest]
fn every_outcome_is_persisted(runtime: io::Result<Runtime>, store: InMemoryAuditStore) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": "CUST-000123"}))?))?;
    let blocked =
        rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": "nope"}))?));
    assert!(blocked.is_err());
    rt.block_on(guard.audit().flush())?;

    assert_eq!(store.len(), 2);
    let failed = rt.block_on(guard.audit().query(&AuditQuery::new().blocked(true)))?;
    assert_eq!(failed.len(), 1);
    assert_eq!(failed.first().map(|entry| entry.verdict), Some(Verdict::Fail));
    Ok(())
}

/// Concurrent handoffs get distinct, gap-free sequence ids.
#[rstest]
fn concurrent_handoffs_are_sequenced(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = Arc::new(build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?);

    let mut handles = Vec::new();
    for index in 0..16_u32 {
        let shared = Arc::clone(&guard);
        let pending = request(
            "cs",
            "research",
            json!({"customer_id": format!("CUST-{index:06}")}),
        )?;
        handles.push(rt.spawn(async move { shared.validate(pending).await }));
    }
    let mut ids = Vec::new();
    for handle in handles {
        ids.push(rt.block_on(handle)??.sequence_id.value());
    }
    ids.sort_unstable();
    ids.dedup();

    assert_eq!(ids, (1..=16).collect::<Vec<u64>>());
    Ok(())
}
