//! Uncovered handoffs and the coverage matrix.

use crate::in_memory::helpers::{
    TestResult, agent, build_guard, build_registry, request, runtime, store,
};
use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::config::GuardConfig;
use handoff_guard::registry::CoverageStatus;
use rstest::rstest;
use serde_json::json;
use std::io;
use tokio::runtime::Runtime;

/// A pair without a contract is still held to identity defaults.
#[rstest]
fn uncovered_handoff_reports_contract_and_authority(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    let outcome = rt.block_on(guard.validate(request("desk", "research", json!({"note": "hello"}))?));

    let Err(blocked) = outcome else {
        return Err("expected the handoff to be blocked".into());
    };
    let result = blocked.result();
    assert!(result.has_rule("CONTRACT_VIOLATION"));
    assert!(result.has_rule("insufficient_authority"));
    assert!(result.has_rule("compliance_scope_gap"));
    Ok(())
}

/// The lenient preset forwards uncovered handoffs with the same findings.
#[rstest]
fn lenient_preset_forwards_uncovered_handoff(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::lenient())?;

    let forwarded = rt.block_on(guard.validate(request("research", "cs", json!({"note": "hello"}))?))?;

    assert!(forwarded.result.has_rule("CONTRACT_VIOLATION"));
    assert!(!forwarded.result.is_blocked());
    Ok(())
}

/// Coverage agrees with contract lookup for every pair.
#[rstest]
fn coverage_matches_lookup() -> TestResult {
    let registry = build_registry()?;
    let coverage = registry.coverage();

    for source in coverage.agents() {
        for target in coverage.agents() {
            let expected = if source == target {
                CoverageStatus::SelfPair
            } else if registry.get_contract(source, target).is_some() {
                CoverageStatus::Covered
            } else {
                CoverageStatus::Uncovered
            };
            assert_eq!(coverage.status(source, target), Some(expected));
        }
    }
    assert_eq!(coverage.covered_count(), 2);
    assert_eq!(
        coverage.status(&agent("cs")?, &agent("research")?),
        Some(CoverageStatus::Covered)
    );
    Ok(())
}
