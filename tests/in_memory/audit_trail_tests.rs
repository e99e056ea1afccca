//! Audit queries and compliance reporting over guarded traffic.

use crate::in_memory::helpers::{
    TestResult, agent, build_guard, build_registry, request, runtime, store,
};
use handoff_guard::audit::adapters::InMemoryAuditStore;
use handoff_guard::audit::domain::{AuditQuery, TimeRange};
use handoff_guard::config::GuardConfig;
use handoff_guard::registry::domain::ComplianceScope;
use rstest::rstest;
use serde_json::json;
use std::io;
use tokio::runtime::Runtime;

/// Queries filter by pair and outcome, newest first.
#[rstest]
fn query_filters_guarded_traffic(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    for customer in ["CUST-000001", "bad", "CUST-000002"] {
        let outcome =
            rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": customer}))?));
        assert_eq!(outcome.is_ok(), customer.starts_with("CUST"));
    }
    assert!(
        rt.block_on(guard.validate(request("desk", "analyst", json!({"note": "hi"}))?))
            .is_ok()
    );
    rt.block_on(guard.audit().flush())?;

    let support = rt.block_on(
        guard
            .audit()
            .query(&AuditQuery::new().source(agent("cs")?).target(agent("research")?)),
    )?;
    let passed = rt.block_on(guard.audit().query(&AuditQuery::new().passed(true)))?;
    let failed = rt.block_on(guard.audit().query(&AuditQuery::new().passed(false)))?;

    assert_eq!(
        support.iter().map(|entry| entry.sequence_id.value()).collect::<Vec<_>>(),
        vec![3, 2, 1]
    );
    assert_eq!(passed.len(), 3);
    assert_eq!(failed.len(), 1);
    Ok(())
}

/// The report aggregates verdicts, rules and pairs, and can be scoped.
#[rstest]
fn compliance_report_aggregates_traffic(
    runtime: io::Result<Runtime>,
    store: InMemoryAuditStore,
) -> TestResult {
    let rt = runtime?;
    let guard = build_guard(&rt, &build_registry()?, &store, GuardConfig::default())?;

    let passed = rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": "CUST-000001"}))?));
    assert!(passed.is_ok());
    let blocked = rt.block_on(guard.validate(request("cs", "research", json!({"customer_id": "bad"}))?));
    assert!(blocked.is_err());
    let large = rt.block_on(guard.validate(request("desk", "analyst", json!({"amount": 50000}))?));
    assert!(large.is_err());

    let report = rt.block_on(guard.audit().compliance_report(TimeRange::all(), None))?;
    assert_eq!(report.total, 3);
    assert_eq!(report.passed, 1);
    assert_eq!(report.blocked, 2);
    assert_eq!(report.rule_count("SCHEMA-003"), 1);
    assert_eq!(report.rule_count("FIN-AUTH-003"), 1);
    assert_eq!(report.by_pair.len(), 2);
    let text = report.render_text()?;
    assert!(text.contains("Handoffs: 3"));

    let finra = rt.block_on(
        guard
            .audit()
            .compliance_report(TimeRange::all(), Some(ComplianceScope::new("finra"))),
    )?;
    assert_eq!(finra.total, 1);
    Ok(())
}
