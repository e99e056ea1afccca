//! Unit tests for audit filters.

use super::fixtures::{agent, at, entry, with_scope};
use crate::audit::domain::{AuditEntry, AuditQuery, SequenceId, TimeRange};
use crate::registry::domain::ComplianceScope;
use crate::validation::domain::{TraceId, Verdict};
use rstest::{fixture, rstest};

#[fixture]
fn entries() -> Vec<AuditEntry> {
    vec![
        entry(1, "cs", "research", Verdict::Pass, 8),
        entry(2, "cs", "research", Verdict::Fail, 9),
        with_scope(entry(3, "desk", "analyst", Verdict::Warn, 10), "SOX"),
        entry(4, "desk", "cs", Verdict::Pass, 11),
    ]
}

fn ids(selected: &[AuditEntry]) -> Vec<u64> {
    selected.iter().map(|found| found.sequence_id.value()).collect()
}

#[rstest]
fn results_are_newest_first(entries: Vec<AuditEntry>) {
    assert_eq!(ids(&AuditQuery::new().apply(entries)), vec![4, 3, 2, 1]);
}

#[rstest]
#[case(AuditQuery::new().source(agent("cs")), vec![2, 1])]
#[case(AuditQuery::new().target(agent("cs")), vec![4])]
#[case(AuditQuery::new().passed(true), vec![4, 1])]
#[case(AuditQuery::new().passed(false), vec![3, 2])]
#[case(AuditQuery::new().verdict(Verdict::Warn), vec![3])]
#[case(AuditQuery::new().blocked(true), vec![2])]
#[case(AuditQuery::new().scope(ComplianceScope::new("sox")), vec![3])]
#[case(AuditQuery::new().trace_id(TraceId::new("trace-2").expect("valid trace id")), vec![2])]
#[case(AuditQuery::new().source(agent("desk")).passed(true), vec![4])]
fn filters_combine(entries: Vec<AuditEntry>, #[case] query: AuditQuery, #[case] expected: Vec<u64>) {
    assert_eq!(ids(&query.apply(entries)), expected);
}

#[rstest]
fn time_range_is_half_open(entries: Vec<AuditEntry>) {
    let query = AuditQuery::new().time_range(TimeRange::between(at(9), at(11)));
    assert_eq!(ids(&query.apply(entries)), vec![3, 2]);
}

#[rstest]
fn paging_applies_after_ordering(entries: Vec<AuditEntry>) {
    let query = AuditQuery::new().offset(1).limit(2);
    assert_eq!(ids(&query.apply(entries)), vec![3, 2]);
}

#[rstest]
fn duplicates_collapse_by_sequence(entries: Vec<AuditEntry>) {
    let doubled = entries.iter().cloned().chain(entries.clone());
    let selected = AuditQuery::new().apply(doubled);
    assert_eq!(ids(&selected), vec![4, 3, 2, 1]);
    assert_eq!(
        selected.first().map(|found| found.sequence_id),
        Some(SequenceId::new(4))
    );
}
