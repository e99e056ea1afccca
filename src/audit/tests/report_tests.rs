//! Unit tests for compliance reports.

use super::fixtures::{at, entry};
use crate::audit::domain::{ComplianceReport, TimeRange};
use crate::validation::domain::{Severity, Verdict};
use rstest::{fixture, rstest};

#[fixture]
fn report() -> ComplianceReport {
    let entries = vec![
        entry(1, "cs", "research", Verdict::Pass, 8),
        entry(2, "cs", "research", Verdict::Fail, 9),
        entry(3, "desk", "analyst", Verdict::Warn, 10),
        entry(4, "desk", "analyst", Verdict::Pass, 11),
    ];
    ComplianceReport::from_entries(&entries, TimeRange::all(), None, at(12))
}

#[rstest]
fn outcome_counts_and_rates(report: ComplianceReport) {
    assert_eq!(report.total, 4);
    assert_eq!((report.passed, report.warned, report.failed), (2, 1, 1));
    assert_eq!(report.blocked, 1);
    assert_eq!(report.pass_rate_bp, 5_000);
    assert_eq!(report.block_rate_bp, 2_500);
    assert_eq!(report.average_duration_us, 100);
}

#[rstest]
fn rules_sorted_by_frequency(report: ComplianceReport) {
    let first = report.by_rule.first().expect("at least one rule");
    assert_eq!(first.rule, "exceeds_max_length");
    assert_eq!(first.count, 2);
    assert_eq!(report.rule_count("SCHEMA-003"), 1);
    assert_eq!(report.rule_count("FIN-PII-002"), 0);
    assert_eq!(report.by_severity.get(&Severity::Medium), Some(&2));
    assert_eq!(report.by_severity.get(&Severity::High), Some(&1));
}

#[rstest]
fn pairs_are_tallied_separately(report: ComplianceReport) {
    assert_eq!(report.by_pair.len(), 2);
    let research = report
        .by_pair
        .iter()
        .find(|pair| pair.target.as_str() == "research")
        .expect("cs -> research present");
    assert_eq!((research.total, research.failed, research.blocked), (2, 1, 1));
}

#[rstest]
fn empty_window_has_zero_rates() {
    let empty = ComplianceReport::from_entries(&[], TimeRange::all(), None, at(12));
    assert_eq!(empty.total, 0);
    assert_eq!(empty.pass_rate_bp, 0);
    assert_eq!(empty.average_duration_us, 0);
}

#[rstest]
fn text_rendering_lists_totals_and_rules(report: ComplianceReport) {
    let text = report.render_text().expect("report renders");

    assert!(text.contains("Handoffs: 4"));
    assert!(text.contains("pass rate 50%"));
    assert!(text.contains("SCHEMA-006 exceeds_max_length"));
    assert!(text.contains("cs -> research: 2 handoffs"));
}
