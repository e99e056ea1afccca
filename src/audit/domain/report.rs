//! Compliance report aggregation and rendering.

use super::{AuditEntry, TimeRange};
use crate::registry::domain::{AgentName, ComplianceScope};
use crate::validation::domain::{Severity, Verdict};
use chrono::{DateTime, Utc};
use minijinja::Environment;
use serde::Serialize;
use std::collections::BTreeMap;
use thiserror::Error;

/// Rules shown in the text rendering.
const TOP_RULES: usize = 10;

const REPORT_TEMPLATE: &str = "\
Handoff compliance report
Period: {% if period_start %}{{ period_start }}{% else %}beginning{% endif %} .. {% if period_end %}{{ period_end }}{% else %}now{% endif %}{% if scope %} (scope {{ scope }}){% endif %}
Generated: {{ report.generated_at }}

Handoffs: {{ report.total }}
  pass {{ report.passed }} / warn {{ report.warned }} / fail {{ report.failed }} / blocked {{ report.blocked }}
  pass rate {{ report.pass_rate_bp // 100 }}% / block rate {{ report.block_rate_bp // 100 }}%
  average validation {{ report.average_duration_us }}us

Violations by severity:
{% for severity, count in report.by_severity|items %}  {{ severity }}: {{ count }}
{% endfor %}
Top rules:
{% for rule in top_rules %}  {{ rule.rule_id }} {{ rule.rule }} [{{ rule.severity }}]: {{ rule.count }}
{% else %}  none
{% endfor %}
Agent pairs:
{% for pair in report.by_pair %}  {{ pair.source }} -> {{ pair.target }}: {{ pair.total }} handoffs, {{ pair.failed }} failed, {{ pair.blocked }} blocked
{% endfor %}";

/// Errors raised while rendering a report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ReportError {
    /// The text template failed to render.
    #[error("failed to render compliance report: {0}")]
    Render(String),
}

/// Violation count for one rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RuleCount {
    /// Stable rule id.
    pub rule_id: String,
    /// Rule name.
    pub rule: String,
    /// Highest severity seen for the rule.
    pub severity: Severity,
    /// Number of violations.
    pub count: usize,
}

/// Outcome counts for one agent pair.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PairStats {
    /// Handing-off agent.
    pub source: AgentName,
    /// Receiving agent.
    pub target: AgentName,
    /// Handoffs attempted.
    pub total: usize,
    /// PASS verdicts.
    pub passed: usize,
    /// WARN verdicts.
    pub warned: usize,
    /// FAIL verdicts.
    pub failed: usize,
    /// Blocked handoffs.
    pub blocked: usize,
}

/// Aggregate view of the audit log over a period.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ComplianceReport {
    /// Window covered.
    pub period: TimeRange,
    /// Compliance scope the report was restricted to.
    pub scope: Option<ComplianceScope>,
    /// When the report was produced.
    pub generated_at: DateTime<Utc>,
    /// Handoffs in the window.
    pub total: usize,
    /// PASS verdicts.
    pub passed: usize,
    /// WARN verdicts.
    pub warned: usize,
    /// FAIL verdicts.
    pub failed: usize,
    /// Blocked handoffs.
    pub blocked: usize,
    /// PASS share in basis points.
    pub pass_rate_bp: u64,
    /// Blocked share in basis points.
    pub block_rate_bp: u64,
    /// Violation counts per severity.
    pub by_severity: BTreeMap<Severity, usize>,
    /// Violation counts per rule, most frequent first.
    pub by_rule: Vec<RuleCount>,
    /// Outcomes per agent pair, sorted by pair.
    pub by_pair: Vec<PairStats>,
    /// Mean validation time.
    pub average_duration_us: u64,
}

fn basis_points(part: usize, whole: usize) -> u64 {
    let scaled = u64::try_from(part).unwrap_or(u64::MAX).saturating_mul(10_000);
    scaled
        .checked_div(u64::try_from(whole).unwrap_or(u64::MAX))
        .unwrap_or(0)
}

impl ComplianceReport {
    /// Aggregates `entries`, which must already be filtered to the window
    /// and scope.
    #[must_use]
    pub fn from_entries(
        entries: &[AuditEntry],
        period: TimeRange,
        scope: Option<ComplianceScope>,
        generated_at: DateTime<Utc>,
    ) -> Self {
        let mut by_severity: BTreeMap<Severity, usize> = BTreeMap::new();
        let mut by_rule: BTreeMap<String, RuleCount> = BTreeMap::new();
        let mut by_pair: BTreeMap<(AgentName, AgentName), PairStats> = BTreeMap::new();
        let (mut passed, mut warned, mut failed, mut blocked) = (0_usize, 0_usize, 0_usize, 0_usize);
        let mut duration_sum = 0_u64;

        for entry in entries {
            let pair = by_pair
                .entry((entry.source.clone(), entry.target.clone()))
                .or_insert_with(|| PairStats {
                    source: entry.source.clone(),
                    target: entry.target.clone(),
                    total: 0,
                    passed: 0,
                    warned: 0,
                    failed: 0,
                    blocked: 0,
                });
            pair.total = pair.total.saturating_add(1);
            match entry.verdict {
                Verdict::Pass => {
                    passed = passed.saturating_add(1);
                    pair.passed = pair.passed.saturating_add(1);
                }
                Verdict::Warn => {
                    warned = warned.saturating_add(1);
                    pair.warned = pair.warned.saturating_add(1);
                }
                Verdict::Fail => {
                    failed = failed.saturating_add(1);
                    pair.failed = pair.failed.saturating_add(1);
                }
            }
            if entry.blocked {
                blocked = blocked.saturating_add(1);
                pair.blocked = pair.blocked.saturating_add(1);
            }
            duration_sum = duration_sum.saturating_add(entry.duration_us());

            for violation in &entry.violations {
                let severity_count = by_severity.entry(violation.severity()).or_insert(0);
                *severity_count = severity_count.saturating_add(1);
                let rule = by_rule
                    .entry(violation.rule_id().to_owned())
                    .or_insert_with(|| RuleCount {
                        rule_id: violation.rule_id().to_owned(),
                        rule: violation.rule().to_owned(),
                        severity: violation.severity(),
                        count: 0,
                    });
                rule.count = rule.count.saturating_add(1);
                rule.severity = rule.severity.max(violation.severity());
            }
        }

        let total = entries.len();
        let mut rules: Vec<RuleCount> = by_rule.into_values().collect();
        rules.sort_by(|left, right| {
            right
                .count
                .cmp(&left.count)
                .then_with(|| left.rule_id.cmp(&right.rule_id))
        });

        Self {
            period,
            scope,
            generated_at,
            total,
            passed,
            warned,
            failed,
            blocked,
            pass_rate_bp: basis_points(passed, total),
            block_rate_bp: basis_points(blocked, total),
            by_severity,
            by_rule: rules,
            by_pair: by_pair.into_values().collect(),
            average_duration_us: duration_sum
                .checked_div(u64::try_from(total).unwrap_or(u64::MAX))
                .unwrap_or(0),
        }
    }

    /// Returns the violation count for `rule_id`.
    #[must_use]
    pub fn rule_count(&self, rule_id: &str) -> usize {
        self.by_rule
            .iter()
            .find(|rule| rule.rule_id == rule_id)
            .map_or(0, |rule| rule.count)
    }

    /// Renders the report as plain text.
    ///
    /// # Errors
    ///
    /// Returns [`ReportError::Render`] when the template fails.
    pub fn render_text(&self) -> Result<String, ReportError> {
        let environment = Environment::new();
        let top_rules: Vec<&RuleCount> = self.by_rule.iter().take(TOP_RULES).collect();
        environment
            .render_str(
                REPORT_TEMPLATE,
                minijinja::context! {
                    report => self,
                    top_rules => top_rules,
                    scope => self.scope.as_ref().map(ComplianceScope::as_str),
                    period_start => self.period.start.map(|start| start.to_rfc3339()),
                    period_end => self.period.end.map(|end| end.to_rfc3339()),
                },
            )
            .map_err(|error| ReportError::Render(error.to_string()))
    }
}
