//! Verdicts and the result of one validation.

use super::{Severity, Violation};
use crate::registry::domain::{ContractMode, ParseLevelError};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Outcome of a validation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Verdict {
    /// No violations.
    Pass,
    /// Only MEDIUM or LOW violations.
    Warn,
    /// At least one CRITICAL or HIGH violation.
    Fail,
}

impl Verdict {
    /// Applies the fixed severity-to-verdict mapping.
    #[must_use]
    pub fn from_violations(violations: &[Violation]) -> Self {
        match violations.iter().map(Violation::severity).max() {
            None => Self::Pass,
            Some(worst) if worst.is_failing() => Self::Fail,
            Some(_) => Self::Warn,
        }
    }

    /// Returns the canonical storage representation.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Pass => "pass",
            Self::Warn => "warn",
            Self::Fail => "fail",
        }
    }
}

impl fmt::Display for Verdict {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for Verdict {
    type Error = ParseLevelError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pass" => Ok(Self::Pass),
            "warn" => Ok(Self::Warn),
            "fail" => Ok(Self::Fail),
            _ => Err(ParseLevelError {
                kind: "verdict",
                value: value.to_owned(),
            }),
        }
    }
}

fn micros(duration: Duration) -> u64 {
    u64::try_from(duration.as_micros()).unwrap_or(u64::MAX)
}

/// Wall-clock time spent in each stage, in microseconds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StageTimings {
    /// Schema stage.
    pub schema_us: u64,
    /// Authority stage.
    pub authority_us: u64,
    /// Policy stage.
    pub policy_us: u64,
    /// Natural-language judge, when consulted.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub judge_us: Option<u64>,
    /// Whole validation.
    pub total_us: u64,
}

impl StageTimings {
    /// Builds timings from the three stage durations and the total.
    #[must_use]
    pub fn from_durations(
        schema: Duration,
        authority: Duration,
        policy: Duration,
        total: Duration,
    ) -> Self {
        Self {
            schema_us: micros(schema),
            authority_us: micros(authority),
            policy_us: micros(policy),
            judge_us: None,
            total_us: micros(total),
        }
    }
}

/// Verdict, violations and timings of one validation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ValidationResult {
    verdict: Verdict,
    violations: Vec<Violation>,
    timings: StageTimings,
    mode: ContractMode,
    blocked: bool,
}

impl ValidationResult {
    /// Resolves a result from the collected violations and the effective
    /// contract mode.
    ///
    /// The handoff is blocked only when the verdict is FAIL under `block`
    /// mode.
    #[must_use]
    pub fn resolve(violations: Vec<Violation>, timings: StageTimings, mode: ContractMode) -> Self {
        let verdict = Verdict::from_violations(&violations);
        Self {
            verdict,
            violations,
            timings,
            mode,
            blocked: verdict == Verdict::Fail && mode == ContractMode::Block,
        }
    }

    /// Appends judge violations, records judge latency and re-resolves.
    #[must_use]
    pub fn with_judge(mut self, violations: Vec<Violation>, elapsed: Duration) -> Self {
        self.violations.extend(violations);
        self.timings.judge_us = Some(micros(elapsed));
        Self::resolve(self.violations, self.timings, self.mode)
    }

    /// Returns the verdict.
    #[must_use]
    pub const fn verdict(&self) -> Verdict {
        self.verdict
    }

    /// Returns `true` for a PASS verdict.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.verdict == Verdict::Pass
    }

    /// Returns the violations in detection order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Returns the CRITICAL and HIGH violations.
    pub fn failing_violations(&self) -> impl Iterator<Item = &Violation> {
        self.violations
            .iter()
            .filter(|violation| violation.severity().is_failing())
    }

    /// Returns the number of violations with `severity`.
    #[must_use]
    pub fn count_by_severity(&self, severity: Severity) -> usize {
        self.violations
            .iter()
            .filter(|violation| violation.severity() == severity)
            .count()
    }

    /// Returns `true` when any violation has the rule name `rule`.
    #[must_use]
    pub fn has_rule(&self, rule: &str) -> bool {
        self.violations.iter().any(|violation| violation.rule() == rule)
    }

    /// Returns the stage timings.
    #[must_use]
    pub const fn timings(&self) -> &StageTimings {
        &self.timings
    }

    /// Returns the effective contract mode.
    #[must_use]
    pub const fn mode(&self) -> ContractMode {
        self.mode
    }

    /// Returns `true` when the payload must not be forwarded.
    #[must_use]
    pub const fn is_blocked(&self) -> bool {
        self.blocked
    }
}
