//! Optional natural-language rule judge.
//!
//! Contracts may carry free-text rules that no deterministic check can
//! evaluate. A judge scores them outside the three validation stages; its
//! findings join the violation list under the `NL-` rule namespace. A judge
//! that is missing, slow or failing never blocks a handoff on its own.

use crate::validation::domain::{HandoffRecord, Severity, Violation, ViolationOrigin};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Value, json};
use thiserror::Error;

/// Prefix of every judge-assigned rule id.
pub const JUDGE_RULE_PREFIX: &str = "NL";

/// Errors a judge may report.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum JudgeError {
    /// The judge could not be reached.
    #[error("judge unavailable: {0}")]
    Unavailable(String),

    /// The judge answered with something unusable.
    #[error("judge returned an invalid response: {0}")]
    InvalidResponse(String),
}

/// One natural-language rule the judge considers broken.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JudgeFinding {
    /// Zero-based index into the contract's natural-language rules.
    pub rule_index: usize,
    /// Severity the judge assigns.
    pub severity: Severity,
    /// Why the rule is considered broken.
    pub reason: String,
    /// Supporting detail.
    #[serde(default)]
    pub evidence: Option<Value>,
}

/// Port for an external natural-language judge.
#[async_trait]
pub trait NlJudge: Send + Sync {
    /// Scores `rules` against the handoff and returns the broken ones.
    ///
    /// # Errors
    ///
    /// Returns [`JudgeError`] when no decision can be produced.
    async fn judge(
        &self,
        record: &HandoffRecord,
        rules: &[String],
    ) -> Result<Vec<JudgeFinding>, JudgeError>;
}

/// Converts findings into violations, dropping indices outside `rules`.
#[must_use]
pub fn findings_to_violations(findings: Vec<JudgeFinding>, rules: &[String]) -> Vec<Violation> {
    findings
        .into_iter()
        .filter_map(|finding| {
            let rule_text = rules.get(finding.rule_index)?;
            let number = finding.rule_index.saturating_add(1);
            Some(
                Violation::custom(
                    format!("{JUDGE_RULE_PREFIX}-{number:03}"),
                    "nl_rule",
                    finding.severity,
                    ViolationOrigin::Judge,
                    finding.reason,
                )
                .with_evidence(json!({
                    "rule": rule_text,
                    "detail": finding.evidence,
                })),
            )
        })
        .collect()
}
