//! The handoff guard.

use super::error::HandoffBlockedError;
use super::request::{ForwardedHandoff, HandoffRequest};
use crate::audit::domain::AuditDraft;
use crate::audit::ports::{AuditStore, AuditStoreResult};
use crate::audit::AuditLogger;
use crate::config::GuardConfig;
use crate::judge::{NlJudge, findings_to_violations};
use crate::validation::ValidationEngine;
use crate::validation::domain::{HandoffRecord, ValidationResult, Verdict};
use mockable::Clock;
use std::sync::Arc;
use std::time::Instant;

/// Validates handoffs at the call boundary and enforces fail-closed
/// blocking.
///
/// Every call, whatever its verdict, is recorded in the audit log before
/// it returns.
pub struct HandoffGuard<C> {
    engine: Arc<ValidationEngine>,
    audit: AuditLogger<C>,
    judge: Option<Arc<dyn NlJudge>>,
    config: GuardConfig,
    clock: Arc<C>,
}

impl<C> std::fmt::Debug for HandoffGuard<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HandoffGuard")
            .field("engine", &self.engine)
            .field("audit", &self.audit)
            .field("has_judge", &self.judge.is_some())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl<C> HandoffGuard<C>
where
    C: Clock + Send + Sync,
{
    /// Builds a guard and starts its audit writer.
    ///
    /// The engine's uncovered-handoff mode is taken from `config`.
    ///
    /// # Errors
    ///
    /// Returns [`crate::audit::ports::AuditStoreError`] when `store` cannot
    /// report its highest sequence id.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub async fn new(
        engine: ValidationEngine,
        store: Arc<dyn AuditStore>,
        clock: Arc<C>,
        config: GuardConfig,
    ) -> AuditStoreResult<Self> {
        let audit = AuditLogger::spawn(store, Arc::clone(&clock), &config.audit).await?;
        Ok(Self {
            engine: Arc::new(engine.with_uncovered_mode(config.uncovered_mode)),
            audit,
            judge: None,
            config,
            clock,
        })
    }

    /// Consults `judge` for contracts that carry natural-language rules.
    #[must_use]
    pub fn with_judge(mut self, judge: Arc<dyn NlJudge>) -> Self {
        self.judge = Some(judge);
        self
    }

    /// Returns the validation engine.
    #[must_use]
    pub const fn engine(&self) -> &Arc<ValidationEngine> {
        &self.engine
    }

    /// Returns the audit logger.
    #[must_use]
    pub const fn audit(&self) -> &AuditLogger<C> {
        &self.audit
    }

    /// Returns the guard configuration.
    #[must_use]
    pub const fn config(&self) -> &GuardConfig {
        &self.config
    }

    /// Validates one handoff and either forwards or blocks it.
    ///
    /// # Errors
    ///
    /// Returns [`HandoffBlockedError`] when the verdict is FAIL and the
    /// effective mode is block. The audit entry exists either way.
    pub async fn validate(
        &self,
        request: HandoffRequest,
    ) -> Result<ForwardedHandoff, HandoffBlockedError> {
        let (source, target, payload, metadata, trace_id) = request.into_parts();
        let contract = self.engine.registry().get_contract(&source, &target);
        let record = HandoffRecord::new(
            trace_id.clone(),
            source,
            target,
            contract,
            payload,
            self.clock.utc(),
        )
        .with_metadata(metadata);

        let deterministic = self.engine.validate(&record);
        let result = self.consult_judge(&record, deterministic).await;

        let masker = self
            .engine
            .dispatcher()
            .masker(record.contract(), &self.config.audit.mask_token);
        let sequence_id = self
            .audit
            .record(AuditDraft::capture(&record, &result, &masker));

        if result.is_blocked() {
            tracing::warn!(
                trace_id = %trace_id,
                source = %record.source(),
                target = %record.target(),
                violations = result.violations().len(),
                "handoff blocked"
            );
            return Err(HandoffBlockedError::new(
                trace_id,
                record.source().clone(),
                record.target().clone(),
                sequence_id,
                result,
            ));
        }
        if result.verdict() != Verdict::Pass {
            tracing::info!(
                trace_id = %trace_id,
                source = %record.source(),
                target = %record.target(),
                verdict = %result.verdict(),
                mode = %result.mode(),
                "handoff forwarded with violations"
            );
        }

        Ok(ForwardedHandoff {
            payload: record.into_payload(),
            result,
            sequence_id,
            trace_id,
        })
    }

    async fn consult_judge(
        &self,
        record: &HandoffRecord,
        result: ValidationResult,
    ) -> ValidationResult {
        let Some(judge) = self.judge.as_ref() else {
            return result;
        };
        let rules = record.contract().map(|contract| contract.nl_rules()).unwrap_or_default();
        if rules.is_empty() {
            return result;
        }

        let started = Instant::now();
        let timeout = self.config.judge.timeout();
        match tokio::time::timeout(timeout, judge.judge(record, rules)).await {
            Ok(Ok(findings)) => {
                result.with_judge(findings_to_violations(findings, rules), started.elapsed())
            }
            Ok(Err(error)) => {
                tracing::warn!(trace_id = %record.trace_id(), error = %error, "judge failed");
                result
            }
            Err(_) => {
                tracing::warn!(
                    trace_id = %record.trace_id(),
                    timeout_ms = self.config.judge.timeout_ms,
                    "judge timed out"
                );
                result
            }
        }
    }
}
