//! Three-stage validation engine.

use super::authority::{AuthorityRequirements, validate_authority};
use super::domain::{
    HandoffRecord, StageTimings, ValidationResult, ValidationStage, Violation, ViolationOrigin,
    rules,
};
use super::schema::validate_schema;
use crate::policy::{PolicyContext, PolicyDispatcher, PolicyPack};
use crate::registry::ContractRegistry;
use crate::registry::domain::ContractMode;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Tracks one validation through its states.
///
/// Each transition appends the stage's violations; nothing aborts early.
struct ValidationRun {
    stage: ValidationStage,
    violations: Vec<Violation>,
    elapsed: [Duration; 3],
}

impl ValidationRun {
    const fn new() -> Self {
        Self {
            stage: ValidationStage::Pending,
            violations: Vec::new(),
            elapsed: [Duration::ZERO; 3],
        }
    }

    fn advance(&mut self, found: Vec<Violation>, elapsed: Duration) {
        let slot = match self.stage {
            ValidationStage::Pending => Some(0),
            ValidationStage::SchemaChecked => Some(1),
            ValidationStage::AuthorityChecked => Some(2),
            ValidationStage::PolicyChecked | ValidationStage::Resolved => None,
        };
        if let Some(timing) = slot.and_then(|index| self.elapsed.get_mut(index)) {
            *timing = elapsed;
        }
        self.violations.extend(found);
        if let Some(next) = self.stage.next() {
            self.stage = next;
        }
    }

    fn resolve(mut self, total: Duration, mode: ContractMode) -> ValidationResult {
        debug_assert_eq!(self.stage, ValidationStage::PolicyChecked);
        self.stage = ValidationStage::Resolved;
        let [schema, authority, policy] = self.elapsed;
        ValidationResult::resolve(
            self.violations,
            StageTimings::from_durations(schema, authority, policy, total),
            mode,
        )
    }
}

/// Runs schema, authority and policy checks over a [`HandoffRecord`].
///
/// The engine holds no mutable state; one instance can validate any number
/// of handoffs concurrently.
#[derive(Debug)]
pub struct ValidationEngine {
    registry: Arc<ContractRegistry>,
    dispatcher: PolicyDispatcher,
    uncovered_mode: ContractMode,
}

impl ValidationEngine {
    /// Creates an engine with no policy packs that blocks uncovered handoffs.
    #[must_use]
    pub fn new(registry: Arc<ContractRegistry>) -> Self {
        Self {
            registry,
            dispatcher: PolicyDispatcher::new(),
            uncovered_mode: ContractMode::Block,
        }
    }

    /// Registers a policy pack.
    #[must_use]
    pub fn with_policy_pack(mut self, pack: impl PolicyPack + 'static) -> Self {
        self.dispatcher.register(Arc::new(pack));
        self
    }

    /// Replaces the dispatcher.
    #[must_use]
    pub fn with_dispatcher(mut self, dispatcher: PolicyDispatcher) -> Self {
        self.dispatcher = dispatcher;
        self
    }

    /// Sets the mode for handoffs that no contract governs.
    #[must_use]
    pub const fn with_uncovered_mode(mut self, mode: ContractMode) -> Self {
        self.uncovered_mode = mode;
        self
    }

    /// Returns the registry.
    #[must_use]
    pub const fn registry(&self) -> &Arc<ContractRegistry> {
        &self.registry
    }

    /// Returns the policy dispatcher.
    #[must_use]
    pub const fn dispatcher(&self) -> &PolicyDispatcher {
        &self.dispatcher
    }

    /// Returns the mode applied to uncovered handoffs.
    #[must_use]
    pub const fn uncovered_mode(&self) -> ContractMode {
        self.uncovered_mode
    }

    /// Validates one handoff.
    ///
    /// All three stages always run. A handoff with no contract gets a
    /// `CONTRACT_VIOLATION` and is checked against identity defaults.
    #[must_use]
    pub fn validate(&self, record: &HandoffRecord) -> ValidationResult {
        let started = Instant::now();
        let snapshot = self.registry.snapshot();
        let source = snapshot.agent(record.source());
        let target = snapshot.agent(record.target());
        let contract = record.contract();
        let mut run = ValidationRun::new();

        let schema_start = Instant::now();
        let schema_violations = contract.map_or_else(
            || {
                vec![
                    Violation::new(
                        &rules::CONTRACT_VIOLATION,
                        ViolationOrigin::Contract,
                        format!(
                            "no contract governs handoffs from '{}' to '{}'",
                            record.source(),
                            record.target()
                        ),
                    )
                    .with_evidence(serde_json::json!({
                        "source": record.source(),
                        "target": record.target(),
                    })),
                ]
            },
            |governing| validate_schema(record.payload(), governing.fields()),
        );
        run.advance(schema_violations, schema_start.elapsed());

        let authority_start = Instant::now();
        let requirements = contract.map_or_else(
            || AuthorityRequirements::identity_defaults(source.as_deref()),
            AuthorityRequirements::from_contract,
        );
        run.advance(
            validate_authority(record, source.as_deref(), target.as_deref(), &requirements),
            authority_start.elapsed(),
        );

        let policy_start = Instant::now();
        let policy_violations = contract.map_or_else(Vec::new, |governing| {
            self.dispatcher.evaluate(&PolicyContext {
                record,
                contract: governing,
                source: source.as_deref(),
                target: target.as_deref(),
            })
        });
        run.advance(policy_violations, policy_start.elapsed());

        let mode = contract.map_or(self.uncovered_mode, |governing| governing.mode());
        let result = run.resolve(started.elapsed(), mode);
        tracing::debug!(
            trace_id = %record.trace_id(),
            source = %record.source(),
            target = %record.target(),
            verdict = %result.verdict(),
            violations = result.violations().len(),
            total_us = result.timings().total_us,
            "handoff validated"
        );
        result
    }
}
