//! Scope-based policy pack dispatch.

use super::masking::{MaskingRules, PayloadMasker};
use super::ports::{PolicyContext, PolicyPack, PolicyPackError};
use crate::registry::domain::HandoffContract;
use crate::validation::domain::{Violation, ViolationOrigin, rules};
use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

/// Runs the registered packs relevant to a contract.
///
/// New packs are added by implementing [`PolicyPack`] and registering them;
/// the dispatcher itself never changes.
#[derive(Clone, Default)]
pub struct PolicyDispatcher {
    packs: Vec<Arc<dyn PolicyPack>>,
}

impl fmt::Debug for PolicyDispatcher {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PolicyDispatcher")
            .field("packs", &self.pack_names().collect::<Vec<_>>())
            .finish()
    }
}

impl PolicyDispatcher {
    /// Creates a dispatcher with no packs.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers a pack, returning the dispatcher.
    #[must_use]
    pub fn with_pack(mut self, pack: impl PolicyPack + 'static) -> Self {
        self.register(Arc::new(pack));
        self
    }

    /// Registers a shared pack.
    pub fn register(&mut self, pack: Arc<dyn PolicyPack>) {
        self.packs.push(pack);
    }

    /// Returns the registered pack names in registration order.
    pub fn pack_names(&self) -> impl Iterator<Item = &str> {
        self.packs.iter().map(|pack| pack.name())
    }

    /// Returns `true` when `pack` should run for `contract`.
    #[must_use]
    pub fn is_relevant(pack: &dyn PolicyPack, contract: &HandoffContract) -> bool {
        let scopes = pack.scopes();
        scopes.is_empty()
            || scopes
                .iter()
                .any(|scope| contract.required_scopes().contains(scope))
    }

    /// Evaluates every relevant pack and concatenates their violations.
    ///
    /// A pack that errors or panics contributes one CRITICAL
    /// `policy_pack_failure` violation naming it; the other packs still run.
    #[must_use]
    pub fn evaluate(&self, context: &PolicyContext<'_>) -> Vec<Violation> {
        let mut violations = Vec::new();
        for pack in &self.packs {
            if !Self::is_relevant(pack.as_ref(), context.contract) {
                continue;
            }
            let name = pack.name();
            let outcome = panic::catch_unwind(AssertUnwindSafe(|| pack.evaluate(context)))
                .unwrap_or_else(|panic_payload| {
                    Err(PolicyPackError::Evaluation {
                        pack: name.to_owned(),
                        message: panic_message(panic_payload.as_ref()),
                    })
                });
            match outcome {
                Ok(found) => violations.extend(found.into_iter().map(|violation| {
                    if violation.pack().is_some() {
                        violation
                    } else {
                        violation.with_pack(name)
                    }
                })),
                Err(err) => {
                    tracing::warn!(
                        pack = name,
                        trace_id = %context.record.trace_id(),
                        error = %err,
                        "policy pack failed"
                    );
                    violations.push(
                        Violation::new(
                            &rules::POLICY_PACK_FAILURE,
                            ViolationOrigin::Policy,
                            format!("policy pack '{name}' could not evaluate the handoff: {err}"),
                        )
                        .with_pack(name),
                    );
                }
            }
        }
        violations
    }

    /// Builds the masker for a handoff: every pack's rules plus the
    /// contract's sensitive fields.
    #[must_use]
    pub fn masker(&self, contract: Option<&HandoffContract>, token: &str) -> PayloadMasker {
        let mut masking = MaskingRules::default();
        for pack in &self.packs {
            masking.merge(pack.masking_rules());
        }
        if let Some(governing) = contract {
            masking.merge(
                MaskingRules::default().with_keys(
                    governing
                        .fields()
                        .iter()
                        .filter(|field| field.is_sensitive())
                        .map(|field| field.name()),
                ),
            );
        }
        PayloadMasker::new(masking, token)
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|message| (*message).to_owned())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "pack panicked".to_owned())
}
