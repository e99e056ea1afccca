//! Authority, clearance, action, scope and limit checks.

use super::domain::{HandoffRecord, Violation, ViolationOrigin, numeric_value, rules};
use crate::registry::domain::{
    AgentIdentity, AgentName, AuthorityLevel, ComplianceScope, DataClassification,
    HandoffContract,
};
use serde_json::{Value, json};
use std::collections::BTreeSet;

/// What the authority stage enforces for one handoff.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct AuthorityRequirements {
    /// Minimum authority of the target.
    pub required_authority: AuthorityLevel,
    /// Classification both agents must be cleared for.
    pub classification: Option<DataClassification>,
    /// Allowed actions; empty means unrestricted.
    pub allowed_actions: BTreeSet<String>,
    /// Prohibited actions.
    pub prohibited_actions: BTreeSet<String>,
    /// Scopes both agents must carry.
    pub required_scopes: BTreeSet<ComplianceScope>,
}

impl AuthorityRequirements {
    /// Takes the requirements declared by a contract.
    #[must_use]
    pub fn from_contract(contract: &HandoffContract) -> Self {
        Self {
            required_authority: contract.required_authority(),
            classification: contract.data_classification(),
            allowed_actions: contract.allowed_actions().clone(),
            prohibited_actions: contract.prohibited_actions().clone(),
            required_scopes: contract.required_scopes().clone(),
        }
    }

    /// Derives requirements for a handoff with no contract.
    ///
    /// The target must match the source's authority, clearance and scopes, so
    /// data never flows to a less privileged agent without a contract saying
    /// it may.
    #[must_use]
    pub fn identity_defaults(source: Option<&AgentIdentity>) -> Self {
        source.map_or_else(Self::default, |identity| Self {
            required_authority: identity.authority(),
            classification: Some(identity.clearance()),
            allowed_actions: BTreeSet::new(),
            prohibited_actions: BTreeSet::new(),
            required_scopes: identity.scopes().clone(),
        })
    }
}

/// Reads the requested action from metadata, falling back to the payload.
#[must_use]
pub fn requested_action(record: &HandoffRecord) -> Option<&str> {
    record
        .metadata()
        .get("action")
        .and_then(Value::as_str)
        .or_else(|| record.payload().get("action").and_then(Value::as_str))
}

/// Runs every authority check independently.
#[must_use]
pub fn validate_authority(
    record: &HandoffRecord,
    source: Option<&AgentIdentity>,
    target: Option<&AgentIdentity>,
    requirements: &AuthorityRequirements,
) -> Vec<Violation> {
    let mut violations = Vec::new();
    check_registered(record.source(), source, "source", &mut violations);
    check_registered(record.target(), target, "target", &mut violations);

    if let Some(identity) = target
        && !identity.authority().satisfies(requirements.required_authority)
    {
        violations.push(
            Violation::new(
                &rules::INSUFFICIENT_AUTHORITY,
                ViolationOrigin::Authority,
                format!(
                    "target '{}' has {} authority, {} required",
                    identity.name(),
                    identity.authority(),
                    requirements.required_authority
                ),
            )
            .with_evidence(json!({
                "agent": identity.name(),
                "actual": identity.authority(),
                "required": requirements.required_authority,
            })),
        );
    }

    if let Some(classification) = requirements.classification {
        for identity in [source, target].into_iter().flatten() {
            if identity.clearance() < classification {
                violations.push(
                    Violation::new(
                        &rules::CLEARANCE_VIOLATION,
                        ViolationOrigin::Authority,
                        format!(
                            "agent '{}' is cleared for {} data, {} required",
                            identity.name(),
                            identity.clearance(),
                            classification
                        ),
                    )
                    .with_evidence(json!({
                        "agent": identity.name(),
                        "clearance": identity.clearance(),
                        "required": classification,
                    })),
                );
            }
        }
    }

    if let Some(action) = requested_action(record) {
        check_action(action, requirements, &mut violations);
    }

    check_scopes(source, target, requirements, &mut violations);
    check_limits(record.payload(), [source, target], &mut violations);
    violations
}

fn check_registered(
    name: &AgentName,
    identity: Option<&AgentIdentity>,
    role: &str,
    violations: &mut Vec<Violation>,
) {
    if identity.is_none() {
        violations.push(
            Violation::new(
                &rules::UNREGISTERED_AGENT,
                ViolationOrigin::Authority,
                format!("{role} agent '{name}' is not registered"),
            )
            .with_evidence(json!({ "agent": name, "role": role })),
        );
    }
}

fn check_action(action: &str, requirements: &AuthorityRequirements, violations: &mut Vec<Violation>) {
    let message = if requirements.prohibited_actions.contains(action) {
        format!("action '{action}' is prohibited")
    } else if !requirements.allowed_actions.is_empty()
        && !requirements.allowed_actions.contains(action)
    {
        format!("action '{action}' is not in the allowed actions")
    } else {
        return;
    };
    violations.push(
        Violation::new(&rules::PROHIBITED_ACTION, ViolationOrigin::Authority, message)
            .with_field("action")
            .with_evidence(json!({
                "action": action,
                "allowed": requirements.allowed_actions,
                "prohibited": requirements.prohibited_actions,
            })),
    );
}

fn check_scopes(
    source: Option<&AgentIdentity>,
    target: Option<&AgentIdentity>,
    requirements: &AuthorityRequirements,
    violations: &mut Vec<Violation>,
) {
    let carries = |identity: Option<&AgentIdentity>, scope: &ComplianceScope| {
        identity.is_some_and(|agent| agent.scopes().contains(scope))
    };
    let missing: Vec<&ComplianceScope> = requirements
        .required_scopes
        .iter()
        .filter(|scope| !(carries(source, scope) && carries(target, scope)))
        .collect();
    if missing.is_empty() {
        return;
    }
    let listed = missing
        .iter()
        .map(|scope| scope.as_str())
        .collect::<Vec<_>>()
        .join(", ");
    violations.push(
        Violation::new(
            &rules::COMPLIANCE_SCOPE_GAP,
            ViolationOrigin::Authority,
            format!("required compliance scopes not shared by both agents: {listed}"),
        )
        .with_evidence(json!({ "missing": missing })),
    );
}

fn check_limits(
    payload: &Value,
    identities: [Option<&AgentIdentity>; 2],
    violations: &mut Vec<Violation>,
) {
    for identity in identities.into_iter().flatten() {
        for (field, max) in identity.limits() {
            let Some(value) = payload.get(field).filter(|value| !value.is_null()) else {
                continue;
            };
            let message = match numeric_value(value) {
                Some(amount) if amount <= *max => continue,
                Some(amount) => format!(
                    "{field} {amount} exceeds the {max} limit of agent '{}'",
                    identity.name()
                ),
                None => format!(
                    "{field} {value} is not a number and cannot be held to the {max} limit of agent '{}'",
                    identity.name()
                ),
            };
            violations.push(
                Violation::new(&rules::AMOUNT_EXCEEDS_LIMIT, ViolationOrigin::Authority, message)
                    .with_field(field.as_str())
                    .with_evidence(json!({
                        "agent": identity.name(),
                        "limit": max,
                        "actual": value,
                    })),
            );
        }
    }
}
