//! The ten finance checks.
//!
//! Every check is a plain function of the handoff and the pack settings and
//! returns at most one violation.

use crate::config::FinancePackConfig;
use crate::policy::ports::PolicyContext;
use crate::registry::domain::{AuthorityLevel, ComplianceScope};
use crate::validation::authority::requested_action;
use crate::validation::domain::{Rule, Severity, Violation, ViolationOrigin, numeric_value};
use regex::Regex;
use serde_json::{Value, json};
use std::sync::LazyLock;

/// Signature shared by every finance check.
pub type FinanceCheck = fn(&PolicyContext<'_>, &FinancePackConfig) -> Option<Violation>;

/// All checks in evaluation order.
pub const CHECKS: [FinanceCheck; 10] = [
    pii_exposure,
    ssn_in_payload,
    unmasked_account_number,
    invalid_amount_format,
    trade_without_execute_authority,
    large_transaction_no_approval,
    missing_audit_metadata,
    segregation_of_duties,
    financial_data_boundary,
    potential_mnpi_unflagged,
];

/// PII reaching a target without PII-domain access.
pub const PII_EXPOSURE: Rule = Rule::new(
    "FIN-PII-001",
    "pii_exposure_to_unauthorized_agent",
    Severity::Critical,
);
/// SSN-shaped value anywhere in the payload.
pub const SSN_IN_PAYLOAD: Rule = Rule::new("FIN-PII-002", "ssn_in_payload", Severity::Critical);
/// Account number with 8+ visible digits.
pub const UNMASKED_ACCOUNT_NUMBER: Rule =
    Rule::new("FIN-PII-003", "unmasked_account_number", Severity::High);
/// Amount that is not a number.
pub const INVALID_AMOUNT_FORMAT: Rule =
    Rule::new("FIN-AUTH-001", "invalid_amount_format", Severity::High);
/// Trade action sent to a target below EXECUTE.
pub const TRADE_WITHOUT_EXECUTE_AUTHORITY: Rule = Rule::new(
    "FIN-AUTH-002",
    "trade_without_execute_authority",
    Severity::Critical,
);
/// Amount above the approval threshold without `human_approved`.
pub const LARGE_TRANSACTION_NO_APPROVAL: Rule =
    Rule::new("FIN-AUTH-003", "large_transaction_no_approval", Severity::High);
/// SOX handoff without request id, timestamp or initiator.
pub const MISSING_AUDIT_METADATA: Rule =
    Rule::new("FIN-AUDIT-001", "missing_audit_metadata", Severity::High);
/// Approver and executor are the same agent.
pub const SEGREGATION_OF_DUTIES: Rule = Rule::new(
    "FIN-AUDIT-002",
    "segregation_of_duties_violation",
    Severity::Critical,
);
/// Financial data sent to a target without the financial-records domain.
pub const FINANCIAL_DATA_BOUNDARY: Rule = Rule::new(
    "FIN-DATA-001",
    "financial_data_boundary_violation",
    Severity::Critical,
);
/// MNPI keywords without `mnpi_reviewed`.
pub const POTENTIAL_MNPI_UNFLAGGED: Rule =
    Rule::new("FIN-SEC-001", "potential_mnpi_unflagged", Severity::High);

/// US Social Security number, dashed or bare.
#[expect(clippy::expect_used, reason = "literal pattern is exercised by unit tests")]
pub static SSN_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\d{3}-?\d{2}-?\d{4}\b").expect("SSN regex is valid"));

/// Sixteen-digit card number with optional separators.
#[expect(clippy::expect_used, reason = "literal pattern is exercised by unit tests")]
pub static CARD_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b\d{4}[- ]?\d{4}[- ]?\d{4}[- ]?\d{4}\b").expect("card regex is valid")
});

/// Eight or more consecutive digits, the shape of an account number.
#[expect(clippy::expect_used, reason = "literal pattern is exercised by unit tests")]
pub static LONG_DIGIT_RUN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\d{8,}").expect("digit run regex is valid"));

const PII_KEYS: [&str; 5] = [
    "ssn",
    "social_security",
    "tax_id",
    "date_of_birth",
    "passport_number",
];

const AMOUNT_KEYS: [&str; 2] = ["amount", "transaction_amount"];

const SOX_AUDIT_KEYS: [&str; 3] = ["request_id", "timestamp", "initiator"];

fn violation(rule: &Rule, message: impl Into<String>) -> Violation {
    Violation::new(rule, ViolationOrigin::Policy, message)
}

/// Visits every object entry at any depth.
fn any_entry(value: &Value, predicate: &mut impl FnMut(&str, &Value) -> bool) -> bool {
    match value {
        Value::Object(map) => map
            .iter()
            .any(|(key, child)| predicate(key, child) || any_entry(child, predicate)),
        Value::Array(items) => items.iter().any(|item| any_entry(item, predicate)),
        _ => false,
    }
}

fn serialized(value: &Value) -> String {
    value.to_string()
}

fn present(payload: &Value, key: &str) -> bool {
    payload.get(key).is_some_and(|value| !value.is_null())
}

/// Returns the first amount field and its parsed value.
fn amount(payload: &Value) -> Option<(&'static str, Result<f64, &Value>)> {
    AMOUNT_KEYS.iter().find_map(|key| {
        let value = payload.get(*key).filter(|value| !value.is_null())?;
        Some((*key, numeric_value(value).ok_or(value)))
    })
}

fn contains_pii(context: &PolicyContext<'_>) -> bool {
    let payload = context.payload();
    context
        .contract
        .fields()
        .iter()
        .any(|field| field.is_pii() && present(payload, field.name()))
        || any_entry(payload, &mut |key, _| {
            PII_KEYS.contains(&key.to_ascii_lowercase().as_str())
        })
        || SSN_PATTERN.is_match(&serialized(payload))
}

/// FIN-PII-001.
#[must_use]
pub fn pii_exposure(context: &PolicyContext<'_>, config: &FinancePackConfig) -> Option<Violation> {
    if context.target_has_domain(&config.pii_domain) || !contains_pii(context) {
        return None;
    }
    Some(
        violation(
            &PII_EXPOSURE,
            format!(
                "payload carries PII but target '{}' lacks the '{}' domain",
                context.record.target(),
                config.pii_domain
            ),
        )
        .with_evidence(json!({ "required_domain": config.pii_domain })),
    )
}

/// FIN-PII-002.
#[must_use]
pub fn ssn_in_payload(context: &PolicyContext<'_>, _config: &FinancePackConfig) -> Option<Violation> {
    let text = serialized(context.payload());
    let matches = SSN_PATTERN.find_iter(&text).count();
    (matches > 0).then(|| {
        violation(
            &SSN_IN_PAYLOAD,
            "payload contains a Social Security number pattern",
        )
        .with_evidence(json!({ "matches": matches }))
    })
}

/// FIN-PII-003.
#[must_use]
pub fn unmasked_account_number(
    context: &PolicyContext<'_>,
    _config: &FinancePackConfig,
) -> Option<Violation> {
    let mut offending = None;
    any_entry(context.payload(), &mut |key, value| {
        let digits = match value {
            Value::String(text) => text.clone(),
            Value::Number(number) => number.to_string(),
            _ => return false,
        };
        let hit = key.to_ascii_lowercase().contains("account") && LONG_DIGIT_RUN.is_match(&digits);
        if hit {
            offending = Some(key.to_owned());
        }
        hit
    });
    offending.map(|key| {
        violation(
            &UNMASKED_ACCOUNT_NUMBER,
            format!("field '{key}' exposes an unmasked account number"),
        )
        .with_field(key)
    })
}

/// FIN-AUTH-001.
#[must_use]
pub fn invalid_amount_format(
    context: &PolicyContext<'_>,
    _config: &FinancePackConfig,
) -> Option<Violation> {
    let (key, parsed) = amount(context.payload())?;
    let raw = parsed.err()?;
    Some(
        violation(
            &INVALID_AMOUNT_FORMAT,
            format!("field '{key}' is not a valid amount"),
        )
        .with_field(key)
        .with_evidence(raw.clone()),
    )
}

/// FIN-AUTH-002.
#[must_use]
pub fn trade_without_execute_authority(
    context: &PolicyContext<'_>,
    config: &FinancePackConfig,
) -> Option<Violation> {
    let action = requested_action(context.record)?.to_ascii_lowercase();
    if !config.trade_actions.iter().any(|trade| trade == &action) {
        return None;
    }
    let authority = context.target.map(|identity| identity.authority());
    if authority.is_some_and(|level| level.satisfies(AuthorityLevel::Execute)) {
        return None;
    }
    Some(
        violation(
            &TRADE_WITHOUT_EXECUTE_AUTHORITY,
            format!(
                "trade action '{action}' sent to '{}' without execute authority",
                context.record.target()
            ),
        )
        .with_field("action")
        .with_evidence(json!({ "action": action, "target_authority": authority })),
    )
}

/// FIN-AUTH-003.
#[must_use]
pub fn large_transaction_no_approval(
    context: &PolicyContext<'_>,
    config: &FinancePackConfig,
) -> Option<Violation> {
    let (key, parsed) = amount(context.payload())?;
    let value = parsed.ok()?;
    if value <= config.approval_threshold || context.record.metadata_flag("human_approved") {
        return None;
    }
    Some(
        violation(
            &LARGE_TRANSACTION_NO_APPROVAL,
            format!(
                "{key} {value} exceeds {} and is not marked human_approved",
                config.approval_threshold
            ),
        )
        .with_field(key)
        .with_evidence(json!({ "amount": value, "threshold": config.approval_threshold })),
    )
}

/// FIN-AUDIT-001.
#[must_use]
pub fn missing_audit_metadata(
    context: &PolicyContext<'_>,
    _config: &FinancePackConfig,
) -> Option<Violation> {
    if !context.contract.requires_scope(ComplianceScope::SOX) {
        return None;
    }
    let metadata = context.record.metadata();
    let missing: Vec<&str> = SOX_AUDIT_KEYS
        .into_iter()
        .filter(|key| metadata.get(*key).is_none_or(Value::is_null))
        .collect();
    if missing.is_empty() {
        return None;
    }
    Some(
        violation(
            &MISSING_AUDIT_METADATA,
            format!("SOX handoff is missing audit metadata: {}", missing.join(", ")),
        )
        .with_evidence(json!({ "missing": missing })),
    )
}

/// FIN-AUDIT-002.
#[must_use]
pub fn segregation_of_duties(
    context: &PolicyContext<'_>,
    _config: &FinancePackConfig,
) -> Option<Violation> {
    if !context.contract.requires_scope(ComplianceScope::SOX) {
        return None;
    }
    let metadata = context.record.metadata();
    let approver = metadata.get("approved_by").and_then(Value::as_str)?;
    let executor = metadata
        .get("executed_by")
        .and_then(Value::as_str)
        .unwrap_or_else(|| context.record.target().as_str());
    (approver == executor).then(|| {
        violation(
            &SEGREGATION_OF_DUTIES,
            format!("'{approver}' both approved and executes this handoff"),
        )
        .with_evidence(json!({ "approved_by": approver, "executed_by": executor }))
    })
}

/// FIN-DATA-001.
#[must_use]
pub fn financial_data_boundary(
    context: &PolicyContext<'_>,
    config: &FinancePackConfig,
) -> Option<Violation> {
    if context.target_has_domain(&config.financial_domain) {
        return None;
    }
    let payload = context.payload();
    let fields: Vec<&str> = context
        .contract
        .fields()
        .iter()
        .filter(|field| field.is_financial_data() && present(payload, field.name()))
        .map(|field| field.name())
        .collect();
    if fields.is_empty() {
        return None;
    }
    Some(
        violation(
            &FINANCIAL_DATA_BOUNDARY,
            format!(
                "financial data sent to '{}' without the '{}' domain",
                context.record.target(),
                config.financial_domain
            ),
        )
        .with_evidence(json!({ "fields": fields })),
    )
}

/// FIN-SEC-001.
#[must_use]
pub fn potential_mnpi_unflagged(
    context: &PolicyContext<'_>,
    config: &FinancePackConfig,
) -> Option<Violation> {
    if !context.contract.requires_scope(ComplianceScope::SEC)
        || context.record.metadata_flag("mnpi_reviewed")
    {
        return None;
    }
    let text = serialized(context.payload()).to_lowercase();
    let hits: Vec<&str> = config
        .mnpi_keywords
        .iter()
        .map(String::as_str)
        .filter(|keyword| text.contains(keyword))
        .collect();
    if hits.is_empty() {
        return None;
    }
    Some(
        violation(
            &POTENTIAL_MNPI_UNFLAGGED,
            "payload may contain material non-public information and is not marked mnpi_reviewed",
        )
        .with_evidence(json!({ "keywords": hits })),
    )
}
