//! Reference finance compliance pack.
//!
//! Covers SOX, SEC, FINRA and PCI-DSS contracts. Each rule lives in
//! [`rules`] as an independent check that yields at most one violation.

pub mod rules;

use super::masking::{MaskingRules, ValueMask};
use super::ports::{PolicyContext, PolicyPack, PolicyPackError};
use crate::config::FinancePackConfig;
use crate::registry::domain::ComplianceScope;
use crate::validation::domain::Violation;

/// Stable name of the finance pack.
pub const FINANCE_PACK_NAME: &str = "finance_v1";

/// Keys masked before persistence whenever the finance pack is registered.
const MASKED_KEYS: [&str; 17] = [
    "ssn",
    "social_security",
    "tax_id",
    "account_number",
    "bank_account",
    "card_number",
    "credit_card",
    "routing_number",
    "password",
    "passwd",
    "secret",
    "secret_key",
    "token",
    "api_key",
    "apikey",
    "access_key",
    "private_key",
];

fn standard_scopes() -> Vec<ComplianceScope> {
    [
        ComplianceScope::SOX,
        ComplianceScope::SEC,
        ComplianceScope::FINRA,
        ComplianceScope::PCI_DSS,
    ]
    .into_iter()
    .map(ComplianceScope::new)
    .collect()
}

/// Finance compliance pack.
#[derive(Debug, Clone)]
pub struct FinancePolicyPack {
    config: FinancePackConfig,
    scopes: Vec<ComplianceScope>,
}

impl FinancePolicyPack {
    /// Creates the pack with explicit settings.
    ///
    /// # Errors
    ///
    /// Returns [`PolicyPackError::Configuration`] when the approval threshold
    /// is not a finite, non-negative number.
    pub fn new(config: FinancePackConfig) -> Result<Self, PolicyPackError> {
        if !config.approval_threshold.is_finite() || config.approval_threshold < 0.0 {
            return Err(PolicyPackError::Configuration {
                pack: FINANCE_PACK_NAME.to_owned(),
                message: format!(
                    "approval_threshold must be a non-negative number, got {}",
                    config.approval_threshold
                ),
            });
        }
        Ok(Self {
            config,
            scopes: standard_scopes(),
        })
    }

    /// Returns the pack settings.
    #[must_use]
    pub const fn config(&self) -> &FinancePackConfig {
        &self.config
    }
}

impl Default for FinancePolicyPack {
    fn default() -> Self {
        Self {
            config: FinancePackConfig::default(),
            scopes: standard_scopes(),
        }
    }
}

impl PolicyPack for FinancePolicyPack {
    fn name(&self) -> &str {
        FINANCE_PACK_NAME
    }

    fn scopes(&self) -> &[ComplianceScope] {
        &self.scopes
    }

    fn evaluate(&self, context: &PolicyContext<'_>) -> Result<Vec<Violation>, PolicyPackError> {
        Ok(rules::CHECKS
            .iter()
            .filter_map(|check| check(context, &self.config))
            .collect())
    }

    fn masking_rules(&self) -> MaskingRules {
        MaskingRules::default()
            .with_keys(MASKED_KEYS)
            .with_value_mask(ValueMask::new(rules::SSN_PATTERN.clone(), "***-**-****"))
            .with_value_mask(ValueMask::new(
                rules::CARD_PATTERN.clone(),
                "****-****-****-****",
            ))
            .with_keyed_mask(
                "account",
                ValueMask::new(rules::LONG_DIGIT_RUN.clone(), "********"),
            )
    }
}
