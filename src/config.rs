//! Runtime settings for the guard, the audit logger and the finance pack.
//!
//! Every section has defaults, so an empty TOML document is a valid
//! configuration.
//!
//! ```
//! use handoff_guard::config::GuardConfig;
//! use handoff_guard::registry::domain::ContractMode;
//!
//! let config = GuardConfig::from_toml_str(
//!     r#"
//!     uncovered_mode = "warn"
//!
//!     [audit]
//!     buffer_capacity = 64
//!     "#,
//! )
//! .expect("valid config");
//!
//! assert_eq!(config.uncovered_mode, ContractMode::Warn);
//! assert_eq!(config.audit.buffer_capacity, 64);
//! assert_eq!(config.audit.queue_capacity, 256);
//! ```

use crate::policy::masking::DEFAULT_MASK_TOKEN;
use crate::registry::domain::ContractMode;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

/// Errors raised while loading configuration.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// The document is not valid TOML or does not match the schema.
    #[error("invalid configuration: {0}")]
    Parse(String),
}

/// Top-level configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuardConfig {
    /// Mode applied to handoffs that no contract governs.
    pub uncovered_mode: ContractMode,
    /// Audit logger settings.
    pub audit: AuditConfig,
    /// Natural-language judge settings.
    pub judge: JudgeConfig,
    /// Finance pack settings.
    pub finance: FinancePackConfig,
}

impl Default for GuardConfig {
    fn default() -> Self {
        Self {
            uncovered_mode: ContractMode::Block,
            audit: AuditConfig::default(),
            judge: JudgeConfig::default(),
            finance: FinancePackConfig::default(),
        }
    }
}

impl GuardConfig {
    /// Uncovered handoffs are forwarded with a warning.
    #[must_use]
    pub fn lenient() -> Self {
        Self {
            uncovered_mode: ContractMode::Warn,
            ..Self::default()
        }
    }

    /// Uncovered handoffs are blocked and the judge gets a tight budget.
    #[must_use]
    pub fn strict() -> Self {
        Self {
            uncovered_mode: ContractMode::Block,
            judge: JudgeConfig { timeout_ms: 500 },
            ..Self::default()
        }
    }

    /// Parses a TOML document.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Parse`] when the document is malformed.
    pub fn from_toml_str(document: &str) -> Result<Self, ConfigError> {
        toml::from_str(document).map_err(|err| ConfigError::Parse(err.to_string()))
    }
}

/// Audit logger settings.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AuditConfig {
    /// Entries kept in memory.
    pub buffer_capacity: usize,
    /// Entries waiting for the durable writer.
    pub queue_capacity: usize,
    /// Capacity of the live entry and error feeds.
    pub event_capacity: usize,
    /// Replacement for masked values.
    pub mask_token: String,
}

impl Default for AuditConfig {
    fn default() -> Self {
        Self {
            buffer_capacity: 1024,
            queue_capacity: 256,
            event_capacity: 256,
            mask_token: DEFAULT_MASK_TOKEN.to_owned(),
        }
    }
}

/// Natural-language judge settings.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JudgeConfig {
    /// Budget for one judge call, in milliseconds.
    pub timeout_ms: u64,
}

impl Default for JudgeConfig {
    fn default() -> Self {
        Self { timeout_ms: 2000 }
    }
}

impl JudgeConfig {
    /// Returns the timeout as a [`Duration`].
    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

/// Finance pack settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FinancePackConfig {
    /// Amount above which `human_approved` is required.
    pub approval_threshold: f64,
    /// Domain tag granting access to PII.
    pub pii_domain: String,
    /// Domain tag granting access to financial records.
    pub financial_domain: String,
    /// Actions that count as trades.
    pub trade_actions: Vec<String>,
    /// Lower-case keywords hinting at material non-public information.
    pub mnpi_keywords: Vec<String>,
}

impl Default for FinancePackConfig {
    fn default() -> Self {
        let owned = |items: &[&str]| items.iter().map(|item| (*item).to_owned()).collect();
        Self {
            approval_threshold: 10_000.0,
            pii_domain: "pii".to_owned(),
            financial_domain: "financial_records".to_owned(),
            trade_actions: owned(&[
                "buy",
                "sell",
                "trade",
                "execute_order",
                "place_order",
                "transfer",
            ]),
            mnpi_keywords: owned(&[
                "earnings",
                "merger",
                "acquisition",
                "insider",
                "material",
                "non-public",
                "nonpublic",
                "pre-release",
                "guidance",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    fn empty_document_yields_defaults() {
        let config = GuardConfig::from_toml_str("").expect("empty document parses");

        assert_eq!(config, GuardConfig::default());
        assert_eq!(config.uncovered_mode, ContractMode::Block);
        assert_eq!(config.audit.mask_token, DEFAULT_MASK_TOKEN);
    }

    #[rstest]
    fn sections_override_defaults() {
        let config = GuardConfig::from_toml_str(
            r#"
            uncovered_mode = "warn"

            [judge]
            timeout_ms = 250

            [finance]
            approval_threshold = 5000.0
            mnpi_keywords = ["merger"]
            "#,
        )
        .expect("document parses");

        assert_eq!(config.uncovered_mode, ContractMode::Warn);
        assert_eq!(config.judge.timeout(), Duration::from_millis(250));
        assert_eq!(config.finance.mnpi_keywords, vec!["merger".to_owned()]);
        assert_eq!(config.finance.pii_domain, "pii");
        assert_eq!(config.audit.buffer_capacity, 1024);
    }

    #[rstest]
    #[case("uncovered_mode = 3")]
    #[case("[audit]\nbuffer_capacity = \"lots\"")]
    fn malformed_documents_are_rejected(#[case] document: &str) {
        assert!(matches!(
            GuardConfig::from_toml_str(document),
            Err(ConfigError::Parse(_))
        ));
    }

    #[rstest]
    fn presets_differ_only_where_documented() {
        let lenient = GuardConfig::lenient();
        let strict = GuardConfig::strict();

        assert_eq!(lenient.uncovered_mode, ContractMode::Warn);
        assert_eq!(lenient.judge, JudgeConfig::default());
        assert_eq!(strict.uncovered_mode, ContractMode::Block);
        assert_eq!(strict.judge.timeout_ms, 500);
        assert_eq!(strict.audit, AuditConfig::default());
    }
}
