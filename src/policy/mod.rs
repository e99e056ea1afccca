//! Pluggable compliance policy packs.
//!
//! A pack is a pure function of one handoff. Packs declare the compliance
//! scopes they cover; the [`PolicyDispatcher`] runs every pack whose scopes
//! intersect the contract's required scopes and turns a failing pack into a
//! violation instead of an error.
//!
//! - The pack interface in [`ports`]
//! - Scope-based dispatch in [`dispatcher`]
//! - Pack-driven payload masking in [`masking`]
//! - The reference finance pack in [`finance`]

pub mod dispatcher;
pub mod finance;
pub mod masking;
pub mod ports;

pub use dispatcher::PolicyDispatcher;
pub use finance::FinancePolicyPack;
pub use masking::{MaskingRules, PayloadMasker, ValueMask};
pub use ports::{PolicyContext, PolicyPack, PolicyPackError};

#[cfg(test)]
mod tests;
