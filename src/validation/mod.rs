//! The three-stage validation pipeline.
//!
//! [`engine::ValidationEngine`] runs [`schema`], [`authority`] and the policy
//! packs in that order over one [`domain::HandoffRecord`] and resolves a
//! [`domain::Verdict`] with a fixed mapping: any CRITICAL or HIGH violation
//! fails, MEDIUM or LOW only warns.

pub mod authority;
pub mod domain;
pub mod engine;
pub mod schema;

pub use engine::ValidationEngine;

#[cfg(test)]
mod tests;
