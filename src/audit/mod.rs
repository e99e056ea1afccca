//! Append-only audit trail of validation decisions.
//!
//! The [`AuditLogger`] sequences entries, keeps a bounded in-memory window
//! and hands each entry to a background writer for the durable
//! [`ports::AuditStore`]. A failed durable write is reported out of band and
//! never reaches the caller that produced the entry.
//!
//! - Domain types in [`domain`]
//! - The store port in [`ports`]
//! - Store adapters in [`adapters`]
//! - The sequencing logger in [`logger`]

pub mod adapters;
pub mod domain;
pub mod logger;
pub mod ports;

pub use logger::{AuditLogger, AuditPersistenceError};

#[cfg(test)]
mod tests;
