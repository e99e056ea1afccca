//! Call-boundary guard around agent-to-agent handoffs.
//!
//! [`HandoffGuard`] resolves the governing contract, runs the validation
//! engine, optionally consults a natural-language judge, records the audit
//! entry and then either forwards the payload or refuses it with
//! [`HandoffBlockedError`].

pub mod a2a;
mod error;
mod request;
mod service;

pub use a2a::{VALIDATION_METADATA_KEY, a2a_metadata, a2a_payload, annotate_a2a_message};
pub use error::HandoffBlockedError;
pub use request::{ForwardedHandoff, HandoffRequest};
pub use service::HandoffGuard;

#[cfg(test)]
mod tests;
