//! Handoff guard: contract validation for agent-to-agent handoffs.
//!
//! Every payload one agent passes to another is checked against a
//! registered contract before it is delivered, and every decision is
//! written to an append-only audit log.
//!
//! # Architecture
//!
//! The crate follows hexagonal architecture principles:
//!
//! - **Domain**: Contracts, identities, violations and audit entries with no
//!   infrastructure dependencies
//! - **Ports**: Trait seams for policy packs, the natural-language judge and
//!   the durable audit store
//! - **Adapters**: In-memory and `PostgreSQL` audit stores
//!
//! # Modules
//!
//! - [`registry`]: Agent identities, handoff contracts and coverage
//! - [`validation`]: Schema and authority checks and the staged engine
//! - [`policy`]: Policy pack dispatch, masking and the finance pack
//! - [`judge`]: Optional natural-language rule judge port
//! - [`guard`]: The call-boundary interceptor with fail-closed blocking
//! - [`audit`]: Sequenced audit log, queries and compliance reports
//! - [`config`]: Guard configuration

pub mod audit;
pub mod config;
pub mod guard;
pub mod judge;
pub mod policy;
pub mod registry;
pub mod validation;
