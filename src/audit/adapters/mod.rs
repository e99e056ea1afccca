//! Audit store adapters.

pub mod memory;
pub mod postgres;

pub use memory::InMemoryAuditStore;
pub use postgres::PostgresAuditStore;
