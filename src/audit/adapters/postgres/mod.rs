//! `PostgreSQL` adapter for the durable audit store.

mod models;
mod repository;
mod schema;

pub use repository::{AuditPgPool, PostgresAuditStore};
