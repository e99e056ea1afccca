//! Diesel row models for audit persistence.

use super::schema::handoff_audit_entries;
use chrono::{DateTime, Utc};
use diesel::prelude::*;
use serde_json::Value;

/// Query result row for audit entries.
#[derive(Debug, Clone, Queryable, Selectable)]
#[diesel(table_name = handoff_audit_entries)]
#[diesel(check_for_backend(diesel::pg::Pg))]
pub struct AuditEntryRow {
    pub sequence_id: i64,
    pub trace_id: String,
    pub source: String,
    pub target: String,
    pub contract: Option<String>,
    pub compliance_scopes: Value,
    pub mode: String,
    pub verdict: String,
    pub blocked: bool,
    pub violations: Value,
    pub timings: Value,
    pub payload: Value,
    pub payload_hash: String,
    pub metadata: Value,
    pub handoff_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}

/// Insert model for audit entries.
#[derive(Debug, Clone, Insertable)]
#[diesel(table_name = handoff_audit_entries)]
pub struct NewAuditEntryRow {
    pub sequence_id: i64,
    pub trace_id: String,
    pub source: String,
    pub target: String,
    pub contract: Option<String>,
    pub compliance_scopes: Value,
    pub mode: String,
    pub verdict: String,
    pub blocked: bool,
    pub violations: Value,
    pub timings: Value,
    pub payload: Value,
    pub payload_hash: String,
    pub metadata: Value,
    pub handoff_at: DateTime<Utc>,
    pub recorded_at: DateTime<Utc>,
}
