//! `PostgreSQL` implementation of the audit store.

use super::{
    models::{AuditEntryRow, NewAuditEntryRow},
    schema::handoff_audit_entries,
};
use crate::audit::{
    domain::{AuditEntry, AuditQuery, SequenceId},
    ports::{AuditStore, AuditStoreError, AuditStoreResult},
};
use crate::registry::domain::{AgentName, ContractMode, ContractName};
use crate::validation::domain::{TraceId, Verdict};
use async_trait::async_trait;
use diesel::pg::PgConnection;
use diesel::prelude::*;
use diesel::r2d2::{ConnectionManager, Pool};
use diesel::result::{DatabaseErrorKind, Error as DieselError};

/// `PostgreSQL` connection pool type used by the audit store.
pub type AuditPgPool = Pool<ConnectionManager<PgConnection>>;

/// `PostgreSQL`-backed append-only audit store.
#[derive(Debug, Clone)]
pub struct PostgresAuditStore {
    pool: AuditPgPool,
}

impl PostgresAuditStore {
    /// Creates a new store from a `PostgreSQL` connection pool.
    #[must_use]
    pub const fn new(pool: AuditPgPool) -> Self {
        Self { pool }
    }

    async fn run_blocking<F, T>(&self, f: F) -> AuditStoreResult<T>
    where
        F: FnOnce(&mut PgConnection) -> AuditStoreResult<T> + Send + 'static,
        T: Send + 'static,
    {
        let pool = self.pool.clone();
        tokio::task::spawn_blocking(move || {
            let mut connection = pool.get().map_err(AuditStoreError::persistence)?;
            f(&mut connection)
        })
        .await
        .map_err(AuditStoreError::persistence)?
    }
}

#[async_trait]
impl AuditStore for PostgresAuditStore {
    async fn append(&self, entry: &AuditEntry) -> AuditStoreResult<()> {
        let sequence_id = entry.sequence_id;
        let new_row = to_new_row(entry)?;

        self.run_blocking(move |connection| {
            diesel::insert_into(handoff_audit_entries::table)
                .values(&new_row)
                .execute(connection)
                .map_err(|err| match err {
                    DieselError::DatabaseError(DatabaseErrorKind::UniqueViolation, _) => {
                        AuditStoreError::DuplicateSequence(sequence_id)
                    }
                    _ => AuditStoreError::persistence(err),
                })?;
            Ok(())
        })
        .await
    }

    async fn query(&self, filter: &AuditQuery) -> AuditStoreResult<Vec<AuditEntry>> {
        let owned = filter.clone();
        self.run_blocking(move |connection| {
            let mut statement = handoff_audit_entries::table
                .select(AuditEntryRow::as_select())
                .order(handoff_audit_entries::sequence_id.desc())
                .into_boxed();

            if let Some(source) = owned.source.as_ref() {
                statement = statement.filter(handoff_audit_entries::source.eq(source.as_str().to_owned()));
            }
            if let Some(target) = owned.target.as_ref() {
                statement = statement.filter(handoff_audit_entries::target.eq(target.as_str().to_owned()));
            }
            if let Some(passed) = owned.passed {
                let pass = Verdict::Pass.as_str();
                statement = if passed {
                    statement.filter(handoff_audit_entries::verdict.eq(pass))
                } else {
                    statement.filter(handoff_audit_entries::verdict.ne(pass))
                };
            }
            if let Some(verdict) = owned.verdict {
                statement = statement.filter(handoff_audit_entries::verdict.eq(verdict.as_str()));
            }
            if let Some(blocked) = owned.blocked {
                statement = statement.filter(handoff_audit_entries::blocked.eq(blocked));
            }
            if let Some(contract) = owned.contract.as_ref() {
                statement = statement
                    .filter(handoff_audit_entries::contract.eq(contract.as_str().to_owned()));
            }
            if let Some(trace_id) = owned.trace_id.as_ref() {
                statement = statement
                    .filter(handoff_audit_entries::trace_id.eq(trace_id.as_str().to_owned()));
            }
            if let Some(start) = owned.time_range.start {
                statement = statement.filter(handoff_audit_entries::handoff_at.ge(start));
            }
            if let Some(end) = owned.time_range.end {
                statement = statement.filter(handoff_audit_entries::handoff_at.lt(end));
            }

            // Scopes live in a JSON column and are filtered after loading,
            // so paging can only move into SQL when no scope is requested.
            let paged_in_sql = owned.scope.is_none();
            if paged_in_sql {
                statement = statement.offset(to_sql_count(owned.offset));
                if let Some(limit) = owned.limit {
                    statement = statement.limit(to_sql_count(limit));
                }
            }

            let rows = statement
                .load::<AuditEntryRow>(connection)
                .map_err(AuditStoreError::persistence)?;
            let entries = rows
                .into_iter()
                .map(row_to_entry)
                .collect::<AuditStoreResult<Vec<_>>>()?;

            Ok(if paged_in_sql {
                owned.unpaged().apply(entries)
            } else {
                owned.apply(entries)
            })
        })
        .await
    }

    async fn last_sequence(&self) -> AuditStoreResult<Option<SequenceId>> {
        self.run_blocking(|connection| {
            let highest = handoff_audit_entries::table
                .select(diesel::dsl::max(handoff_audit_entries::sequence_id))
                .get_result::<Option<i64>>(connection)
                .map_err(AuditStoreError::persistence)?;
            highest
                .map(|value| {
                    u64::try_from(value)
                        .map(SequenceId::new)
                        .map_err(AuditStoreError::invalid_data)
                })
                .transpose()
        })
        .await
    }
}

fn to_sql_count(value: usize) -> i64 {
    i64::try_from(value).unwrap_or(i64::MAX)
}

fn to_new_row(entry: &AuditEntry) -> AuditStoreResult<NewAuditEntryRow> {
    let sequence_id =
        i64::try_from(entry.sequence_id.value()).map_err(AuditStoreError::persistence)?;
    Ok(NewAuditEntryRow {
        sequence_id,
        trace_id: entry.trace_id.as_str().to_owned(),
        source: entry.source.as_str().to_owned(),
        target: entry.target.as_str().to_owned(),
        contract: entry.contract.as_ref().map(|name| name.as_str().to_owned()),
        compliance_scopes: serde_json::to_value(&entry.compliance_scopes)
            .map_err(AuditStoreError::persistence)?,
        mode: entry.mode.as_str().to_owned(),
        verdict: entry.verdict.as_str().to_owned(),
        blocked: entry.blocked,
        violations: serde_json::to_value(&entry.violations)
            .map_err(AuditStoreError::persistence)?,
        timings: serde_json::to_value(entry.timings).map_err(AuditStoreError::persistence)?,
        payload: entry.payload.clone(),
        payload_hash: entry.payload_hash.clone(),
        metadata: serde_json::Value::Object(entry.metadata.clone()),
        handoff_at: entry.handoff_at,
        recorded_at: entry.recorded_at,
    })
}

fn row_to_entry(row: AuditEntryRow) -> AuditStoreResult<AuditEntry> {
    let AuditEntryRow {
        sequence_id,
        trace_id,
        source,
        target,
        contract,
        compliance_scopes,
        mode,
        verdict,
        blocked,
        violations,
        timings,
        payload,
        payload_hash,
        metadata,
        handoff_at,
        recorded_at,
    } = row;

    let parsed_sequence = u64::try_from(sequence_id).map_err(AuditStoreError::invalid_data)?;
    let parsed_contract = contract
        .map(ContractName::new)
        .transpose()
        .map_err(AuditStoreError::invalid_data)?;
    let parsed_metadata = match metadata {
        serde_json::Value::Object(map) => map,
        serde_json::Value::Null => serde_json::Map::new(),
        other => {
            return Err(AuditStoreError::invalid_data(std::io::Error::other(format!(
                "audit metadata must be an object, found {other}"
            ))));
        }
    };

    Ok(AuditEntry {
        sequence_id: SequenceId::new(parsed_sequence),
        trace_id: TraceId::new(trace_id).map_err(AuditStoreError::invalid_data)?,
        source: AgentName::new(source).map_err(AuditStoreError::invalid_data)?,
        target: AgentName::new(target).map_err(AuditStoreError::invalid_data)?,
        contract: parsed_contract,
        compliance_scopes: serde_json::from_value(compliance_scopes)
            .map_err(AuditStoreError::invalid_data)?,
        mode: ContractMode::try_from(mode.as_str()).map_err(AuditStoreError::invalid_data)?,
        verdict: Verdict::try_from(verdict.as_str()).map_err(AuditStoreError::invalid_data)?,
        blocked,
        violations: serde_json::from_value(violations).map_err(AuditStoreError::invalid_data)?,
        timings: serde_json::from_value(timings).map_err(AuditStoreError::invalid_data)?,
        payload,
        payload_hash,
        metadata: parsed_metadata,
        handoff_at,
        recorded_at,
    })
}
