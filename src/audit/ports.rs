//! Durable audit store port.

use super::domain::{AuditEntry, AuditQuery, SequenceId};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for audit store operations.
pub type AuditStoreResult<T> = Result<T, AuditStoreError>;

/// Append-only persistence for audit entries.
///
/// Implementations never update or delete an entry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait AuditStore: Send + Sync {
    /// Appends one entry.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError::DuplicateSequence`] when the sequence id is
    /// already stored, or [`AuditStoreError::Persistence`] when the write
    /// fails.
    async fn append(&self, entry: &AuditEntry) -> AuditStoreResult<()>;

    /// Returns matching entries, newest first.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the read fails or a stored entry
    /// cannot be decoded.
    async fn query(&self, filter: &AuditQuery) -> AuditStoreResult<Vec<AuditEntry>>;

    /// Returns the highest stored sequence id, or `None` for an empty store.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError::Persistence`] when the read fails.
    async fn last_sequence(&self) -> AuditStoreResult<Option<SequenceId>>;
}

/// Errors returned by audit store implementations.
#[derive(Debug, Clone, Error)]
pub enum AuditStoreError {
    /// An entry with the same sequence id is already stored.
    #[error("audit entry {0} already stored")]
    DuplicateSequence(SequenceId),

    /// A stored entry could not be decoded.
    #[error("invalid persisted audit data: {0}")]
    InvalidPersistedData(Arc<dyn std::error::Error + Send + Sync>),

    /// Persistence-layer failure.
    #[error("audit persistence error: {0}")]
    Persistence(Arc<dyn std::error::Error + Send + Sync>),
}

impl AuditStoreError {
    /// Wraps a persistence-layer error.
    pub fn persistence(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Persistence(Arc::new(err))
    }

    /// Wraps a decoding error from a stored row.
    pub fn invalid_data(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::InvalidPersistedData(Arc::new(err))
    }
}
