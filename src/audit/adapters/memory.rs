//! In-memory audit store.

use crate::audit::domain::{AuditEntry, AuditQuery, SequenceId};
use crate::audit::ports::{AuditStore, AuditStoreError, AuditStoreResult};
use async_trait::async_trait;
use std::collections::BTreeMap;
use std::sync::{Arc, RwLock};

/// In-memory implementation of [`AuditStore`].
///
/// Thread-safe via internal [`RwLock`]. Clones share the same entries.
#[derive(Debug, Clone, Default)]
pub struct InMemoryAuditStore {
    entries: Arc<RwLock<BTreeMap<SequenceId, AuditEntry>>>,
}

impl InMemoryAuditStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the number of stored entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.read().map(|guard| guard.len()).unwrap_or(0)
    }

    /// Returns `true` if no entries are stored.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

#[async_trait]
impl AuditStore for InMemoryAuditStore {
    async fn append(&self, entry: &AuditEntry) -> AuditStoreResult<()> {
        let mut guard = self
            .entries
            .write()
            .map_err(|err| AuditStoreError::persistence(std::io::Error::other(err.to_string())))?;
        if guard.contains_key(&entry.sequence_id) {
            return Err(AuditStoreError::DuplicateSequence(entry.sequence_id));
        }
        guard.insert(entry.sequence_id, entry.clone());
        Ok(())
    }

    async fn query(&self, filter: &AuditQuery) -> AuditStoreResult<Vec<AuditEntry>> {
        let guard = self
            .entries
            .read()
            .map_err(|err| AuditStoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(filter.apply(guard.values().cloned()))
    }

    async fn last_sequence(&self) -> AuditStoreResult<Option<SequenceId>> {
        let guard = self
            .entries
            .read()
            .map_err(|err| AuditStoreError::persistence(std::io::Error::other(err.to_string())))?;
        Ok(guard.keys().next_back().copied())
    }
}
