//! Sequencing audit logger with a background durable writer.

use super::domain::{AuditDraft, AuditEntry, AuditQuery, ComplianceReport, SequenceId, TimeRange};
use super::ports::{AuditStore, AuditStoreError, AuditStoreResult};
use crate::config::AuditConfig;
use crate::registry::domain::ComplianceScope;
use mockable::Clock;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};
use thiserror::Error;
use tokio::sync::{broadcast, mpsc, oneshot};

/// Out-of-band failures of the audit pipeline.
///
/// These never propagate to the caller that recorded the entry; they are
/// logged and published on [`AuditLogger::subscribe_errors`].
#[derive(Debug, Clone, Error)]
pub enum AuditPersistenceError {
    /// The durable store rejected or failed to write an entry.
    #[error("failed to persist audit entry {sequence_id}: {source}")]
    Store {
        /// Entry that was not persisted.
        sequence_id: SequenceId,
        /// Store failure.
        source: AuditStoreError,
    },

    /// The writer queue was full; the entry lives only in memory.
    #[error("audit writer queue full; entry {0} not queued for persistence")]
    QueueFull(SequenceId),

    /// The background writer has stopped.
    #[error("audit writer closed")]
    WriterClosed(Option<SequenceId>),

    /// An entry that never reached the store left the in-memory window.
    #[error("audit entry {0} evicted before persistence")]
    Evicted(SequenceId),
}

#[derive(Debug)]
enum WriterCommand {
    Append(Box<AuditEntry>),
    Flush(oneshot::Sender<()>),
}

/// Where a buffered entry stands with the durable store.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Durability {
    /// Handed to the writer, not yet written.
    Queued,
    /// Written to the store.
    Persisted,
    /// Never reached the store; memory holds the only copy.
    Failed,
}

#[derive(Debug)]
struct BufferedEntry {
    entry: AuditEntry,
    durability: Durability,
}

#[derive(Debug)]
struct LoggerState {
    next_sequence: SequenceId,
    buffer: VecDeque<BufferedEntry>,
}

impl LoggerState {
    /// Drops entries beyond `capacity`, persisted ones first, otherwise the
    /// oldest.
    ///
    /// Returns the ids of dropped entries that never reached the store.
    /// Queued entries are still held by the writer and are not reported.
    fn evict(&mut self, capacity: usize) -> Vec<SequenceId> {
        let mut lost = Vec::new();
        while self.buffer.len() > capacity {
            let index = self
                .buffer
                .iter()
                .position(|buffered| buffered.durability == Durability::Persisted)
                .unwrap_or(0);
            if let Some(evicted) = self
                .buffer
                .remove(index)
                .filter(|buffered| buffered.durability == Durability::Failed)
            {
                lost.push(evicted.entry.sequence_id);
            }
        }
        lost
    }

    fn mark(&mut self, sequence_id: SequenceId, durability: Durability) {
        if let Ok(index) = self
            .buffer
            .binary_search_by_key(&sequence_id, |buffered| buffered.entry.sequence_id)
            && let Some(buffered) = self.buffer.get_mut(index)
        {
            buffered.durability = durability;
        }
    }
}

#[derive(Debug)]
struct Shared {
    state: Mutex<LoggerState>,
    capacity: usize,
    entries: broadcast::Sender<AuditEntry>,
    errors: broadcast::Sender<AuditPersistenceError>,
}

impl Shared {
    fn lock(&self) -> MutexGuard<'_, LoggerState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn report(&self, error: AuditPersistenceError) {
        tracing::warn!(error = %error, "audit persistence failure");
        if self.errors.send(error).is_err() {
            tracing::trace!("no audit error subscribers");
        }
    }
}

/// Assigns sequence ids, keeps a bounded window of recent entries and
/// forwards every entry to a background writer.
///
/// Clones share the same log.
pub struct AuditLogger<C> {
    shared: Arc<Shared>,
    writer: mpsc::Sender<WriterCommand>,
    store: Arc<dyn AuditStore>,
    clock: Arc<C>,
}

impl<C> Clone for AuditLogger<C> {
    fn clone(&self) -> Self {
        Self {
            shared: Arc::clone(&self.shared),
            writer: self.writer.clone(),
            store: Arc::clone(&self.store),
            clock: Arc::clone(&self.clock),
        }
    }
}

impl<C> std::fmt::Debug for AuditLogger<C> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AuditLogger")
            .field("capacity", &self.shared.capacity)
            .finish_non_exhaustive()
    }
}

impl<C> AuditLogger<C>
where
    C: Clock + Send + Sync,
{
    /// Starts a logger and its background writer.
    ///
    /// Sequence ids continue after the highest id already in `store`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the store cannot report its highest
    /// sequence id.
    ///
    /// # Panics
    ///
    /// Panics if called outside a Tokio runtime.
    pub async fn spawn(
        store: Arc<dyn AuditStore>,
        clock: Arc<C>,
        config: &AuditConfig,
    ) -> AuditStoreResult<Self> {
        let next_sequence = store
            .last_sequence()
            .await?
            .map_or(SequenceId::new(1), SequenceId::next);
        let (writer, receiver) = mpsc::channel(config.queue_capacity.max(1));
        let (entries, _) = broadcast::channel(config.event_capacity.max(1));
        let (errors, _) = broadcast::channel(config.event_capacity.max(1));
        let shared = Arc::new(Shared {
            state: Mutex::new(LoggerState {
                next_sequence,
                buffer: VecDeque::new(),
            }),
            capacity: config.buffer_capacity.max(1),
            entries,
            errors,
        });

        tokio::spawn(run_writer(Arc::clone(&store), Arc::clone(&shared), receiver));
        tracing::debug!(next_sequence = %next_sequence, "audit logger started");

        Ok(Self {
            shared,
            writer,
            store,
            clock,
        })
    }

    /// Sequences `draft` and queues it for persistence.
    ///
    /// Never blocks on the durable store and never fails; persistence
    /// problems surface through [`Self::subscribe_errors`].
    pub fn record(&self, draft: AuditDraft) -> SequenceId {
        let mut state = self.shared.lock();
        let sequence_id = state.next_sequence;
        state.next_sequence = sequence_id.next();
        let entry = draft.into_entry(sequence_id, self.clock.utc());
        // Enqueue under the lock so the writer sees entries in sequence order.
        let queued = self
            .writer
            .try_send(WriterCommand::Append(Box::new(entry.clone())));
        let durability = if queued.is_ok() {
            Durability::Queued
        } else {
            Durability::Failed
        };
        state.buffer.push_back(BufferedEntry {
            entry: entry.clone(),
            durability,
        });
        let lost = state.evict(self.shared.capacity);
        drop(state);

        match queued {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(_)) => {
                self.shared.report(AuditPersistenceError::QueueFull(sequence_id));
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                self.shared
                    .report(AuditPersistenceError::WriterClosed(Some(sequence_id)));
            }
        }
        for evicted in lost {
            self.shared.report(AuditPersistenceError::Evicted(evicted));
        }

        tracing::debug!(
            sequence_id = %sequence_id,
            trace_id = %entry.trace_id,
            verdict = %entry.verdict,
            "audit entry recorded"
        );
        if self.shared.entries.send(entry).is_err() {
            tracing::trace!("no audit entry subscribers");
        }
        sequence_id
    }

    /// Waits until every entry recorded so far has been handed to the store.
    ///
    /// # Errors
    ///
    /// Returns [`AuditPersistenceError::WriterClosed`] if the writer has
    /// stopped.
    pub async fn flush(&self) -> Result<(), AuditPersistenceError> {
        let (ack, done) = oneshot::channel();
        self.writer
            .send(WriterCommand::Flush(ack))
            .await
            .map_err(|_| AuditPersistenceError::WriterClosed(None))?;
        done.await
            .map_err(|_| AuditPersistenceError::WriterClosed(None))
    }

    /// Live feed of recorded entries.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<AuditEntry> {
        self.shared.entries.subscribe()
    }

    /// Live feed of persistence failures.
    #[must_use]
    pub fn subscribe_errors(&self) -> broadcast::Receiver<AuditPersistenceError> {
        self.shared.errors.subscribe()
    }

    /// Entries still held in memory that match `filter`, newest first.
    #[must_use]
    pub fn recent(&self, filter: &AuditQuery) -> Vec<AuditEntry> {
        let state = self.shared.lock();
        filter.apply(state.buffer.iter().map(|buffered| buffered.entry.clone()))
    }

    /// Number of entries held in memory.
    #[must_use]
    pub fn buffered_len(&self) -> usize {
        self.shared.lock().buffer.len()
    }

    /// Id of the most recently recorded entry.
    #[must_use]
    pub fn last_sequence(&self) -> Option<SequenceId> {
        self.shared
            .lock()
            .buffer
            .back()
            .map(|buffered| buffered.entry.sequence_id)
    }

    /// Queries the durable store and the in-memory window together.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the store query fails.
    pub async fn query(&self, filter: &AuditQuery) -> AuditStoreResult<Vec<AuditEntry>> {
        // Snapshot memory first so an entry persisted mid-query is still seen.
        let buffered = self.recent(&filter.unpaged());
        let widened = match filter.limit {
            Some(limit) => filter.unpaged().limit(filter.offset.saturating_add(limit)),
            None => filter.unpaged(),
        };
        let stored = self.store.query(&widened).await?;
        Ok(filter.apply(stored.into_iter().chain(buffered)))
    }

    /// Aggregates every entry in `period`, optionally restricted to `scope`.
    ///
    /// # Errors
    ///
    /// Returns [`AuditStoreError`] when the store query fails.
    pub async fn compliance_report(
        &self,
        period: TimeRange,
        scope: Option<ComplianceScope>,
    ) -> AuditStoreResult<ComplianceReport> {
        let mut filter = AuditQuery::new().time_range(period);
        if let Some(required) = scope.clone() {
            filter = filter.scope(required);
        }
        let entries = self.query(&filter).await?;
        Ok(ComplianceReport::from_entries(
            &entries,
            period,
            scope,
            self.clock.utc(),
        ))
    }
}

async fn run_writer(
    store: Arc<dyn AuditStore>,
    shared: Arc<Shared>,
    mut receiver: mpsc::Receiver<WriterCommand>,
) {
    while let Some(command) = receiver.recv().await {
        match command {
            WriterCommand::Append(entry) => {
                let sequence_id = entry.sequence_id;
                match store.append(&entry).await {
                    Ok(()) => shared.lock().mark(sequence_id, Durability::Persisted),
                    Err(source) => {
                        shared.lock().mark(sequence_id, Durability::Failed);
                        shared.report(AuditPersistenceError::Store {
                            sequence_id,
                            source,
                        });
                    }
                }
            }
            WriterCommand::Flush(ack) => {
                if ack.send(()).is_err() {
                    tracing::trace!("audit flush waiter went away");
                }
            }
        }
    }
    tracing::debug!("audit writer stopped");
}
