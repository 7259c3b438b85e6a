//! Sequence store
//!
//! The key-value contract over any [`SequenceBackend`].

use tracing::debug;

use crate::config::StorageConfig;
use crate::error::{Result, SeqError};
use crate::record::Record;

use super::{PendingState, SequenceBackend, StoreGuard};

/// A key-value view of sequence records
///
/// Reads resolve against pending edits first, then the cache, then the
/// backend. Writes stay pending until [`SequenceStore::commit`].
///
/// ## Concurrency:
/// - Single-threaded: every operation takes `&mut self` (reads fill the
///   cache and may build the backend index)
/// - No locking on the backing path; callers serialize access to it
pub struct SequenceStore<B> {
    /// Persisted records
    backend: B,

    /// Uncommitted edits and cached reads
    pending: PendingState,

    /// Options fixed at construction
    config: StorageConfig,
}

impl<B: SequenceBackend> SequenceStore<B> {
    /// Wrap `backend` with empty pending state
    pub fn new(backend: B, config: StorageConfig) -> Result<Self> {
        config.validate()?;

        Ok(Self {
            backend,
            pending: PendingState::new(config.cache_size),
            config,
        })
    }

    /// Get the sequence stored under `header`
    ///
    /// Search order:
    /// 1. Deleted (→ NotFound)
    /// 2. Updated
    /// 3. Cache (marks the entry most recently used)
    /// 4. Backend (result is cached)
    pub fn get(&mut self, header: &str) -> Result<String> {
        if self.pending.is_deleted(header) {
            debug!("Key marked as deleted: {}", header);
            return Err(SeqError::NotFound(header.to_string()));
        }
        if let Some(sequence) = self.pending.updated_value(header) {
            debug!("Return sequence from updated: {}", header);
            return Ok(sequence.to_string());
        }
        if let Some(sequence) = self.pending.cached(header) {
            debug!("Return sequence from cache: {}", header);
            return Ok(sequence.to_string());
        }

        debug!("Getting sequence from source: {}", header);
        match self.backend.lookup(header)? {
            Some(sequence) => {
                self.pending.cache_insert(header.to_string(), sequence.clone());
                Ok(sequence)
            }
            None => Err(SeqError::NotFound(header.to_string())),
        }
    }

    /// Assign `sequence` to `header` (pending until commit)
    pub fn set(&mut self, header: impl Into<String>, sequence: impl Into<String>) {
        self.pending.mark_updated(header.into(), sequence.into());
    }

    /// Delete `header` (pending until commit). Idempotent.
    pub fn delete(&mut self, header: &str) {
        self.pending.mark_deleted(header.to_string());
    }

    /// Check whether `header` resolves to a record
    ///
    /// Same order as `get`, but the backend is only asked for existence
    /// and nothing is cached.
    pub fn contains(&mut self, header: &str) -> Result<bool> {
        if self.pending.is_deleted(header) {
            return Ok(false);
        }
        if self.pending.updated_value(header).is_some() || self.pending.is_cached(header) {
            return Ok(true);
        }
        self.backend.contains_in_source(header)
    }

    /// Every visible header
    ///
    /// Persisted headers untouched by pending edits come first, in index
    /// order, followed by updated headers in insertion order.
    pub fn headers(&mut self) -> Result<impl Iterator<Item = &str> + '_> {
        let pending = &self.pending;
        let persisted = self.backend.source_headers()?;

        Ok(persisted
            .filter(move |header| !pending.is_touched(header))
            .chain(pending.updated_headers()))
    }

    /// Every visible record, in the same order as `headers`
    ///
    /// Persisted records are read from the backend as the iterator advances.
    pub fn items(&mut self) -> Result<impl Iterator<Item = Result<Record>> + '_> {
        let pending = &self.pending;
        let persisted = self.backend.source_items(pending)?;

        Ok(persisted.chain(pending.updated_records()))
    }

    /// Number of visible records
    pub fn len(&mut self) -> Result<usize> {
        Ok(self.headers()?.count())
    }

    pub fn is_empty(&mut self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Fold pending edits into the backend
    ///
    /// A no-op when nothing is pending. On success the pending edits are
    /// drained and the backend index is stale; the cache is kept.
    pub fn commit(&mut self) -> Result<()> {
        if self.pending.is_clean() {
            debug!("Nothing to commit.");
            return Ok(());
        }

        debug!(
            deleted = self.pending.deleted_len(),
            updated = self.pending.updated_len(),
            "Committing"
        );
        self.backend.commit(&self.pending, self.config.wrap)?;
        self.pending.clear_changes();

        Ok(())
    }

    // =========================================================================
    // Scoped Use
    // =========================================================================

    /// Borrow the store behind a guard that commits on an explicit
    /// successful release (when autocommit is on)
    pub fn guard(&mut self) -> StoreGuard<'_, B> {
        StoreGuard::new(self)
    }

    /// Run `f` inside a guard
    ///
    /// On `Ok` the store is committed if autocommit is on; on `Err` the
    /// commit is skipped and the error is logged and returned.
    pub fn scoped<T, F>(&mut self, f: F) -> Result<T>
    where
        F: FnOnce(&mut SequenceStore<B>) -> Result<T>,
    {
        let mut guard = self.guard();
        let outcome = f(&mut *guard);
        guard.release(outcome)
    }

    // =========================================================================
    // Accessors (for testing and debugging)
    // =========================================================================

    /// Get the pending edits and cache
    pub fn pending(&self) -> &PendingState {
        &self.pending
    }

    /// Get the configuration
    pub fn config(&self) -> &StorageConfig {
        &self.config
    }

    /// Get the backend
    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Consume the store, discarding pending edits
    pub fn into_backend(self) -> B {
        self.backend
    }
}
