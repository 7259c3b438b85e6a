//! Pending state
//!
//! Uncommitted deletions and updates, plus the read cache.

use std::collections::HashSet;
use std::fmt;
use std::num::NonZeroUsize;

use lru::LruCache;
use tracing::debug;

use crate::error::Result;
use crate::record::Record;

/// Edits not yet folded into a backend, and cached backend reads
///
/// ## Layout:
/// - `deleted`: headers marked for deletion
/// - `updated`: assignments, kept in an unbounded LRU map so that a
///   re-assignment moves the header to the newest position; iterating it
///   oldest-first gives insertion order
/// - `cache`: sequences read from the backend, least recently used evicted
///   first once `cache_size` is exceeded
///
/// Every mutation evicts the header from the other two sets before
/// inserting it, so a header is in at most one of them.
pub struct PendingState {
    deleted: HashSet<String>,
    updated: LruCache<String, String>,
    cache: LruCache<String, String>,
}

impl PendingState {
    /// Empty state; `cache_size` of `None` or `Some(0)` means unbounded
    pub fn new(cache_size: Option<usize>) -> Self {
        let cache = match cache_size.and_then(NonZeroUsize::new) {
            Some(capacity) => LruCache::new(capacity),
            None => LruCache::unbounded(),
        };

        Self {
            deleted: HashSet::new(),
            updated: LruCache::unbounded(),
            cache,
        }
    }

    // =========================================================================
    // Queries
    // =========================================================================

    pub fn is_deleted(&self, header: &str) -> bool {
        self.deleted.contains(header)
    }

    /// Pending value for `header`, without touching recency
    pub fn updated_value(&self, header: &str) -> Option<&str> {
        self.updated.peek(header).map(String::as_str)
    }

    /// Cached value for `header`, marking it most recently used
    pub fn cached(&mut self, header: &str) -> Option<&str> {
        self.cache.get(header).map(String::as_str)
    }

    pub fn is_cached(&self, header: &str) -> bool {
        self.cache.contains(header)
    }

    /// True if `header` is deleted or updated (its persisted copy is stale)
    pub fn is_touched(&self, header: &str) -> bool {
        self.deleted.contains(header) || self.updated.contains(header)
    }

    /// True when there is nothing to commit
    pub fn is_clean(&self) -> bool {
        self.deleted.is_empty() && self.updated.is_empty()
    }

    /// Deleted headers, in no particular order
    pub fn deleted(&self) -> impl Iterator<Item = &str> + '_ {
        self.deleted.iter().map(String::as_str)
    }

    /// Updated headers and sequences in insertion order
    pub fn updated(&self) -> impl Iterator<Item = (&str, &str)> + '_ {
        self.updated
            .iter()
            .rev()
            .map(|(header, sequence)| (header.as_str(), sequence.as_str()))
    }

    /// Updated headers in insertion order
    pub fn updated_headers(&self) -> impl Iterator<Item = &str> + '_ {
        self.updated().map(|(header, _)| header)
    }

    /// Updated entries as owned records, in insertion order
    pub fn updated_records(&self) -> impl Iterator<Item = Result<Record>> + '_ {
        self.updated()
            .map(|(header, sequence)| Ok(Record::new(header, sequence)))
    }

    pub fn deleted_len(&self) -> usize {
        self.deleted.len()
    }

    pub fn updated_len(&self) -> usize {
        self.updated.len()
    }

    pub fn cache_len(&self) -> usize {
        self.cache.len()
    }

    // =========================================================================
    // Mutations
    // =========================================================================

    /// Record a backend read, evicting the least recently used entry if full
    ///
    /// Re-inserting a cached header replaces its value without eviction.
    pub fn cache_insert(&mut self, header: String, sequence: String) {
        debug!("Caching for key: {}", header);
        let replaced = self.cache.contains(&header);
        if let Some((evicted, _)) = self.cache.push(header, sequence) {
            if !replaced {
                debug!("Evicted from cache: {}", evicted);
            }
        }
    }

    /// Assign `sequence`, un-deleting `header` and dropping any cached copy
    pub fn mark_updated(&mut self, header: String, sequence: String) {
        self.deleted.remove(&header);
        self.cache.pop(&header);
        self.updated.pop(&header);
        debug!("Saving sequence to updated: {}", header);
        self.updated.put(header, sequence);
    }

    /// Mark `header` deleted, dropping any pending or cached value
    pub fn mark_deleted(&mut self, header: String) {
        self.updated.pop(&header);
        self.cache.pop(&header);
        debug!("Mark key as deleted: {}", header);
        self.deleted.insert(header);
    }

    /// Drop deletions and updates after they reached the backend
    ///
    /// The cache survives: every entry in it is untouched by the commit.
    pub fn clear_changes(&mut self) {
        self.deleted.clear();
        self.updated.clear();
    }
}

impl fmt::Debug for PendingState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("PendingState")
            .field("deleted", &self.deleted.len())
            .field("updated", &self.updated.len())
            .field("cached", &self.cache.len())
            .finish()
    }
}
