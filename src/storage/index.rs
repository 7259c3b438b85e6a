//! Record index
//!
//! Header → location map that remembers discovery order.

use std::collections::HashMap;

use tracing::warn;

/// Mapping from header to a backend-specific location
///
/// `L` is a byte offset for the single-file backend, a path for the
/// directory backend and a member name for the archive backend.
/// Iteration follows insertion order, which is the order records were
/// found in the backing storage.
#[derive(Debug, Clone)]
pub struct RecordIndex<L> {
    entries: Vec<(String, L)>,
    positions: HashMap<String, usize>,
}

impl<L> RecordIndex<L> {
    pub fn new() -> Self {
        Self {
            entries: Vec::new(),
            positions: HashMap::new(),
        }
    }

    /// Add `header` unless it is already indexed
    ///
    /// The first occurrence wins; later duplicates are logged and dropped.
    /// Returns whether the entry was added.
    pub fn insert(&mut self, header: String, location: L) -> bool {
        if self.positions.contains_key(&header) {
            warn!("Duplicated header skipped: {}", header);
            return false;
        }

        self.positions.insert(header.clone(), self.entries.len());
        self.entries.push((header, location));
        true
    }

    pub fn get(&self, header: &str) -> Option<&L> {
        self.positions
            .get(header)
            .map(|&position| &self.entries[position].1)
    }

    pub fn contains(&self, header: &str) -> bool {
        self.positions.contains_key(header)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Headers in discovery order
    pub fn headers(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.iter().map(|(header, _)| header.as_str())
    }

    /// (header, location) pairs in discovery order
    pub fn iter(&self) -> impl Iterator<Item = (&str, &L)> + '_ {
        self.entries
            .iter()
            .map(|(header, location)| (header.as_str(), location))
    }
}

impl<L> Default for RecordIndex<L> {
    fn default() -> Self {
        Self::new()
    }
}
