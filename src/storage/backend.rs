//! Sequence backend trait definition.

use tracing::error;

use crate::error::Result;
use crate::record::Record;

use super::PendingState;

/// Lazily evaluated records read from a backend
pub type RecordIter<'a> = Box<dyn Iterator<Item = Result<Record>> + 'a>;

/// The capability set every physical representation provides.
///
/// Backends only know about persisted records. Pending edits are owned by
/// [`super::SequenceStore`], which consults them first and falls through
/// to the backend on a miss.
///
/// # Invariants
///
/// - The index is built lazily on first use and never contains a header twice
/// - `lookup` returns `None` when the indexed content no longer carries the
///   requested header
/// - A successful `commit` leaves the index unset, so the next access
///   rebuilds it from the new persisted state
pub trait SequenceBackend {
    /// Reads the persisted sequence for `header`.
    ///
    /// # Errors
    ///
    /// Returns an error if the backing storage cannot be read, or if the
    /// indexed location does not start with a header line.
    fn lookup(&mut self, header: &str) -> Result<Option<String>>;

    /// Cheap existence test against the index; never reads a sequence.
    fn contains_in_source(&mut self, header: &str) -> Result<bool>;

    /// Persisted headers in the backend's natural index order.
    fn source_headers(&mut self) -> Result<Box<dyn Iterator<Item = &str> + '_>>;

    /// Persisted records in index order, skipping every header that
    /// `pending` deletes or updates.
    fn source_items<'a>(&'a mut self, pending: &'a PendingState) -> Result<RecordIter<'a>>;

    /// Folds `pending` deletions and updates into persisted storage.
    ///
    /// Called only when `pending` holds changes. `wrap` is the column
    /// width for written sequence lines.
    fn commit(&mut self, pending: &PendingState, wrap: Option<usize>) -> Result<()>;
}

/// Sequence of `record` if it really is the record for `requested`
///
/// A mismatch means the index is stale or the content corrupt; it is
/// logged and reported as absent.
pub(crate) fn verified_sequence(requested: &str, record: Record) -> Option<String> {
    if record.header == requested {
        Some(record.sequence)
    } else {
        error!(
            "Incorrect index, key '{}' doesn't match header: {}",
            requested, record.header
        );
        None
    }
}
