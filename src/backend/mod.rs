//! Backend Module
//!
//! The three physical representations of a sequence store.
//!
//! ## Available Backends
//!
//! - [`FileBackend`] - all records concatenated in one text file
//! - [`DirectoryBackend`] - one file per record under a root directory
//! - [`ArchiveBackend`] - one member per record in a (compressed) tar archive
//!
//! ## Commit Atomicity
//! The single-file and archive backends write a complete replacement next
//! to the target and rename it into place, so a commit is all-or-nothing.
//! The directory backend writes and deletes files one by one; an
//! interrupted commit can leave some edits applied and others not.

mod archive;
mod directory;
mod file;

use std::path::Path;

use tempfile::NamedTempFile;

use crate::error::Result;
use crate::storage::SequenceStore;

pub use archive::ArchiveBackend;
pub use directory::{DirectoryBackend, DEFAULT_GLOB};
pub use file::FileBackend;

/// Store over a single text file
pub type FileStore = SequenceStore<FileBackend>;

/// Store over a directory of one-record files
pub type DirectoryStore = SequenceStore<DirectoryBackend>;

/// Store over a tar archive of one-record members
pub type ArchiveStore = SequenceStore<ArchiveBackend>;

// =============================================================================
// Shared Helpers
// =============================================================================

/// Fresh temporary file in the same directory as `target`
///
/// Same directory means the final rename never crosses filesystems.
fn temp_file_beside(target: &Path) -> Result<NamedTempFile> {
    let dir = match target.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    Ok(NamedTempFile::new_in(dir)?)
}

/// Sync `temp` and atomically rename it over `target`
fn persist_over(temp: NamedTempFile, target: &Path) -> Result<()> {
    temp.as_file().sync_all()?;
    temp.persist(target).map_err(|e| e.error)?;
    Ok(())
}
