//! Directory backend
//!
//! One record per file under a root directory, selected by a glob.

use std::fs::{self, File};
use std::io::{self, BufRead, BufReader};
use std::path::{Path, PathBuf};

use tracing::{debug, warn};

use crate::config::StorageConfig;
use crate::error::{Result, SeqError};
use crate::record::{self, NameAllocator, Record};
use crate::storage::{
    verified_sequence, PendingState, RecordIndex, RecordIter, SequenceBackend, SequenceStore,
};

/// Default pattern: every `*.fasta` file below the root, recursively
pub const DEFAULT_GLOB: &str = "**/*.fasta";

/// Records stored as individual files
///
/// ## Index:
/// header → file path, built from the first line of every matching file.
/// Unreadable or malformed files are skipped with a warning.
///
/// ## Commit:
/// Deletes and writes files one at a time. There is no atomicity across
/// files: an interrupted commit may leave a mix of old and new state.
#[derive(Debug)]
pub struct DirectoryBackend {
    /// Root directory
    root: PathBuf,

    /// Pattern relative to `root`, as given by the caller
    glob: String,

    /// `glob` anchored at `root`
    full_pattern: String,

    /// Lazily built header → path index (`None` = stale)
    index: Option<RecordIndex<PathBuf>>,
}

impl DirectoryBackend {
    /// Open a directory of record files, creating it if missing
    ///
    /// # Errors
    ///
    /// `Config` if `root` exists but is not a directory, `Pattern` if
    /// `glob` is not a valid pattern.
    pub fn open(root: impl AsRef<Path>, glob: &str) -> Result<Self> {
        let root = root.as_ref().to_path_buf();
        if root.exists() && !root.is_dir() {
            return Err(SeqError::Config(format!(
                "Path should be a folder: {}",
                root.display()
            )));
        }
        fs::create_dir_all(&root)?;

        glob::Pattern::new(glob)?;
        let full_pattern = format!(
            "{}/{}",
            glob::Pattern::escape(&root.to_string_lossy()),
            glob
        );

        Ok(Self {
            root,
            glob: glob.to_string(),
            full_pattern,
            index: None,
        })
    }

    /// Get the root directory
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Get the file selection pattern
    pub fn glob(&self) -> &str {
        &self.glob
    }

    /// True if the index must be rebuilt before its next use
    pub fn is_index_stale(&self) -> bool {
        self.index.is_none()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn index(&mut self) -> Result<&RecordIndex<PathBuf>> {
        let index = self.take_index()?;
        Ok(&*self.index.insert(index))
    }

    /// Current index, leaving the slot empty
    fn take_index(&mut self) -> Result<RecordIndex<PathBuf>> {
        match self.index.take() {
            Some(index) => Ok(index),
            None => self.build_index(),
        }
    }

    /// Read the header of every matching file
    ///
    /// Files are visited in the glob's enumeration order, so the first file
    /// carrying a header wins.
    fn build_index(&self) -> Result<RecordIndex<PathBuf>> {
        debug!("Building index: {}", self.full_pattern);

        let mut index = RecordIndex::new();
        for entry in glob::glob(&self.full_pattern)? {
            let path = match entry {
                Ok(path) => path,
                Err(e) => {
                    warn!("Exception during listing fasta: {}", e);
                    continue;
                }
            };
            if !path.is_file() {
                continue;
            }

            match read_first_header(&path) {
                Ok(header) => {
                    index.insert(header, path);
                }
                Err(e) => warn!("Exception during reading fasta {}: {}", path.display(), e),
            }
        }

        Ok(index)
    }
}

/// Header of the record in `path`, reading only the first line
fn read_first_header(path: &Path) -> Result<String> {
    let mut reader = BufReader::new(File::open(path)?);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    record::clean_header(&line)
}

/// Parse the one record stored in `path`
fn read_record_file(path: &Path) -> Result<Record> {
    let mut reader = BufReader::new(File::open(path)?);
    record::read_single_record(&mut reader)
}

impl SequenceBackend for DirectoryBackend {
    fn lookup(&mut self, header: &str) -> Result<Option<String>> {
        let record = match self.index()?.get(header) {
            Some(path) => read_record_file(path)?,
            None => return Ok(None),
        };
        Ok(verified_sequence(header, record))
    }

    fn contains_in_source(&mut self, header: &str) -> Result<bool> {
        Ok(self.index()?.contains(header))
    }

    fn source_headers(&mut self) -> Result<Box<dyn Iterator<Item = &str> + '_>> {
        Ok(Box::new(self.index()?.headers()))
    }

    fn source_items<'a>(&'a mut self, pending: &'a PendingState) -> Result<RecordIter<'a>> {
        let records = self
            .index()?
            .iter()
            .filter(move |(header, _)| !pending.is_touched(header))
            .map(|(_, path)| read_record_file(path));

        Ok(Box::new(records))
    }

    fn commit(&mut self, pending: &PendingState, wrap: Option<usize>) -> Result<()> {
        debug!("Committing: {}", self.root.display());

        // Whatever happens below, the index is left unset and rebuilt on next use
        let index = self.take_index()?;

        for header in pending.deleted() {
            let Some(path) = index.get(header) else {
                continue;
            };
            match fs::remove_file(path) {
                Ok(()) => debug!("Removed {}", path.display()),
                Err(e) if e.kind() == io::ErrorKind::NotFound => {
                    warn!("File already gone: {}", path.display())
                }
                Err(e) => return Err(e.into()),
            }
        }

        let root = &self.root;
        let mut names = NameAllocator::default();
        for (header, sequence) in pending.updated() {
            let path = match index.get(header) {
                Some(path) => path.clone(),
                None => root.join(names.allocate_with(header, |name| root.join(name).exists())),
            };
            fs::write(&path, record::to_fasta(header, sequence, wrap))?;
        }

        Ok(())
    }
}

impl SequenceStore<DirectoryBackend> {
    /// Open a store over every `*.fasta` file below `root`
    pub fn open(root: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        Self::open_with_glob(root, DEFAULT_GLOB, config)
    }

    /// Open a store over the files below `root` matching `glob`
    pub fn open_with_glob(
        root: impl AsRef<Path>,
        glob: &str,
        config: StorageConfig,
    ) -> Result<Self> {
        SequenceStore::new(DirectoryBackend::open(root, glob)?, config)
    }
}
