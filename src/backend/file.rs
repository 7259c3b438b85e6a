//! Single-file backend
//!
//! All records concatenated in one text file, indexed by byte offset.

use std::fs::{File, OpenOptions};
use std::io::{BufRead, BufReader, BufWriter, Seek, SeekFrom, Write};
use std::path::{Path, PathBuf};

use tracing::debug;

use crate::config::StorageConfig;
use crate::error::Result;
use crate::record::{self, Record, MARKER};
use crate::storage::{
    verified_sequence, PendingState, RecordIndex, RecordIter, SequenceBackend, SequenceStore,
};

use super::{persist_over, temp_file_beside};

/// Records stored back to back in one file
///
/// ## Index:
/// header → byte offset of its header line, built by one sequential scan
/// on first use. Commit rewrites the whole file to a temporary sibling and
/// renames it over the original.
#[derive(Debug)]
pub struct FileBackend {
    /// Path of the record file
    path: PathBuf,

    /// Lazily built header → offset index (`None` = stale)
    index: Option<RecordIndex<u64>>,
}

impl FileBackend {
    /// Open a record file, creating it empty if missing
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        OpenOptions::new().create(true).append(true).open(&path)?;

        Ok(Self { path, index: None })
    }

    /// Get the record file path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// True if the index must be rebuilt before its next use
    pub fn is_index_stale(&self) -> bool {
        self.index.is_none()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn index(&mut self) -> Result<&RecordIndex<u64>> {
        let index = match self.index.take() {
            Some(index) => index,
            None => self.build_index()?,
        };
        Ok(&*self.index.insert(index))
    }

    /// Scan the file once, recording the offset of every header line
    fn build_index(&self) -> Result<RecordIndex<u64>> {
        debug!("Building index: {}", self.path.display());

        let mut reader = BufReader::new(File::open(&self.path)?);
        let mut index = RecordIndex::new();
        let mut offset = 0u64;
        let mut line = String::new();

        loop {
            line.clear();
            let read = reader.read_line(&mut line)?;
            if read == 0 {
                break;
            }
            if line.starts_with(MARKER) {
                index.insert(record::clean_header(&line)?, offset);
            }
            offset += read as u64;
        }

        Ok(index)
    }
}

/// Parse the record whose header line starts at `offset`
fn read_at(reader: &mut BufReader<File>, offset: u64) -> Result<Record> {
    reader.seek(SeekFrom::Start(offset))?;
    record::read_record(reader)
}

impl SequenceBackend for FileBackend {
    fn lookup(&mut self, header: &str) -> Result<Option<String>> {
        let offset = match self.index()?.get(header) {
            Some(&offset) => offset,
            None => return Ok(None),
        };

        let mut reader = BufReader::new(File::open(&self.path)?);
        let record = read_at(&mut reader, offset)?;
        Ok(verified_sequence(header, record))
    }

    fn contains_in_source(&mut self, header: &str) -> Result<bool> {
        Ok(self.index()?.contains(header))
    }

    fn source_headers(&mut self) -> Result<Box<dyn Iterator<Item = &str> + '_>> {
        Ok(Box::new(self.index()?.headers()))
    }

    fn source_items<'a>(&'a mut self, pending: &'a PendingState) -> Result<RecordIter<'a>> {
        let mut reader = BufReader::new(File::open(&self.path)?);
        let index = self.index()?;

        let records = index
            .iter()
            .filter(move |(header, _)| !pending.is_touched(header))
            .map(move |(_, &offset)| read_at(&mut reader, offset));

        Ok(Box::new(records))
    }

    fn commit(&mut self, pending: &PendingState, wrap: Option<usize>) -> Result<()> {
        debug!("Committing: {}", self.path.display());

        let temp = temp_file_beside(&self.path)?;
        {
            let mut writer = BufWriter::new(temp.as_file());
            for record in self.source_items(pending)?.chain(pending.updated_records()) {
                writer.write_all(record?.to_fasta(wrap).as_bytes())?;
            }
            writer.flush()?;
        }

        persist_over(temp, &self.path)?;
        self.index = None;

        Ok(())
    }
}

impl SequenceStore<FileBackend> {
    /// Open a store over the record file at `path`
    pub fn open(path: impl AsRef<Path>, config: StorageConfig) -> Result<Self> {
        SequenceStore::new(FileBackend::open(path)?, config)
    }
}
