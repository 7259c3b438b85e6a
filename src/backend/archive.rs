//! Archive backend
//!
//! One record per member of a tar archive, optionally compressed.

use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufRead, BufReader, BufWriter, Read, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use bzip2::read::BzDecoder;
use bzip2::write::BzEncoder;
use flate2::read::GzDecoder;
use flate2::write::GzEncoder;
use tar::{Archive, Builder, EntryType, Header};
use tracing::{debug, warn};
use xz2::read::XzDecoder;
use xz2::write::XzEncoder;

use crate::config::{Compression, StorageConfig};
use crate::error::Result;
use crate::record::{self, NameAllocator};
use crate::storage::{
    verified_sequence, PendingState, RecordIndex, RecordIter, SequenceBackend, SequenceStore,
};

use super::{persist_over, temp_file_beside};

/// xz preset used when writing (same as the `xz` command line default)
const XZ_PRESET: u32 = 6;

/// Permissions of written members
const MEMBER_MODE: u32 = 0o644;

/// Records stored as members of one archive
///
/// ## Index:
/// header → member name, built from the first line of every regular
/// member. A missing archive file is an empty store.
///
/// ## Commit:
/// Archives cannot be edited in place, so every commit streams all
/// surviving records into a new archive beside the old one (same
/// compression) and renames it over the original.
#[derive(Debug)]
pub struct ArchiveBackend {
    /// Path of the archive file
    path: PathBuf,

    /// Codec used for both reading and writing
    compression: Compression,

    /// Lazily built header → member name index (`None` = stale)
    index: Option<RecordIndex<String>>,
}

impl ArchiveBackend {
    /// Open an archive; the file need not exist yet
    pub fn open(path: impl AsRef<Path>, compression: Compression) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
            compression,
            index: None,
        }
    }

    /// Get the archive path
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Get the compression codec
    pub fn compression(&self) -> Compression {
        self.compression
    }

    /// True if the index must be rebuilt before its next use
    pub fn is_index_stale(&self) -> bool {
        self.index.is_none()
    }

    // =========================================================================
    // Private Helpers
    // =========================================================================

    fn index(&mut self) -> Result<&RecordIndex<String>> {
        let index = match self.index.take() {
            Some(index) => index,
            None => self.build_index()?,
        };
        Ok(&*self.index.insert(index))
    }

    /// Read the header of every regular member, in archive order
    fn build_index(&self) -> Result<RecordIndex<String>> {
        let mut index = RecordIndex::new();
        if !self.path.exists() {
            return Ok(index);
        }

        debug!("Building index: {}", self.path.display());
        let mut archive = self.open_archive()?;
        for entry in archive.entries()? {
            let mut entry = entry?;
            if !entry.header().entry_type().is_file() {
                continue;
            }

            let name = entry.path()?.to_string_lossy().into_owned();
            match read_member_header(&mut entry) {
                Ok(header) => {
                    index.insert(header, name);
                }
                Err(e) => warn!("Exception during reading member {}: {}", name, e),
            }
        }

        Ok(index)
    }

    /// Stream reader over the archive, decompressing as configured
    fn open_archive(&self) -> Result<Archive<Box<dyn Read>>> {
        let file = BufReader::new(File::open(&self.path)?);
        let reader: Box<dyn Read> = match self.compression {
            Compression::None => Box::new(file),
            Compression::Gzip => Box::new(GzDecoder::new(file)),
            Compression::Bzip2 => Box::new(BzDecoder::new(file)),
            Compression::Xz => Box::new(XzDecoder::new(file)),
        };
        Ok(Archive::new(reader))
    }
}

/// Header of a member, reading only its first line
fn read_member_header<R: Read>(member: R) -> Result<String> {
    let mut reader = BufReader::new(member);
    let mut line = String::new();
    reader.read_line(&mut line)?;
    record::clean_header(&line)
}

impl SequenceBackend for ArchiveBackend {
    fn lookup(&mut self, header: &str) -> Result<Option<String>> {
        let name = match self.index()?.get(header) {
            Some(name) => PathBuf::from(name),
            None => return Ok(None),
        };

        let mut archive = self.open_archive()?;
        for entry in archive.entries()? {
            let mut entry = entry?;
            if entry.path()?.into_owned() != name {
                continue;
            }
            let record = record::read_single_record(&mut BufReader::new(&mut entry))?;
            return Ok(verified_sequence(header, record));
        }

        Ok(None)
    }

    fn contains_in_source(&mut self, header: &str) -> Result<bool> {
        Ok(self.index()?.contains(header))
    }

    fn source_headers(&mut self) -> Result<Box<dyn Iterator<Item = &str> + '_>> {
        Ok(Box::new(self.index()?.headers()))
    }

    /// Members of a compressed stream can only be visited in order, so the
    /// wanted records are collected in one pass over the archive.
    fn source_items<'a>(&'a mut self, pending: &'a PendingState) -> Result<RecordIter<'a>> {
        if !self.path.exists() {
            return Ok(Box::new(std::iter::empty()));
        }

        let mut archive = self.open_archive()?;
        let mut wanted: HashMap<&str, &str> = self
            .index()?
            .iter()
            .filter(|(header, _)| !pending.is_touched(header))
            .map(|(header, name)| (name.as_str(), header))
            .collect();

        let mut records = Vec::with_capacity(wanted.len());
        for entry in archive.entries()? {
            let mut entry = entry?;
            let name = entry.path()?.to_string_lossy().into_owned();
            if wanted.remove(name.as_str()).is_none() {
                continue;
            }
            records.push(Ok(record::read_single_record(&mut BufReader::new(
                &mut entry,
            ))?));
        }

        Ok(Box::new(records.into_iter()))
    }

    fn commit(&mut self, pending: &PendingState, wrap: Option<usize>) -> Result<()> {
        debug!("Committing: {}", self.path.display());

        let compression = self.compression;
        let member_names: HashMap<String, String> = self
            .index()?
            .iter()
            .map(|(header, name)| (header.to_string(), name.clone()))
            .collect();
        let mut allocator = NameAllocator::new(member_names.values().cloned());
        let mtime = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|elapsed| elapsed.as_secs())
            .unwrap_or(0);

        let temp = temp_file_beside(&self.path)?;
        {
            let writer = ArchiveWriter::new(BufWriter::new(temp.as_file()), compression);
            let mut builder = Builder::new(writer);

            for record in self.source_items(pending)?.chain(pending.updated_records()) {
                let record = record?;
                let name = match member_names.get(&record.header) {
                    Some(name) => name.clone(),
                    None => allocator.allocate(&record.header),
                };
                let data = record.to_fasta(wrap);

                let mut member = Header::new_gnu();
                member.set_entry_type(EntryType::Regular);
                member.set_size(data.len() as u64);
                member.set_mode(MEMBER_MODE);
                member.set_mtime(mtime);
                builder.append_data(&mut member, &name, data.as_bytes())?;
            }

            let mut buffered = builder.into_inner()?.finish()?;
            buffered.flush()?;
        }

        persist_over(temp, &self.path)?;
        self.index = None;

        Ok(())
    }
}

// =============================================================================
// Compressed Output
// =============================================================================

/// Writer applying the archive's compression codec
enum ArchiveWriter<W: Write> {
    Plain(W),
    Gzip(GzEncoder<W>),
    Bzip2(BzEncoder<W>),
    Xz(XzEncoder<W>),
}

impl<W: Write> ArchiveWriter<W> {
    fn new(inner: W, compression: Compression) -> Self {
        match compression {
            Compression::None => ArchiveWriter::Plain(inner),
            Compression::Gzip => {
                ArchiveWriter::Gzip(GzEncoder::new(inner, flate2::Compression::default()))
            }
            Compression::Bzip2 => {
                ArchiveWriter::Bzip2(BzEncoder::new(inner, bzip2::Compression::default()))
            }
            Compression::Xz => ArchiveWriter::Xz(XzEncoder::new(inner, XZ_PRESET)),
        }
    }

    /// Write the codec trailer and return the inner writer
    fn finish(self) -> io::Result<W> {
        match self {
            ArchiveWriter::Plain(inner) => Ok(inner),
            ArchiveWriter::Gzip(encoder) => encoder.finish(),
            ArchiveWriter::Bzip2(encoder) => encoder.finish(),
            ArchiveWriter::Xz(encoder) => encoder.finish(),
        }
    }
}

impl<W: Write> Write for ArchiveWriter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        match self {
            ArchiveWriter::Plain(inner) => inner.write(buf),
            ArchiveWriter::Gzip(encoder) => encoder.write(buf),
            ArchiveWriter::Bzip2(encoder) => encoder.write(buf),
            ArchiveWriter::Xz(encoder) => encoder.write(buf),
        }
    }

    fn flush(&mut self) -> io::Result<()> {
        match self {
            ArchiveWriter::Plain(inner) => inner.flush(),
            ArchiveWriter::Gzip(encoder) => encoder.flush(),
            ArchiveWriter::Bzip2(encoder) => encoder.flush(),
            ArchiveWriter::Xz(encoder) => encoder.flush(),
        }
    }
}

impl SequenceStore<ArchiveBackend> {
    /// Open a store over the archive at `path`
    pub fn open(
        path: impl AsRef<Path>,
        compression: Compression,
        config: StorageConfig,
    ) -> Result<Self> {
        SequenceStore::new(ArchiveBackend::open(path, compression), config)
    }
}
