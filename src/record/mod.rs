//! Record Module
//!
//! The (header, sequence) record and its text format.
//!
//! ## Responsibilities
//! - Parse one record, or a stream of records, from text
//! - Serialize records back to text, optionally wrapped
//! - Derive safe, collision-free file/member names from headers
//!
//! ## Text Format
//! ```text
//! >HEADER_TEXT
//! SEQUENCE_LINE_1
//! SEQUENCE_LINE_2
//! ...
//! ```
//! Sequence lines are stripped and concatenated with no separator.

mod codec;
mod naming;

pub use codec::{
    clean_header, read_record, read_single_record, to_fasta, wrap_sequence, RecordReader, MARKER,
};
pub use naming::{candidate_name, sanitize_filename, NameAllocator, RECORD_EXTENSION};

/// A single sequence record
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct Record {
    /// Unique key of the record
    pub header: String,

    /// Residue string, without line breaks
    pub sequence: String,
}

impl Record {
    pub fn new(header: impl Into<String>, sequence: impl Into<String>) -> Self {
        Self {
            header: header.into(),
            sequence: sequence.into(),
        }
    }

    /// Render in record text format
    pub fn to_fasta(&self, wrap: Option<usize>) -> String {
        to_fasta(&self.header, &self.sequence, wrap)
    }

    pub fn into_pair(self) -> (String, String) {
        (self.header, self.sequence)
    }
}

impl From<(String, String)> for Record {
    fn from((header, sequence): (String, String)) -> Self {
        Self { header, sequence }
    }
}

impl From<Record> for (String, String) {
    fn from(record: Record) -> Self {
        record.into_pair()
    }
}
