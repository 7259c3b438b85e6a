//! Record codec
//!
//! Parsing and serialization of the record text format.

use std::io::BufRead;

use tracing::warn;

use crate::error::{Result, SeqError};

use super::Record;

/// First character of every header line
pub const MARKER: char = '>';

const MARKER_BYTE: u8 = b'>';

// =============================================================================
// Decoding
// =============================================================================

/// Strip the marker and surrounding whitespace from a raw header line
///
/// A line that does not start with `>` is an `InvalidHeader` error.
pub fn clean_header(line: &str) -> Result<String> {
    match line.strip_prefix(MARKER) {
        Some(rest) => Ok(rest.trim().to_string()),
        None => Err(SeqError::InvalidHeader(line.trim_end().to_string())),
    }
}

/// Parse one record starting at the reader's current position
///
/// The first line must be a header line. Sequence lines are read up to,
/// but not including, the next header line or end of input; the next
/// header line is left unconsumed.
pub fn read_record<R: BufRead>(reader: &mut R) -> Result<Record> {
    let mut line = String::new();
    reader.read_line(&mut line)?;
    let header = clean_header(&line)?;
    let sequence = read_sequence_lines(reader)?;
    Ok(Record::new(header, sequence))
}

/// Parse the only record of a one-record file or archive member
///
/// Content after a second header line is ignored with a warning.
pub fn read_single_record<R: BufRead>(reader: &mut R) -> Result<Record> {
    let record = read_record(reader)?;

    let mut next = String::new();
    if reader.read_line(&mut next)? > 0 {
        warn!(
            "More than one sequence in file. First: {}, next: {}",
            record.header,
            next.trim().trim_start_matches(MARKER)
        );
    }

    Ok(record)
}

/// Concatenate stripped lines until the next header line or EOF
fn read_sequence_lines<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut sequence = String::new();
    let mut line = String::new();

    loop {
        let pending = reader.fill_buf()?;
        if pending.is_empty() || pending[0] == MARKER_BYTE {
            break;
        }

        line.clear();
        reader.read_line(&mut line)?;
        sequence.push_str(line.trim());
    }

    Ok(sequence)
}

/// Iterator over every record in a multi-record stream
///
/// Blank lines before a header are skipped. Iteration stops after the
/// first error.
pub struct RecordReader<R> {
    reader: R,
    failed: bool,
}

impl<R: BufRead> RecordReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            failed: false,
        }
    }

    /// Skip blank lines; false at end of input
    fn skip_blank_lines(&mut self) -> Result<bool> {
        loop {
            let pending = self.reader.fill_buf()?;
            if pending.is_empty() {
                return Ok(false);
            }
            if !pending[0].is_ascii_whitespace() {
                return Ok(true);
            }

            let mut line = String::new();
            self.reader.read_line(&mut line)?;
            if !line.trim().is_empty() {
                // Indented content where a header is expected
                return Err(SeqError::InvalidHeader(line.trim_end().to_string()));
            }
        }
    }
}

impl<R: BufRead> Iterator for RecordReader<R> {
    type Item = Result<Record>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }

        let result = match self.skip_blank_lines() {
            Ok(false) => return None,
            Ok(true) => read_record(&mut self.reader),
            Err(e) => Err(e),
        };

        if result.is_err() {
            self.failed = true;
        }
        Some(result)
    }
}

// =============================================================================
// Encoding
// =============================================================================

/// Render a record: `>` + header, the (optionally wrapped) sequence, newline
pub fn to_fasta(header: &str, sequence: &str, wrap: Option<usize>) -> String {
    let body = match wrap {
        Some(width) => wrap_sequence(sequence, width),
        None => sequence.to_string(),
    };

    let mut out = String::with_capacity(header.len() + body.len() + 3);
    out.push(MARKER);
    out.push_str(header);
    out.push('\n');
    out.push_str(&body);
    out.push('\n');
    out
}

/// Split a sequence into `width`-character lines joined by `\n`
///
/// A zero width leaves the sequence unwrapped.
pub fn wrap_sequence(sequence: &str, width: usize) -> String {
    if width == 0 || sequence.len() <= width {
        return sequence.to_string();
    }

    let mut out = String::with_capacity(sequence.len() + sequence.len() / width);
    for (i, residue) in sequence.chars().enumerate() {
        if i > 0 && i % width == 0 {
            out.push('\n');
        }
        out.push(residue);
    }
    out
}
