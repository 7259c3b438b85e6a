//! File and member naming
//!
//! Headers are free text; names derived from them must be safe on any
//! filesystem and unique within their scope.

use std::collections::HashSet;

/// Extension given to every file or member written by a store
pub const RECORD_EXTENSION: &str = "fasta";

/// Replace filesystem-unsafe characters with `_`
///
/// Unsafe: path separators, wildcards, `%`, `:`, `|`, quotes, angle
/// brackets, DEL and the C0 control range.
pub fn sanitize_filename(name: &str) -> String {
    name.chars()
        .map(|c| if is_unsafe(c) { '_' } else { c })
        .collect()
}

fn is_unsafe(c: char) -> bool {
    matches!(
        c,
        '/' | '\\' | '?' | '%' | '*' | ':' | '|' | '"' | '<' | '>' | '\x7f'
    ) || c < '\x20'
}

/// `stem.fasta` for attempt 0, `stem_N.fasta` afterwards
pub fn candidate_name(stem: &str, attempt: usize) -> String {
    if attempt == 0 {
        format!("{}.{}", stem, RECORD_EXTENSION)
    } else {
        format!("{}_{}.{}", stem, attempt, RECORD_EXTENSION)
    }
}

/// Hands out unused names for new headers
///
/// A name is free when it is neither already handed out / pre-registered
/// nor rejected by the caller's `occupied` check (e.g. a file already on
/// disk).
#[derive(Debug, Default)]
pub struct NameAllocator {
    taken: HashSet<String>,
}

impl NameAllocator {
    /// Start with the names already used in this scope
    pub fn new<I>(existing: I) -> Self
    where
        I: IntoIterator<Item = String>,
    {
        Self {
            taken: existing.into_iter().collect(),
        }
    }

    /// Next free name for `header`
    pub fn allocate(&mut self, header: &str) -> String {
        self.allocate_with(header, |_| false)
    }

    /// Next free name for `header` that `occupied` also accepts
    pub fn allocate_with<F>(&mut self, header: &str, occupied: F) -> String
    where
        F: Fn(&str) -> bool,
    {
        let stem = sanitize_filename(header);
        let mut attempt = 0;
        loop {
            let name = candidate_name(&stem, attempt);
            if !self.taken.contains(&name) && !occupied(&name) {
                self.taken.insert(name.clone());
                return name;
            }
            attempt += 1;
        }
    }

    pub fn is_taken(&self, name: &str) -> bool {
        self.taken.contains(name)
    }
}
