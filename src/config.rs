//! Configuration for seqstore
//!
//! Construction-time options shared by every backend, with sensible defaults.

use std::fmt;
use std::str::FromStr;

use crate::error::{Result, SeqError};

/// Options applied to a store when it is opened
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StorageConfig {
    // -------------------------------------------------------------------------
    // Cache Configuration
    // -------------------------------------------------------------------------
    /// Max number of sequences kept in the read cache.
    /// `None` (or `Some(0)`) means the cache is unbounded.
    pub cache_size: Option<usize>,

    // -------------------------------------------------------------------------
    // Commit Configuration
    // -------------------------------------------------------------------------
    /// Commit automatically when a scoped guard is released normally
    pub autocommit: bool,

    // -------------------------------------------------------------------------
    // Output Configuration
    // -------------------------------------------------------------------------
    /// Column width for sequence lines on write (`None` = single line)
    pub wrap: Option<usize>,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            cache_size: None,
            autocommit: true,
            wrap: None,
        }
    }
}

impl StorageConfig {
    /// Create a new config builder
    pub fn builder() -> StorageConfigBuilder {
        StorageConfigBuilder::default()
    }

    /// Reject settings no backend can honour
    pub fn validate(&self) -> Result<()> {
        if self.wrap == Some(0) {
            return Err(SeqError::Config("wrap width must be positive".to_string()));
        }
        Ok(())
    }
}

/// Builder for StorageConfig
#[derive(Default)]
pub struct StorageConfigBuilder {
    config: StorageConfig,
}

impl StorageConfigBuilder {
    /// Bound the read cache to `size` entries
    pub fn cache_size(mut self, size: usize) -> Self {
        self.config.cache_size = Some(size);
        self
    }

    /// Enable or disable commit on scoped release
    pub fn autocommit(mut self, enabled: bool) -> Self {
        self.config.autocommit = enabled;
        self
    }

    /// Wrap written sequences at `width` columns
    pub fn wrap(mut self, width: usize) -> Self {
        self.config.wrap = Some(width);
        self
    }

    pub fn build(self) -> StorageConfig {
        self.config
    }
}

/// Compression codec of an archive-backed store
///
/// Fixed for the life of a handle: the same codec is used to read the
/// existing container and to write its replacement on commit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Compression {
    /// Plain tar
    None,
    /// tar.gz
    Gzip,
    /// tar.bz2
    Bzip2,
    /// tar.xz
    #[default]
    Xz,
}

impl fmt::Display for Compression {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Compression::None => "none",
            Compression::Gzip => "gz",
            Compression::Bzip2 => "bz2",
            Compression::Xz => "xz",
        };
        f.write_str(name)
    }
}

impl FromStr for Compression {
    type Err = SeqError;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_ascii_lowercase().as_str() {
            "" | "none" | "tar" => Ok(Compression::None),
            "gz" | "gzip" => Ok(Compression::Gzip),
            "bz2" | "bzip2" => Ok(Compression::Bzip2),
            "xz" => Ok(Compression::Xz),
            other => Err(SeqError::Config(format!("unknown compression: {}", other))),
        }
    }
}
