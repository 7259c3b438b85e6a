//! Error types for seqstore
//!
//! Provides a unified error type for all operations.

use thiserror::Error;

/// Result type alias using SeqError
pub type Result<T> = std::result::Result<T, SeqError>;

/// Unified error type for seqstore operations
#[derive(Debug, Error)]
pub enum SeqError {
    // -------------------------------------------------------------------------
    // I/O Errors
    // -------------------------------------------------------------------------
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    // -------------------------------------------------------------------------
    // Lookup Errors
    // -------------------------------------------------------------------------
    #[error("Header not found: {0}")]
    NotFound(String),

    // -------------------------------------------------------------------------
    // Format Errors
    // -------------------------------------------------------------------------
    #[error("Invalid header line: {0:?}")]
    InvalidHeader(String),

    // -------------------------------------------------------------------------
    // Configuration Errors
    // -------------------------------------------------------------------------
    #[error("Invalid glob pattern: {0}")]
    Pattern(#[from] glob::PatternError),

    #[error("Configuration error: {0}")]
    Config(String),
}

impl SeqError {
    /// True for the `NotFound` kind
    pub fn is_not_found(&self) -> bool {
        matches!(self, SeqError::NotFound(_))
    }
}
