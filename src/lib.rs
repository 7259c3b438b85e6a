//! # seqstore
//!
//! A key-value store for biological sequence records with:
//! - Three interchangeable backends: one flat file, a directory of
//!   one-record files, or a (compressed) tar archive
//! - Lazy, per-backend indexing of persisted records
//! - Pending deletions and updates layered in front of every backend
//! - Deferred commit, atomic for the file and archive backends
//! - Bounded LRU cache of sequences read from storage
//!
//! ## Architecture Overview
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     SequenceStore<B>                         │
//! │     get / set / delete / contains / headers / items          │
//! └─────────────────────┬───────────────────────────────────────┘
//!                       │
//!          ┌────────────┴────────────┐
//!          │                         │
//!          ▼                         ▼
//!   ┌─────────────┐          ┌─────────────┐
//!   │ PendingState│          │  Backend B  │
//!   │ del/upd/LRU │          │ (lazy index)│
//!   └─────────────┘          └──────┬──────┘
//!                                   │
//!                 ┌─────────────────┼─────────────────┐
//!                 ▼                 ▼                 ▼
//!           ┌──────────┐     ┌────────────┐    ┌────────────┐
//!           │   File   │     │ Directory  │    │  Archive   │
//!           └──────────┘     └────────────┘    └────────────┘
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use seqstore::{FileStore, StorageConfig};
//!
//! let mut store = FileStore::open("proteins.fasta", StorageConfig::default())?;
//! store.set("sp|P69905|HBA_HUMAN", "MVLSPADKTNVKAAWGKVGAHAGEYGAEALERMFLSFPTTKTYFPHF");
//! store.commit()?;
//! # Ok::<(), seqstore::SeqError>(())
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod config;

pub mod record;
pub mod storage;
pub mod backend;

// =============================================================================
// Public API Re-exports
// =============================================================================

pub use error::{SeqError, Result};
pub use config::{Compression, StorageConfig};
pub use record::Record;
pub use storage::{SequenceBackend, SequenceStore, StoreGuard};
pub use backend::{
    ArchiveBackend, ArchiveStore, DirectoryBackend, DirectoryStore, FileBackend, FileStore,
};

// =============================================================================
// Version Info
// =============================================================================

/// Current version of seqstore
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
