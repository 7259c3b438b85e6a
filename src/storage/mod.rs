//! Storage Module
//!
//! Backend-agnostic key-value layer over sequence records.
//!
//! ## Responsibilities
//! - Resolve every key against pending edits before touching a backend
//! - Keep a bounded LRU cache of sequences read from a backend
//! - Merge pending edits with persisted records for iteration
//! - Hand pending edits to the backend on commit, then drain them
//!
//! ## Resolution Order
//! ```text
//!   get / contains
//!        │
//!        ▼
//!   ┌──────────┐  hit   NotFound / false
//!   │ deleted  │ ─────▶
//!   └────┬─────┘
//!        ▼
//!   ┌──────────┐  hit   pending value
//!   │ updated  │ ─────▶
//!   └────┬─────┘
//!        ▼
//!   ┌──────────┐  hit   cached value (marked most recent)
//!   │  cache   │ ─────▶
//!   └────┬─────┘
//!        ▼
//!   ┌──────────┐
//!   │ backend  │  lookup / contains_in_source (lazy index)
//!   └──────────┘
//! ```
//!
//! A header lives in at most one of `deleted`, `updated` and `cache`.
//!
//! Iteration borrows the store, so the backend cannot change underneath
//! it from this process. Changes made to the backing files by another
//! process are not detected.

mod backend;
mod guard;
mod index;
mod pending;
mod store;

pub use backend::{RecordIter, SequenceBackend};
pub use guard::StoreGuard;
pub use index::RecordIndex;
pub use pending::PendingState;
pub use store::SequenceStore;

pub(crate) use backend::verified_sequence;
