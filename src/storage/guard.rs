//! Store guard
//!
//! Scoped access to a store with commit-on-release.

use std::fmt::Display;
use std::ops::{Deref, DerefMut};
use std::thread;

use tracing::error;

use crate::error::Result;

use super::{SequenceBackend, SequenceStore};

/// Exclusive borrow of a store that runs `commit` when released
///
/// ## Release paths:
/// - `release(Ok(_))` / `close()`: commit if autocommit is on
/// - `release(Err(_))` / `abort(..)`: log the failure, skip commit
/// - drop without release: log, skip commit
///
/// Drop cannot tell an early `?` return from a finished scope, so only an
/// explicit release commits.
pub struct StoreGuard<'a, B: SequenceBackend> {
    store: &'a mut SequenceStore<B>,
    released: bool,
}

impl<'a, B: SequenceBackend> StoreGuard<'a, B> {
    pub(super) fn new(store: &'a mut SequenceStore<B>) -> Self {
        Self {
            store,
            released: false,
        }
    }

    /// Release with the outcome of the work done under the guard
    pub fn release<T>(mut self, outcome: Result<T>) -> Result<T> {
        self.released = true;

        match outcome {
            Ok(value) => {
                if self.store.config().autocommit {
                    self.store.commit()?;
                }
                Ok(value)
            }
            Err(e) => {
                error!("Exception occurred: {}", e);
                Err(e)
            }
        }
    }

    /// Release normally
    pub fn close(self) -> Result<()> {
        self.release(Ok(()))
    }

    /// Release after a failure outside the store's own error type
    pub fn abort(mut self, reason: &dyn Display) {
        self.released = true;
        error!("Exception occurred: {}", reason);
    }
}

impl<B: SequenceBackend> Deref for StoreGuard<'_, B> {
    type Target = SequenceStore<B>;

    fn deref(&self) -> &Self::Target {
        self.store
    }
}

impl<B: SequenceBackend> DerefMut for StoreGuard<'_, B> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        self.store
    }
}

impl<B: SequenceBackend> Drop for StoreGuard<'_, B> {
    fn drop(&mut self) {
        if self.released {
            return;
        }
        if thread::panicking() {
            error!("Panic while store guard held, skipping commit");
        } else {
            error!("Store guard dropped without release, skipping commit");
        }
    }
}
