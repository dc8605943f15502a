//! Mutation executor: optimistic updates with rollback.

use std::future::Future;
use std::sync::Arc;

use holocron_core::{CacheKey, FetchError};
use tracing::{debug, warn};

use crate::cache::{CacheStore, UndoOutcome};

/// How a mutation settled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MutationOutcome {
    /// The remote call succeeded; the optimistic change stays.
    Committed,
    /// The remote call failed and the optimistic change was undone.
    RolledBack { error: FetchError, undo: UndoOutcome },
}

impl MutationOutcome {
    pub fn is_committed(&self) -> bool {
        matches!(self, Self::Committed)
    }
}

/// Applies optimistic updates to cached data around a remote call.
pub struct MutationExecutor<T> {
    store: Arc<CacheStore<T>>,
}

impl<T> Clone for MutationExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T> MutationExecutor<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<CacheStore<T>>) -> Self {
        Self { store }
    }

    /// Patch the data under `key`, then run `remote_call`.
    ///
    /// `updater` changes the data and returns the inverse of that change.
    /// The patch is visible to subscribers before `remote_call` is polled.
    /// When the call fails the inverse is applied; no reconciliation fetch is
    /// made on success. A key without data is not patched, but the remote
    /// call is still made.
    pub async fn mutate<U, I, R, Fut>(
        &self,
        key: &CacheKey,
        updater: U,
        remote_call: R,
    ) -> MutationOutcome
    where
        U: FnOnce(&mut T) -> I,
        I: FnOnce(&mut T) + Send + 'static,
        R: FnOnce() -> Fut,
        Fut: Future<Output = Result<(), FetchError>>,
    {
        let patch = self.store.apply_patch(key, updater);
        if patch.is_none() {
            debug!(key = %key, "No cached data to patch");
        }

        match remote_call().await {
            Ok(()) => {
                if let Some(patch) = patch {
                    self.store.discard(patch);
                }
                MutationOutcome::Committed
            }
            Err(error) => {
                let undo = match patch {
                    Some(patch) => self.store.undo(patch),
                    None => UndoOutcome::Missing,
                };
                warn!(key = %key, error = %error, undo = ?undo, "Mutation failed, rolled back");
                MutationOutcome::RolledBack { error, undo }
            }
        }
    }
}
