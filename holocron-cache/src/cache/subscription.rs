//! Subscriber handles.

use std::sync::Arc;

use holocron_core::{CacheKey, FetchError};
use tokio::sync::watch;

use super::entry::CacheEntry;
use super::store::CacheStore;

/// A live reference to one cache entry.
///
/// While a subscription exists the entry is not evicted. Dropping it
/// releases the reference; after the configured grace period an unused
/// entry may be evicted.
pub struct Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    store: Arc<CacheStore<T>>,
    key: CacheKey,
    rx: watch::Receiver<CacheEntry<T>>,
}

impl<T> Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        store: Arc<CacheStore<T>>,
        key: CacheKey,
        rx: watch::Receiver<CacheEntry<T>>,
    ) -> Self {
        Self { store, key, rx }
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Latest snapshot of the entry.
    pub fn current(&self) -> CacheEntry<T> {
        self.rx.borrow().clone()
    }

    /// Wait for the next change and return the new snapshot.
    ///
    /// Returns `None` once the store has dropped the entry.
    pub async fn changed(&mut self) -> Option<CacheEntry<T>> {
        self.rx.changed().await.ok()?;
        Some(self.rx.borrow_and_update().clone())
    }

    /// Wait until the entry holds the outcome of a completed fetch cycle.
    pub async fn settled(&mut self) -> Result<T, FetchError> {
        let entry = self
            .rx
            .wait_for(|entry| entry.is_settled())
            .await
            .map_err(|_| FetchError::Disposed)?;
        entry.result().unwrap_or(Err(FetchError::Disposed))
    }

    /// Release the reference explicitly.
    pub fn unsubscribe(self) {
        drop(self);
    }
}

impl<T> Drop for Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        self.store.release(&self.key);
    }
}

impl<T> std::fmt::Debug for Subscription<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("key", &self.key)
            .finish_non_exhaustive()
    }
}
