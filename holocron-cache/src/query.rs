//! Query executor: cache-first reads with request deduplication.

use std::future::Future;
use std::sync::Arc;

use holocron_core::{CacheKey, FetchError};
use tracing::{debug, warn};

use crate::cache::{CacheStore, CommitOutcome, FetchTicket, RequestId};

/// How a query treats an existing cached success.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FetchPolicy {
    /// Return cached data when the entry holds a success.
    #[default]
    CacheFirst,
    /// Always fetch, superseding any request in flight.
    Refetch,
}

/// Runs fetch functions against a [`CacheStore`].
///
/// Identical concurrent queries share one fetch. A response that lost the
/// race against a newer request is dropped, and the caller receives the
/// newer result instead.
pub struct QueryExecutor<T> {
    store: Arc<CacheStore<T>>,
}

impl<T> Clone for QueryExecutor<T> {
    fn clone(&self) -> Self {
        Self {
            store: Arc::clone(&self.store),
        }
    }
}

impl<T> QueryExecutor<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new(store: Arc<CacheStore<T>>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<CacheStore<T>> {
        &self.store
    }

    /// Resolve `key` cache-first, calling `fetch` only on a miss.
    pub async fn execute<F, Fut>(&self, key: &CacheKey, fetch: F) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        self.execute_with(key, FetchPolicy::CacheFirst, fetch).await
    }

    /// Resolve `key` under an explicit [`FetchPolicy`].
    pub async fn execute_with<F, Fut>(
        &self,
        key: &CacheKey,
        policy: FetchPolicy,
        fetch: F,
    ) -> Result<T, FetchError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, FetchError>>,
    {
        // Holding a subscription keeps the entry alive for the whole cycle.
        let mut subscription = self.store.subscribe(key);

        if policy == FetchPolicy::CacheFirst {
            if let Some(data) = subscription.current().success_data() {
                self.store.record_hit();
                debug!(key = %key, "Cache hit");
                return Ok(data);
            }
        }

        let ticket = match policy {
            FetchPolicy::CacheFirst => self.store.begin_fetch(key),
            FetchPolicy::Refetch => self.store.begin_refetch(key),
        };
        let request_id = match ticket {
            FetchTicket::Started(id) => id,
            FetchTicket::Joined(_) => return subscription.settled().await,
        };

        // Dropping this future mid-fetch must not leave the entry loading.
        let mut started = StartedFetch {
            store: &self.store,
            key,
            request_id,
            settled: false,
        };
        let result = fetch().await;
        started.settled = true;
        let outcome = match &result {
            Ok(data) => self.store.commit_success(key, request_id, data.clone()),
            Err(err) => {
                warn!(key = %key, request_id = %request_id, error = %err, "Fetch failed");
                self.store.commit_error(key, request_id, err.clone())
            }
        };

        match outcome {
            CommitOutcome::Applied => result,
            CommitOutcome::Discarded => subscription.settled().await,
        }
    }
}

/// Abandons a started request unless its response was committed.
struct StartedFetch<'a, T>
where
    T: Clone + Send + Sync + 'static,
{
    store: &'a CacheStore<T>,
    key: &'a CacheKey,
    request_id: RequestId,
    settled: bool,
}

impl<T> Drop for StartedFetch<'_, T>
where
    T: Clone + Send + Sync + 'static,
{
    fn drop(&mut self) {
        if !self.settled {
            self.store.abandon(self.key, self.request_id);
        }
    }
}
