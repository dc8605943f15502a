//! The cache store: single source of truth for query state.
//!
//! Every entry lives in a `tokio::sync::watch` channel. Store operations
//! mutate the channel's value in place, which both updates the entry and
//! notifies subscribers. All operations take one short-lived lock around the
//! entry map and never hold it across an `.await`.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use holocron_core::{CacheKey, FetchError};
use tokio::sync::watch;
use tokio::time::Instant;
use tracing::{debug, trace};

use super::config::CacheConfig;
use super::entry::{CacheEntry, CommitOutcome, FetchTicket, QueryStatus, RequestId, UndoOutcome};
use super::patch::{Inverse, Patch, PatchId};
use super::stats::{CacheStats, StatsRecorder};
use super::subscription::Subscription;

/// Keyed store of query results and in-flight request state.
///
/// Construct one per application (or per test) and share it through an
/// `Arc`. Nothing about it is global.
pub struct CacheStore<T> {
    inner: Mutex<StoreInner<T>>,
    config: CacheConfig,
    stats: StatsRecorder,
}

struct StoreInner<T> {
    entries: HashMap<CacheKey, Slot<T>>,
    next_request_id: u64,
    next_patch_id: u64,
}

struct Slot<T> {
    tx: watch::Sender<CacheEntry<T>>,
    /// Set while the entry has no subscribers.
    unused_since: Option<Instant>,
}

impl<T> Slot<T> {
    fn new(key: CacheKey, now: Instant) -> Self {
        let (tx, _rx) = watch::channel(CacheEntry::idle(key));
        Self {
            tx,
            unused_since: Some(now),
        }
    }
}

impl<T> StoreInner<T> {
    fn slot(&mut self, key: &CacheKey, now: Instant) -> &mut Slot<T> {
        self.entries
            .entry(key.clone())
            .or_insert_with(|| Slot::new(key.clone(), now))
    }

    fn allocate_request_id(&mut self) -> RequestId {
        self.next_request_id += 1;
        RequestId(self.next_request_id)
    }

    fn allocate_patch_id(&mut self) -> PatchId {
        self.next_patch_id += 1;
        PatchId(self.next_patch_id)
    }
}

impl<T> CacheStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create an empty store.
    pub fn new(config: CacheConfig) -> Self {
        Self {
            inner: Mutex::new(StoreInner {
                entries: HashMap::new(),
                next_request_id: 0,
                next_patch_id: 0,
            }),
            config,
            stats: StatsRecorder::default(),
        }
    }

    /// Create an empty store with default configuration.
    pub fn with_defaults() -> Self {
        Self::new(CacheConfig::default())
    }

    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    /// Snapshot of the usage counters.
    pub fn stats(&self) -> CacheStats {
        self.stats.snapshot()
    }

    pub(crate) fn record_hit(&self) {
        self.stats.record_hit();
    }

    fn lock(&self) -> MutexGuard<'_, StoreInner<T>> {
        // Every operation leaves the map consistent before it can panic.
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Number of entries currently held.
    pub fn len(&self) -> usize {
        self.lock().entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn contains(&self, key: &CacheKey) -> bool {
        self.lock().entries.contains_key(key)
    }

    /// Snapshot of an entry without creating it.
    pub fn peek(&self, key: &CacheKey) -> Option<CacheEntry<T>> {
        self.lock()
            .entries
            .get(key)
            .map(|slot| slot.tx.borrow().clone())
    }

    /// Snapshot of the entry for `key`, creating an idle one if needed.
    pub fn get_or_create(&self, key: &CacheKey) -> CacheEntry<T> {
        let mut inner = self.lock();
        let slot = inner.slot(key, Instant::now());
        let entry = slot.tx.borrow().clone();
        entry
    }

    /// Start a fetch for `key`, or join the one already in flight.
    pub fn begin_fetch(&self, key: &CacheKey) -> FetchTicket {
        self.begin(key, false)
    }

    /// Start a fetch for `key` that supersedes any request in flight.
    ///
    /// A late response to the superseded request is discarded on commit.
    pub fn begin_refetch(&self, key: &CacheKey) -> FetchTicket {
        self.begin(key, true)
    }

    fn begin(&self, key: &CacheKey, supersede: bool) -> FetchTicket {
        let mut inner = self.lock();
        let now = Instant::now();
        let current = inner.slot(key, now).tx.borrow().inflight;

        if let (Some(request_id), false) = (current, supersede) {
            self.stats.record_join();
            debug!(key = %key, request_id = %request_id, "Joining in-flight fetch");
            return FetchTicket::Joined(request_id);
        }

        let request_id = inner.allocate_request_id();
        inner.slot(key, now).tx.send_modify(|entry| {
            entry.status = QueryStatus::Loading;
            entry.inflight = Some(request_id);
        });
        self.stats.record_miss();
        match current {
            Some(previous) => debug!(
                key = %key,
                request_id = %request_id,
                superseded = %previous,
                "Refetch supersedes in-flight request"
            ),
            None => debug!(key = %key, request_id = %request_id, "Fetch started"),
        }
        FetchTicket::Started(request_id)
    }

    /// Store a successful response if `request_id` is still current.
    pub fn commit_success(&self, key: &CacheKey, request_id: RequestId, data: T) -> CommitOutcome {
        self.commit(key, request_id, |entry| {
            entry.status = QueryStatus::Success;
            entry.data = Some(data);
            entry.error = None;
            entry.fetch_generation += 1;
        })
    }

    /// Store a failed response if `request_id` is still current.
    ///
    /// Data from the last success is kept.
    pub fn commit_error(
        &self,
        key: &CacheKey,
        request_id: RequestId,
        error: FetchError,
    ) -> CommitOutcome {
        self.commit(key, request_id, |entry| {
            entry.status = QueryStatus::Error;
            entry.error = Some(error);
        })
    }

    fn commit<F>(&self, key: &CacheKey, request_id: RequestId, apply: F) -> CommitOutcome
    where
        F: FnOnce(&mut CacheEntry<T>),
    {
        let inner = self.lock();
        let applied = match inner.entries.get(key) {
            Some(slot) => slot.tx.send_if_modified(|entry| {
                if entry.inflight != Some(request_id) {
                    return false;
                }
                apply(entry);
                entry.inflight = None;
                true
            }),
            None => false,
        };

        if applied {
            trace!(key = %key, request_id = %request_id, "Response committed");
            CommitOutcome::Applied
        } else {
            self.stats.record_stale();
            debug!(key = %key, request_id = %request_id, "Stale response discarded");
            CommitOutcome::Discarded
        }
    }

    /// Give up on `request_id` without a response.
    ///
    /// If it is still the current request, the entry settles as
    /// `FetchError::Cancelled` (keeping any earlier data), so waiters wake up
    /// and the next query fetches again. Returns whether anything changed.
    pub fn abandon(&self, key: &CacheKey, request_id: RequestId) -> bool {
        let inner = self.lock();
        let Some(slot) = inner.entries.get(key) else {
            return false;
        };
        let abandoned = slot.tx.send_if_modified(|entry| {
            if entry.inflight != Some(request_id) {
                return false;
            }
            entry.status = QueryStatus::Error;
            entry.error = Some(FetchError::Cancelled);
            entry.inflight = None;
            true
        });
        if abandoned {
            debug!(key = %key, request_id = %request_id, "In-flight request abandoned");
        }
        abandoned
    }

    /// Apply `updater` to the cached data for `key`.
    ///
    /// `updater` returns the inverse of the change it made; [`undo`](Self::undo)
    /// runs that inverse against the data as it is then, so overlapping
    /// patches on one entry reverse only their own change. Subscribers see the
    /// change immediately. Returns `None` (and leaves the store untouched)
    /// when there is no data to patch.
    pub fn apply_patch<F, I>(&self, key: &CacheKey, updater: F) -> Option<Patch<T>>
    where
        F: FnOnce(&mut T) -> I,
        I: FnOnce(&mut T) + Send + 'static,
    {
        let mut inner = self.lock();
        let slot = inner.entries.get(key)?;

        let mut taken: Option<(Inverse<T>, u64)> = None;
        slot.tx.send_if_modified(|entry| match entry.data.as_mut() {
            Some(data) => {
                let inverse: Inverse<T> = Box::new(updater(data));
                taken = Some((inverse, entry.fetch_generation));
                true
            }
            None => false,
        });

        let (inverse, fetch_generation) = taken?;
        let id = inner.allocate_patch_id();
        debug!(key = %key, patch_id = id.value(), "Optimistic patch applied");
        Some(Patch {
            id,
            key: key.clone(),
            inverse,
            fetch_generation,
        })
    }

    /// Reverse the change made by `patch`.
    ///
    /// If a fetch committed new data after the patch was taken, that data
    /// already reflects the server and is kept as is.
    pub fn undo(&self, patch: Patch<T>) -> UndoOutcome {
        let Patch {
            id,
            key,
            inverse,
            fetch_generation,
        } = patch;

        let inner = self.lock();
        let Some(slot) = inner.entries.get(&key) else {
            debug!(key = %key, patch_id = id.value(), "Undo target evicted");
            return UndoOutcome::Missing;
        };

        let mut outcome = UndoOutcome::Missing;
        slot.tx.send_if_modified(|entry| {
            if entry.fetch_generation != fetch_generation {
                outcome = UndoOutcome::Superseded;
                return false;
            }
            match entry.data.as_mut() {
                Some(data) => {
                    inverse(data);
                    outcome = UndoOutcome::Restored;
                    true
                }
                None => false,
            }
        });
        debug!(key = %key, patch_id = id.value(), outcome = ?outcome, "Optimistic patch undone");
        outcome
    }

    /// Drop a patch whose mutation succeeded.
    pub fn discard(&self, patch: Patch<T>) {
        trace!(key = %patch.key, patch_id = patch.id.value(), "Optimistic patch kept");
    }

    /// Subscribe to changes of the entry for `key`, creating it if needed.
    pub fn subscribe(self: &Arc<Self>, key: &CacheKey) -> Subscription<T> {
        let rx = {
            let mut inner = self.lock();
            let slot = inner.slot(key, Instant::now());
            slot.unused_since = None;
            slot.tx.send_if_modified(|entry| {
                entry.subscriber_count += 1;
                false
            });
            slot.tx.subscribe()
        };
        Subscription::new(Arc::clone(self), key.clone(), rx)
    }

    /// Drop one subscriber reference for `key`.
    pub(crate) fn release(&self, key: &CacheKey) {
        let mut inner = self.lock();
        let now = Instant::now();
        if let Some(slot) = inner.entries.get_mut(key) {
            let mut remaining = 0;
            slot.tx.send_if_modified(|entry| {
                entry.subscriber_count = entry.subscriber_count.saturating_sub(1);
                remaining = entry.subscriber_count;
                false
            });
            if remaining == 0 {
                slot.unused_since = Some(now);
            }
        }
        self.evict_locked(&mut inner, now);
    }

    /// Evict entries that have been unused for the configured grace period.
    ///
    /// Entries with a request in flight are never evicted. Returns the number
    /// of evicted entries.
    pub fn evict_unused(&self) -> usize {
        let mut inner = self.lock();
        self.evict_locked(&mut inner, Instant::now())
    }

    fn evict_locked(&self, inner: &mut StoreInner<T>, now: Instant) -> usize {
        let keep = self.config.keep_unused_for;
        let before = inner.entries.len();
        inner.entries.retain(|key, slot| {
            let expired = slot
                .unused_since
                .is_some_and(|since| now.saturating_duration_since(since) >= keep);
            let evict = expired && {
                let entry = slot.tx.borrow();
                entry.subscriber_count == 0 && entry.inflight.is_none()
            };
            if evict {
                debug!(key = %key, "Evicting unused entry");
            }
            !evict
        });
        let evicted = before - inner.entries.len();
        if evicted > 0 {
            self.stats.record_evictions(evicted as u64);
        }
        evicted
    }

    /// Drop every entry.
    ///
    /// Callers waiting on an entry observe `FetchError::Disposed`.
    pub fn dispose(&self) {
        let mut inner = self.lock();
        let count = inner.entries.len();
        inner.entries.clear();
        debug!(entries = count, "Cache store disposed");
    }
}
