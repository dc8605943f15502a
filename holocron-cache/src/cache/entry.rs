//! Cache entries and the values store operations hand back.

use holocron_core::{CacheKey, FetchError};
use std::fmt;

/// Fetch lifecycle of a cache entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum QueryStatus {
    /// Created, never fetched.
    Idle,
    /// A request is in flight. Previously fetched data may still be present.
    Loading,
    /// The latest request succeeded.
    Success,
    /// The latest request failed. The last successful data is kept.
    Error,
}

/// Identifier of one fetch cycle, unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct RequestId(pub(crate) u64);

impl RequestId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

impl fmt::Display for RequestId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Snapshot of one cached query.
///
/// Invariants maintained by the store:
/// - `status == Success` implies `data.is_some()` and `error.is_none()`
/// - `status == Error` implies `error.is_some()`
/// - `inflight.is_some()` exactly when `status == Loading`
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    pub key: CacheKey,
    pub status: QueryStatus,
    pub data: Option<T>,
    pub error: Option<FetchError>,
    pub subscriber_count: usize,
    pub inflight: Option<RequestId>,
    /// Number of successful commits so far.
    pub fetch_generation: u64,
}

impl<T> CacheEntry<T> {
    pub(crate) fn idle(key: CacheKey) -> Self {
        Self {
            key,
            status: QueryStatus::Idle,
            data: None,
            error: None,
            subscriber_count: 0,
            inflight: None,
            fetch_generation: 0,
        }
    }

    pub fn is_loading(&self) -> bool {
        self.status == QueryStatus::Loading
    }

    /// True once a fetch cycle has completed.
    pub fn is_settled(&self) -> bool {
        matches!(self.status, QueryStatus::Success | QueryStatus::Error)
    }

    pub fn is_error(&self) -> bool {
        self.status == QueryStatus::Error
    }
}

impl<T: Clone> CacheEntry<T> {
    /// Data of a settled success, if any.
    pub fn success_data(&self) -> Option<T> {
        match self.status {
            QueryStatus::Success => self.data.clone(),
            _ => None,
        }
    }

    /// Outcome of the last completed fetch cycle.
    pub fn result(&self) -> Option<Result<T, FetchError>> {
        match self.status {
            QueryStatus::Success => self.data.clone().map(Ok),
            QueryStatus::Error => self.error.clone().map(Err),
            QueryStatus::Idle | QueryStatus::Loading => None,
        }
    }
}

/// Result of [`begin_fetch`](super::CacheStore::begin_fetch).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FetchTicket {
    /// The caller owns a new request and must perform the fetch.
    Started(RequestId),
    /// A request was already in flight; the caller waits for it.
    Joined(RequestId),
}

impl FetchTicket {
    pub fn request_id(&self) -> RequestId {
        match self {
            Self::Started(id) | Self::Joined(id) => *id,
        }
    }

    pub fn is_started(&self) -> bool {
        matches!(self, Self::Started(_))
    }
}

/// Result of committing a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CommitOutcome {
    Applied,
    /// The response belonged to a superseded request and was dropped.
    Discarded,
}

/// Result of undoing an optimistic patch.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UndoOutcome {
    /// The patch's inverse was applied to the current data.
    Restored,
    /// A newer fetch replaced the data after the patch; the fetched data is kept.
    Superseded,
    /// The entry, or its data, no longer exists.
    Missing,
}
