//! Reactive query cache.
//!
//! [`CacheStore`] holds one [`CacheEntry`] per [`CacheKey`](holocron_core::CacheKey).
//! Each entry tracks the fetch lifecycle of one query together with the
//! request currently allowed to commit to it.
//!
//! # Consistency
//!
//! Every fetch cycle is tagged with a [`RequestId`]. Only the request recorded
//! as in flight may commit, so a late response to a superseded request can
//! never overwrite a newer one. Optimistic updates are recorded as [`Patch`]es
//! holding the inverse of their own change, so undoing one leaves overlapping
//! patches alone. Undoing a patch after a newer fetch has committed keeps the
//! fetched data.
//!
//! # Example
//!
//! ```ignore
//! let store = Arc::new(CacheStore::<Vec<Person>>::with_defaults());
//! let mut sub = store.subscribe(&key);
//!
//! if let FetchTicket::Started(id) = store.begin_fetch(&key) {
//!     store.commit_success(&key, id, people);
//! }
//! let people = sub.settled().await?;
//! ```

pub mod config;
pub mod entry;
pub mod patch;
pub mod stats;
pub mod store;
pub mod subscription;

pub use config::CacheConfig;
pub use entry::{CacheEntry, CommitOutcome, FetchTicket, QueryStatus, RequestId, UndoOutcome};
pub use patch::{Patch, PatchId};
pub use stats::CacheStats;
pub use store::CacheStore;
pub use subscription::Subscription;
