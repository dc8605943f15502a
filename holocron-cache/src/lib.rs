//! Holocron Cache - Reactive Query and Mutation Cache
//!
//! Keyed cache of query results with request deduplication, recency-guarded
//! commits and optimistic mutations. The people catalog built on top of it
//! lives in [`catalog`].

pub mod cache;
pub mod catalog;
pub mod fanout;
pub mod mutation;
pub mod query;
pub mod transport;

pub use cache::{
    CacheConfig, CacheEntry, CacheStats, CacheStore, CommitOutcome, FetchTicket, Patch, PatchId,
    QueryStatus, RequestId, Subscription, UndoOutcome,
};
pub use catalog::{fetch_people, search_key, search_path, CatalogClient};
pub use fanout::try_fan_out;
pub use mutation::{MutationExecutor, MutationOutcome};
pub use query::{FetchPolicy, QueryExecutor};
pub use transport::{resource_path, Method, Request, Transport};
