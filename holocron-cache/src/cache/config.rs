//! Cache store configuration.

use std::time::Duration;

/// Configuration for the cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CacheConfig {
    /// How long an entry with no subscribers is kept before it may be evicted.
    pub keep_unused_for: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            keep_unused_for: Duration::from_secs(60),
        }
    }
}

impl CacheConfig {
    /// Create a new cache config with default values.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the grace period for unused entries.
    pub fn with_keep_unused_for(mut self, duration: Duration) -> Self {
        self.keep_unused_for = duration;
        self
    }
}
