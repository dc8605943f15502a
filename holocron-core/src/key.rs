//! Cache key derivation for queries.
//!
//! A `CacheKey` can only be built from an endpoint name plus the query's
//! identifying arguments, so two logically identical queries always land on
//! the same cache entry.

use sha2::{Digest, Sha256};
use std::fmt;

/// Separator between canonicalized key components.
const SEPARATOR: u8 = 0x00;

/// Number of hex digits shown by `Display`.
const SHORT_DIGEST_LEN: usize = 12;

/// A deterministic identifier for a query.
///
/// # Derivation
///
/// Arguments are sorted by name and fed to SHA-256 together with the
/// endpoint, each component followed by a NUL byte:
///
/// `endpoint \0 name_1 \0 value_1 \0 ... name_n \0 value_n \0`
///
/// Argument order at the call site therefore does not matter, and distinct
/// queries collide only with SHA-256 probability.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct CacheKey {
    endpoint: String,
    digest: String,
}

impl CacheKey {
    /// Derive a key from an endpoint and its arguments.
    pub fn derive(endpoint: &str, args: &[(&str, &str)]) -> Self {
        let mut sorted: Vec<&(&str, &str)> = args.iter().collect();
        sorted.sort();

        let mut hasher = Sha256::new();
        hasher.update(endpoint.as_bytes());
        hasher.update([SEPARATOR]);
        for (name, value) in sorted {
            hasher.update(name.as_bytes());
            hasher.update([SEPARATOR]);
            hasher.update(value.as_bytes());
            hasher.update([SEPARATOR]);
        }

        Self {
            endpoint: endpoint.to_string(),
            digest: hex::encode(hasher.finalize()),
        }
    }

    /// Endpoint this key belongs to.
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Full hex-encoded SHA-256 digest.
    pub fn digest(&self) -> &str {
        &self.digest
    }
}

impl fmt::Display for CacheKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let short = &self.digest[..SHORT_DIGEST_LEN.min(self.digest.len())];
        write!(f, "{}({})", self.endpoint, short)
    }
}

/// Normalize a free-text search term for use as a query argument.
pub fn normalize_search(term: &str) -> &str {
    term.trim()
}
