//! Optimistic patches.

use std::fmt;

use holocron_core::CacheKey;

/// Identifier of one optimistic patch, unique per store.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct PatchId(pub(crate) u64);

impl PatchId {
    pub fn value(&self) -> u64 {
        self.0
    }
}

/// Reverses one optimistic update on whatever the cached data is at undo time.
pub(crate) type Inverse<T> = Box<dyn FnOnce(&mut T) + Send>;

/// An applied optimistic update, kept until its mutation settles.
///
/// The patch owns the inverse of its own update and nothing else, so undoing
/// it leaves changes made by other patches in place. It is not `Clone`:
/// [`CacheStore::undo`](super::CacheStore::undo) and
/// [`CacheStore::discard`](super::CacheStore::discard) take it by value, so a
/// patch is undone or discarded at most once.
pub struct Patch<T> {
    pub(crate) id: PatchId,
    pub(crate) key: CacheKey,
    pub(crate) inverse: Inverse<T>,
    pub(crate) fetch_generation: u64,
}

impl<T> Patch<T> {
    pub fn id(&self) -> PatchId {
        self.id
    }

    pub fn key(&self) -> &CacheKey {
        &self.key
    }

    /// Fetch generation of the entry when the patch was taken.
    pub fn fetch_generation(&self) -> u64 {
        self.fetch_generation
    }
}

impl<T> fmt::Debug for Patch<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Patch")
            .field("id", &self.id)
            .field("key", &self.key)
            .field("fetch_generation", &self.fetch_generation)
            .finish_non_exhaustive()
    }
}
