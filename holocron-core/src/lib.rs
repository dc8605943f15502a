//! Holocron Core - Data Types, Cache Keys and List Windowing
//!
//! Pure data structures and pure functions. All other crates depend on this.
//! Nothing here performs I/O or owns mutable shared state.

pub mod entities;
pub mod error;
pub mod key;
pub mod window;

pub use entities::{update_by_identity, Film, Identified, PeoplePage, Person, PersonSummary};
pub use error::{FetchError, ValidationError};
pub use key::{normalize_search, CacheKey};
pub use window::{compute_window, max_scroll_offset, total_height, Window, DEFAULT_OVERSCAN};
