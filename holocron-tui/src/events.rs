//! Event types for the TUI event loop.

use crate::state::QueryView;
use crossterm::event::KeyEvent;
use tokio::sync::mpsc::{self, error::TrySendError};
use tracing::warn;

#[derive(Debug, Clone)]
pub enum TuiEvent {
    Input(KeyEvent),
    Resize { width: u16, height: u16 },
    /// The debounce delay elapsed; the input text becomes the search.
    CommitSearch,
    /// New snapshot of the cache entry for `search`.
    QueryUpdated { search: String, view: QueryView },
    /// The server rejected a favorite toggle and the cache rolled it back.
    FavoriteRolledBack { name: String },
}

/// Debounce callback that queues a search commit on `commits`.
///
/// The channel should have capacity 1: a full channel means a commit is
/// already queued and this one coalesces into it.
pub fn commit_trigger(commits: mpsc::Sender<()>) -> impl FnMut() + Send + 'static {
    move || match commits.try_send(()) {
        Ok(()) | Err(TrySendError::Full(())) => {}
        Err(TrySendError::Closed(())) => warn!("Search commit dropped, event loop has stopped"),
    }
}
