//! Background tasks tying the UI to the catalog client.

use crate::events::TuiEvent;
use crate::state::QueryView;
use holocron_cache::{CatalogClient, MutationOutcome};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info};

/// The live subscription for the committed search.
///
/// Starting a session subscribes to the search's cache entry, kicks off the
/// query and forwards every entry snapshot as [`TuiEvent::QueryUpdated`].
/// Dropping the session stops forwarding and releases the subscription.
pub struct SearchSession {
    search: String,
    forwarder: JoinHandle<()>,
}

impl SearchSession {
    pub fn start(client: &CatalogClient, search: &str, events: mpsc::Sender<TuiEvent>) -> Self {
        let mut subscription = client.subscribe(search);
        let term = search.to_string();

        let forwarder = tokio::spawn(async move {
            let mut view = QueryView::from_entry(&subscription.current());
            loop {
                let event = TuiEvent::QueryUpdated {
                    search: term.clone(),
                    view,
                };
                if events.send(event).await.is_err() {
                    break;
                }
                match subscription.changed().await {
                    Some(entry) => view = QueryView::from_entry(&entry),
                    None => break,
                }
            }
        });

        let session = Self {
            search: search.to_string(),
            forwarder,
        };
        session.spawn_search(client, false);
        session
    }

    pub fn search(&self) -> &str {
        &self.search
    }

    /// Fetch the search again, ignoring the cached result.
    pub fn refetch(&self, client: &CatalogClient) {
        info!(search = %self.search, "Refetching search");
        self.spawn_search(client, true);
    }

    fn spawn_search(&self, client: &CatalogClient, refetch: bool) {
        let client = client.clone();
        let search = self.search.clone();
        tokio::spawn(async move {
            let result = if refetch {
                client.refetch_people(&search).await
            } else {
                client.search_people(&search).await
            };
            match result {
                Ok(people) => debug!(search = %search, count = people.len(), "Search settled"),
                Err(err) => debug!(search = %search, error = %err, "Search failed"),
            }
        });
    }
}

impl Drop for SearchSession {
    fn drop(&mut self) {
        self.forwarder.abort();
    }
}

/// Toggle a favorite in the background.
///
/// A rejected toggle is reported as [`TuiEvent::FavoriteRolledBack`] so the
/// UI can revert its favorite-name set.
pub fn spawn_toggle_favorite(
    client: &CatalogClient,
    search: &str,
    name: &str,
    events: mpsc::Sender<TuiEvent>,
) -> JoinHandle<()> {
    let client = client.clone();
    let search = search.to_string();
    let name = name.to_string();
    tokio::spawn(async move {
        if let MutationOutcome::RolledBack { .. } = client.toggle_favorite(&search, &name).await {
            let _ = events.send(TuiEvent::FavoriteRolledBack { name }).await;
        }
    })
}
