//! People catalog: the search query and the favorite mutation.
//!
//! A search resolves in two stages. The listing endpoint returns people whose
//! films are resource URLs; every film of every person is then fetched
//! concurrently and the titles are merged back in reference order. Any failed
//! request fails the whole search.

use std::sync::Arc;

use holocron_core::{
    normalize_search, update_by_identity, CacheKey, FetchError, Film, PeoplePage, Person,
};
use serde_json::json;
use tracing::{debug, info};

use crate::cache::{CacheStore, Subscription};
use crate::fanout::try_fan_out;
use crate::mutation::{MutationExecutor, MutationOutcome};
use crate::query::{FetchPolicy, QueryExecutor};
use crate::transport::{resource_path, Request, Transport};

/// Endpoint name for people searches, part of every search cache key.
pub const SEARCH_PEOPLE: &str = "searchPeople";

/// Listing endpoint.
pub const PEOPLE_PATH: &str = "/api/people/";

/// Favorite toggle endpoint.
pub const FAVORITES_PATH: &str = "/api/favorites";

/// Cache key of the search for `search`.
///
/// Terms that differ only in surrounding whitespace share a key.
pub fn search_key(search: &str) -> CacheKey {
    CacheKey::derive(SEARCH_PEOPLE, &[("search", normalize_search(search))])
}

/// Listing path for an already-trimmed term.
pub fn search_path(term: &str) -> String {
    format!("{}?search={}&page=1", PEOPLE_PATH, urlencoding::encode(term))
}

/// Fetch people matching `search` with their film titles resolved.
///
/// A blank term yields an empty list without touching the transport.
pub async fn fetch_people(
    transport: &dyn Transport,
    search: &str,
) -> Result<Vec<Person>, FetchError> {
    let term = normalize_search(search);
    if term.is_empty() {
        return Ok(Vec::new());
    }

    let body = transport.request(Request::get(search_path(term))).await?;
    let page: PeoplePage = serde_json::from_value(body)?;
    let summaries = page.into_results();
    debug!(term, count = summaries.len(), "People listing received");

    try_fan_out(summaries, move |mut summary| async move {
        let references = std::mem::take(&mut summary.films);
        let films = try_fan_out(references, move |reference| async move {
            let path = resource_path(&reference)?;
            let body = transport.request(Request::get(path)).await?;
            let film: Film = serde_json::from_value(body)?;
            Ok::<_, FetchError>(film.title)
        })
        .await?;
        Ok(Person::from_summary(summary, films))
    })
    .await
}

/// Client for the people catalog, backed by a shared cache store.
#[derive(Clone)]
pub struct CatalogClient {
    transport: Arc<dyn Transport>,
    store: Arc<CacheStore<Vec<Person>>>,
    queries: QueryExecutor<Vec<Person>>,
    mutations: MutationExecutor<Vec<Person>>,
}

impl CatalogClient {
    pub fn new(transport: Arc<dyn Transport>, store: Arc<CacheStore<Vec<Person>>>) -> Self {
        Self {
            queries: QueryExecutor::new(Arc::clone(&store)),
            mutations: MutationExecutor::new(Arc::clone(&store)),
            transport,
            store,
        }
    }

    pub fn store(&self) -> &Arc<CacheStore<Vec<Person>>> {
        &self.store
    }

    /// Subscribe to the cache entry of `search`.
    pub fn subscribe(&self, search: &str) -> Subscription<Vec<Person>> {
        self.store.subscribe(&search_key(search))
    }

    /// Resolve `search`, answering from the cache when possible.
    pub async fn search_people(&self, search: &str) -> Result<Vec<Person>, FetchError> {
        self.run_search(search, FetchPolicy::CacheFirst).await
    }

    /// Resolve `search` from the remote catalog, superseding any fetch in flight.
    pub async fn refetch_people(&self, search: &str) -> Result<Vec<Person>, FetchError> {
        self.run_search(search, FetchPolicy::Refetch).await
    }

    async fn run_search(&self, search: &str, policy: FetchPolicy) -> Result<Vec<Person>, FetchError> {
        let key = search_key(search);
        let transport = Arc::clone(&self.transport);
        self.queries
            .execute_with(&key, policy, || async move {
                fetch_people(transport.as_ref(), search).await
            })
            .await
    }

    /// Flip the favorite flag of `name` in the cached results of `search`.
    ///
    /// The flip is visible immediately and undone if the server rejects it.
    pub async fn toggle_favorite(&self, search: &str, name: &str) -> MutationOutcome {
        let key = search_key(search);
        let transport = Arc::clone(&self.transport);
        let body = json!({ "name": name });
        info!(search, name, "Toggling favorite");

        self.mutations
            .mutate(
                &key,
                |people| {
                    let found = update_by_identity(people, name, Person::toggle_favorite);
                    if !found {
                        debug!(name, "Person not in cached results");
                    }
                    // A second flip is the inverse; it commutes with other toggles.
                    let name = name.to_string();
                    move |people: &mut Vec<Person>| {
                        if found {
                            update_by_identity(people, &name, Person::toggle_favorite);
                        }
                    }
                },
                move || async move {
                    transport
                        .request(Request::post(FAVORITES_PATH, body))
                        .await
                        .map(|_| ())
                },
            )
            .await
    }
}

impl std::fmt::Debug for CatalogClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CatalogClient")
            .field("entries", &self.store.len())
            .finish_non_exhaustive()
    }
}
