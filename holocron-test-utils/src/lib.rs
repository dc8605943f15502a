//! Holocron Test Utilities
//!
//! Centralized test infrastructure for the Holocron workspace:
//! - A scripted mock transport with gates and a call log
//! - Test fixtures for the catalog
//! - Proptest generators for catalog types
//! - Custom assertions for cache outcomes

pub use holocron_cache::{
    CacheConfig, CacheStore, CatalogClient, Method, MutationOutcome, Request, Transport,
    UndoOutcome,
};
pub use holocron_core::{FetchError, Person, PersonSummary};

use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, VecDeque};
use std::sync::{Arc, Mutex, PoisonError};
use tokio::sync::{oneshot, Notify};

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

type Route = (Method, String);

/// Controls when one held request completes.
///
/// Dropping a gate without opening it releases the request with its routed
/// response.
#[derive(Debug)]
pub struct Gate {
    tx: oneshot::Sender<Option<Result<Value, FetchError>>>,
}

impl Gate {
    /// Let the request complete with the routed response.
    pub fn open(self) {
        let _ = self.tx.send(None);
    }

    /// Let the request complete with `response` instead of the routed one.
    pub fn respond(self, response: Result<Value, FetchError>) {
        let _ = self.tx.send(Some(response));
    }
}

#[derive(Default)]
struct MockState {
    routes: HashMap<Route, Result<Value, FetchError>>,
    gates: HashMap<Route, VecDeque<oneshot::Receiver<Option<Result<Value, FetchError>>>>>,
    calls: Vec<Request>,
}

/// In-memory [`Transport`] answering from scripted routes.
///
/// Every request is recorded. Unrouted paths answer `404`.
#[derive(Default)]
pub struct MockTransport {
    state: Mutex<MockState>,
    arrived: Notify,
}

impl MockTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Wrap in an `Arc` for sharing with a [`CatalogClient`].
    pub fn shared() -> Arc<Self> {
        Arc::new(Self::new())
    }

    fn state(&self) -> std::sync::MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Answer `GET path` with `body`.
    pub fn route_get(&self, path: impl Into<String>, body: Value) -> &Self {
        self.route(Method::Get, path, Ok(body))
    }

    /// Answer `POST path` with `body`.
    pub fn route_post(&self, path: impl Into<String>, body: Value) -> &Self {
        self.route(Method::Post, path, Ok(body))
    }

    /// Fail `method path` with `error`.
    pub fn fail(&self, method: Method, path: impl Into<String>, error: FetchError) -> &Self {
        self.route(method, path, Err(error))
    }

    pub fn route(
        &self,
        method: Method,
        path: impl Into<String>,
        response: Result<Value, FetchError>,
    ) -> &Self {
        self.state().routes.insert((method, path.into()), response);
        self
    }

    /// Hold the next request to `method path` until the returned gate opens.
    ///
    /// Holding the same route several times queues gates in call order.
    pub fn hold(&self, method: Method, path: impl Into<String>) -> Gate {
        let (tx, rx) = oneshot::channel();
        self.state()
            .gates
            .entry((method, path.into()))
            .or_default()
            .push_back(rx);
        Gate { tx }
    }

    /// Every request received so far, in arrival order.
    pub fn calls(&self) -> Vec<Request> {
        self.state().calls.clone()
    }

    pub fn call_count(&self) -> usize {
        self.state().calls.len()
    }

    /// Number of requests received for `method path`.
    pub fn calls_to(&self, method: Method, path: &str) -> usize {
        self.state()
            .calls
            .iter()
            .filter(|call| call.method == method && call.path == path)
            .count()
    }

    /// Wait until at least `count` requests have arrived.
    pub async fn wait_for_calls(&self, count: usize) {
        loop {
            let arrived = self.arrived.notified();
            if self.call_count() >= count {
                return;
            }
            arrived.await;
        }
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn request(&self, request: Request) -> Result<Value, FetchError> {
        let route = (request.method, request.path.clone());
        let gate = {
            let mut state = self.state();
            state.calls.push(request);
            state.gates.get_mut(&route).and_then(VecDeque::pop_front)
        };
        self.arrived.notify_waiters();

        if let Some(gate) = gate {
            if let Ok(Some(response)) = gate.await {
                return response;
            }
        }

        self.state().routes.get(&route).cloned().unwrap_or_else(|| {
            Err(FetchError::remote(
                404,
                format!("no route for {} {}", route.0, route.1),
            ))
        })
    }
}

// ============================================================================
// TEST FIXTURES
// ============================================================================

pub mod fixtures {
    //! Pre-built catalog data for common testing scenarios.

    use super::*;
    use holocron_cache::search_path;
    use serde_json::json;

    /// Absolute URL of a film resource, as the catalog links it.
    pub fn film_url(id: u32) -> String {
        format!("https://swapi.py4e.com/api/films/{id}/")
    }

    /// Request path of a film resource.
    pub fn film_path(id: u32) -> String {
        format!("/api/films/{id}/")
    }

    pub fn film_json(title: &str) -> Value {
        json!({ "title": title, "episode_id": 4, "director": "George Lucas" })
    }

    /// Listing body as the remote catalog returns it.
    pub fn people_page(results: &[Value]) -> Value {
        json!({ "count": results.len(), "next": null, "previous": null, "results": results })
    }

    pub fn person_json(name: &str, height: &str, film_ids: &[u32]) -> Value {
        let films: Vec<String> = film_ids.iter().map(|id| film_url(*id)).collect();
        json!({
            "name": name,
            "height": height,
            "mass": "77",
            "gender": "male",
            "films": films,
            "url": "https://swapi.py4e.com/api/people/1/",
        })
    }

    pub fn luke_json() -> Value {
        person_json("Luke Skywalker", "172", &[1, 2])
    }

    /// Luke with resolved films, as cached.
    pub fn luke() -> Person {
        Person {
            name: "Luke Skywalker".to_string(),
            height: "172".to_string(),
            mass: "77".to_string(),
            gender: "male".to_string(),
            films: vec!["A New Hope".to_string(), "The Empire Strikes Back".to_string()],
            favorite: false,
        }
    }

    pub fn leia() -> Person {
        Person {
            name: "Leia Organa".to_string(),
            height: "150".to_string(),
            mass: "49".to_string(),
            gender: "female".to_string(),
            films: vec![],
            favorite: false,
        }
    }

    /// Route a search for `luke` returning Luke and his two films.
    pub fn route_luke(transport: &MockTransport) {
        transport
            .route_get(search_path("luke"), people_page(&[luke_json()]))
            .route_get(film_path(1), film_json("A New Hope"))
            .route_get(film_path(2), film_json("The Empire Strikes Back"));
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for catalog types.

    use super::*;
    use proptest::prelude::*;

    /// A person name: one to three capitalized words.
    pub fn arb_name() -> impl Strategy<Value = String> {
        prop::collection::vec("[A-Z][a-z]{1,8}", 1..=3).prop_map(|words| words.join(" "))
    }

    pub fn arb_person() -> impl Strategy<Value = Person> {
        (
            arb_name(),
            "[1-9][0-9]{1,2}",
            "[1-9][0-9]{1,2}|unknown",
            prop_oneof![Just("male"), Just("female"), Just("n/a")],
            prop::collection::vec("[A-Z][a-z]{2,10}", 0..4),
            any::<bool>(),
        )
            .prop_map(|(name, height, mass, gender, films, favorite)| Person {
                name,
                height,
                mass,
                gender: gender.to_string(),
                films,
                favorite,
            })
    }

    /// People with distinct names.
    pub fn arb_people(max: usize) -> impl Strategy<Value = Vec<Person>> {
        prop::collection::vec(arb_person(), 0..=max).prop_map(|mut people| {
            let mut seen = std::collections::HashSet::new();
            people.retain(|person| seen.insert(person.name.clone()));
            people
        })
    }

    /// A search term, possibly padded with whitespace or blank.
    pub fn arb_search_term() -> impl Strategy<Value = String> {
        prop_oneof![
            "[a-z]{1,10}",
            "[ \t]{0,3}[a-z0-9 ]{1,10}[ \t]{0,3}",
            "[ \t]{0,4}",
        ]
    }
}

// ============================================================================
// CUSTOM ASSERTIONS
// ============================================================================

pub mod assertions {
    //! Assertions for cache and mutation outcomes.

    use super::*;

    /// Assert that a mutation committed.
    #[track_caller]
    pub fn assert_committed(outcome: &MutationOutcome) {
        assert!(outcome.is_committed(), "Expected Committed, got: {:?}", outcome);
    }

    /// Assert that a mutation rolled back with the given undo result.
    #[track_caller]
    pub fn assert_rolled_back(outcome: &MutationOutcome, expected: UndoOutcome) {
        match outcome {
            MutationOutcome::RolledBack { undo, .. } => {
                assert_eq!(*undo, expected, "Wrong undo outcome");
            }
            other => panic!("Expected RolledBack, got: {:?}", other),
        }
    }

    /// Assert that a result failed with a remote error of `status`.
    #[track_caller]
    pub fn assert_remote_status<T: std::fmt::Debug>(result: &Result<T, FetchError>, status: u16) {
        match result {
            Err(err) => assert_eq!(err.status(), Some(status), "Wrong error: {:?}", err),
            other => panic!("Expected remote error {}, got: {:?}", status, other),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_mock_answers_routes_and_logs_calls() {
        let mock = MockTransport::new();
        mock.route_get("/api/films/1/", json!({"title": "A New Hope"}));

        let ok = mock.request(Request::get("/api/films/1/")).await;
        let missing = mock.request(Request::get("/api/films/9/")).await;

        assert_eq!(ok, Ok(json!({"title": "A New Hope"})));
        assertions::assert_remote_status(&missing, 404);
        assert_eq!(mock.call_count(), 2);
        assert_eq!(mock.calls_to(Method::Get, "/api/films/1/"), 1);
    }

    #[tokio::test]
    async fn test_gate_overrides_response() {
        let mock = Arc::new(MockTransport::new());
        mock.route_get("/x", json!(1));
        let gate = mock.hold(Method::Get, "/x");

        let pending = {
            let mock = Arc::clone(&mock);
            tokio::spawn(async move { mock.request(Request::get("/x")).await })
        };
        mock.wait_for_calls(1).await;
        gate.respond(Ok(json!(2)));

        assert_eq!(pending.await.unwrap(), Ok(json!(2)));
        // Gates are single-use.
        assert_eq!(mock.request(Request::get("/x")).await, Ok(json!(1)));
    }

    #[test]
    fn test_fixture_luke_matches_route() {
        let luke = fixtures::luke();
        assert_eq!(luke.row_key(), "Luke Skywalker_172");
        assert_eq!(fixtures::film_path(1), "/api/films/1/");
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(50))]

        #[test]
        fn prop_generated_people_have_unique_names(people in generators::arb_people(8)) {
            let mut names: Vec<_> = people.iter().map(|p| p.name.as_str()).collect();
            names.sort_unstable();
            names.dedup();
            prop_assert_eq!(names.len(), people.len());
        }
    }
}
