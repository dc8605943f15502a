//! End-to-end catalog behavior against a scripted transport.

use holocron_cache::{
    search_key, search_path, CacheConfig, CacheStore, CatalogClient, Method, QueryStatus,
};
use holocron_test_utils::assertions::{assert_committed, assert_remote_status, assert_rolled_back};
use holocron_test_utils::fixtures::{
    film_path, leia, luke, luke_json, people_page, person_json, route_luke,
};
use holocron_test_utils::{FetchError, MockTransport, Transport, UndoOutcome};
use serde_json::Value;
use std::sync::Arc;
use std::time::Duration;

fn client_with(mock: &Arc<MockTransport>, config: CacheConfig) -> CatalogClient {
    let transport: Arc<dyn Transport> = Arc::clone(mock) as Arc<dyn Transport>;
    CatalogClient::new(transport, Arc::new(CacheStore::new(config)))
}

fn client(mock: &Arc<MockTransport>) -> CatalogClient {
    client_with(mock, CacheConfig::default())
}

#[tokio::test]
async fn search_resolves_film_titles() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let client = client(&mock);

    let people = client.search_people("luke").await.unwrap();

    assert_eq!(people, vec![luke()]);
    assert_eq!(mock.calls_to(Method::Get, &search_path("luke")), 1);
    assert_eq!(mock.calls_to(Method::Get, &film_path(1)), 1);
    assert_eq!(mock.calls_to(Method::Get, &film_path(2)), 1);
}

#[tokio::test]
async fn cached_search_skips_transport() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let client = client(&mock);

    let first = client.search_people("luke").await.unwrap();
    let calls = mock.call_count();
    let second = client.search_people("  luke ").await.unwrap();

    assert_eq!(first, second);
    assert_eq!(mock.call_count(), calls);
    assert_eq!(client.store().stats().hits, 1);
}

#[tokio::test]
async fn concurrent_searches_share_one_request() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let listing = mock.hold(Method::Get, search_path("luke"));
    let client = client(&mock);

    let release = async {
        mock.wait_for_calls(1).await;
        listing.open();
    };
    let (a, b, ()) = tokio::join!(
        client.search_people("luke"),
        client.search_people("luke"),
        release
    );

    assert_eq!(a.unwrap(), b.unwrap());
    assert_eq!(mock.calls_to(Method::Get, &search_path("luke")), 1);
    assert_eq!(client.store().stats().joined, 1);
}

#[tokio::test]
async fn late_response_does_not_overwrite_newer_one() {
    let mock = MockTransport::shared();
    let listing = search_path("luke");
    let first = mock.hold(Method::Get, listing.clone());
    let second = mock.hold(Method::Get, listing.clone());
    let client = client(&mock);

    let older = tokio::spawn({
        let client = client.clone();
        async move { client.search_people("luke").await }
    });
    mock.wait_for_calls(1).await;
    let newer = tokio::spawn({
        let client = client.clone();
        async move { client.refetch_people("luke").await }
    });
    mock.wait_for_calls(2).await;

    let leia_json = person_json("Leia Organa", "150", &[]);
    second.respond(Ok(people_page(&[leia_json])));
    let mut expected = leia();
    expected.mass = "77".to_string();
    expected.gender = "male".to_string();
    assert_eq!(newer.await.unwrap().unwrap(), vec![expected.clone()]);

    first.respond(Ok(people_page(&[])));
    assert_eq!(older.await.unwrap().unwrap(), vec![expected.clone()]);

    let entry = client.store().peek(&search_key("luke")).unwrap();
    assert_eq!(entry.status, QueryStatus::Success);
    assert_eq!(entry.data, Some(vec![expected]));
    assert_eq!(client.store().stats().stale_discarded, 1);
}

#[tokio::test]
async fn blank_search_never_calls_transport() {
    let mock = MockTransport::shared();
    let client = client(&mock);

    assert!(client.search_people("").await.unwrap().is_empty());
    assert!(client.search_people("   ").await.unwrap().is_empty());
    assert_eq!(mock.call_count(), 0);
}

#[tokio::test]
async fn films_keep_reference_order() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let slow = mock.hold(Method::Get, film_path(1));
    let client = client(&mock);

    let release = async {
        // Listing plus both films; the second film has already answered.
        mock.wait_for_calls(3).await;
        slow.open();
    };
    let (people, ()) = tokio::join!(client.search_people("luke"), release);

    assert_eq!(
        people.unwrap()[0].films,
        vec!["A New Hope".to_string(), "The Empire Strikes Back".to_string()]
    );
}

#[tokio::test]
async fn failed_film_fails_whole_search() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    mock.fail(Method::Get, film_path(2), FetchError::remote(500, "down"));
    let client = client(&mock);

    let result = client.search_people("luke").await;

    assert_remote_status(&result, 500);
    let entry = client.store().peek(&search_key("luke")).unwrap();
    assert_eq!(entry.status, QueryStatus::Error);
    assert!(entry.data.is_none());
}

#[tokio::test]
async fn malformed_film_is_a_decode_error() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    mock.route_get(film_path(1), Value::String("not a film".to_string()));
    let client = client(&mock);

    let result = client.search_people("luke").await;
    assert!(matches!(result, Err(FetchError::Decode { .. })));
}

#[tokio::test]
async fn refetch_keeps_previous_data_on_failure() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let client = client(&mock);
    client.search_people("luke").await.unwrap();

    mock.fail(Method::Get, search_path("luke"), FetchError::network("offline"));
    let result = client.refetch_people("luke").await;

    assert!(matches!(result, Err(FetchError::Network { .. })));
    let entry = client.store().peek(&search_key("luke")).unwrap();
    assert_eq!(entry.status, QueryStatus::Error);
    assert_eq!(entry.data, Some(vec![luke()]));
}

#[tokio::test]
async fn accepted_toggle_keeps_flip() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    mock.route_post("/api/favorites", Value::Null);
    let client = client(&mock);
    client.search_people("luke").await.unwrap();

    let outcome = client.toggle_favorite("luke", "Luke Skywalker").await;

    assert_committed(&outcome);
    let people = client.search_people("luke").await.unwrap();
    assert!(people[0].favorite);

    let posts: Vec<_> = mock
        .calls()
        .into_iter()
        .filter(|call| call.method == Method::Post)
        .collect();
    assert_eq!(posts.len(), 1);
    assert_eq!(posts[0].body, Some(serde_json::json!({ "name": "Luke Skywalker" })));
}

#[tokio::test]
async fn rejected_toggle_rolls_back() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let post = mock.hold(Method::Post, "/api/favorites");
    let client = client(&mock);
    client.search_people("luke").await.unwrap();
    let mut subscription = client.subscribe("luke");

    let toggle = tokio::spawn({
        let client = client.clone();
        async move { client.toggle_favorite("luke", "Luke Skywalker").await }
    });

    // The flip is visible while the request is pending.
    let patched = subscription.changed().await.unwrap();
    assert!(patched.data.unwrap()[0].favorite);

    post.respond(Err(FetchError::remote(500, "rejected")));
    let outcome = toggle.await.unwrap();

    assert_rolled_back(&outcome, UndoOutcome::Restored);
    let restored = subscription.current();
    assert_eq!(restored.data, Some(vec![luke()]));
    assert_eq!(restored.status, QueryStatus::Success);
}

#[tokio::test]
async fn refetch_during_toggle_wins_over_rollback() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let post = mock.hold(Method::Post, "/api/favorites");
    let client = client(&mock);
    client.search_people("luke").await.unwrap();

    let toggle = tokio::spawn({
        let client = client.clone();
        async move { client.toggle_favorite("luke", "Luke Skywalker").await }
    });
    mock.wait_for_calls(4).await;

    let mut fresh = luke_json();
    fresh["height"] = Value::String("173".to_string());
    mock.route_get(search_path("luke"), people_page(&[fresh]));
    client.refetch_people("luke").await.unwrap();

    post.respond(Err(FetchError::remote(500, "rejected")));
    let outcome = toggle.await.unwrap();

    assert_rolled_back(&outcome, UndoOutcome::Superseded);
    let people = client.search_people("luke").await.unwrap();
    assert_eq!(people[0].height, "173");
    assert!(!people[0].favorite);
}

#[tokio::test(start_paused = true)]
async fn unused_search_is_evicted_after_grace() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let client = client_with(
        &mock,
        CacheConfig::new().with_keep_unused_for(Duration::from_secs(5)),
    );
    client.search_people("luke").await.unwrap();
    let key = search_key("luke");

    tokio::time::advance(Duration::from_secs(4)).await;
    assert_eq!(client.store().evict_unused(), 0);
    assert!(client.store().contains(&key));

    tokio::time::advance(Duration::from_secs(1)).await;
    assert_eq!(client.store().evict_unused(), 1);
    assert!(!client.store().contains(&key));

    // The next search goes back to the transport.
    let calls = mock.call_count();
    client.search_people("luke").await.unwrap();
    assert!(mock.call_count() > calls);
}

#[tokio::test(start_paused = true)]
async fn subscribed_search_is_never_evicted() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let client = client_with(
        &mock,
        CacheConfig::new().with_keep_unused_for(Duration::from_secs(5)),
    );
    let subscription = client.subscribe("luke");
    client.search_people("luke").await.unwrap();

    tokio::time::advance(Duration::from_secs(60)).await;
    assert_eq!(client.store().evict_unused(), 0);

    drop(subscription);
    tokio::time::advance(Duration::from_secs(5)).await;
    assert_eq!(client.store().evict_unused(), 1);
}

#[tokio::test]
async fn disposed_store_fails_waiters() {
    let mock = MockTransport::shared();
    route_luke(&mock);
    let listing = mock.hold(Method::Get, search_path("luke"));
    let client = client(&mock);

    let search = tokio::spawn({
        let client = client.clone();
        async move { client.search_people("luke").await }
    });
    mock.wait_for_calls(1).await;
    let joined = tokio::spawn({
        let client = client.clone();
        async move { client.search_people("luke").await }
    });
    while client.store().stats().joined == 0 {
        tokio::task::yield_now().await;
    }

    client.store().dispose();
    listing.open();

    assert_eq!(joined.await.unwrap(), Err(FetchError::Disposed));
    // The owner's commit finds no entry to write to.
    assert_eq!(search.await.unwrap(), Err(FetchError::Disposed));
}

/// Route a search for `a` returning Luke and Leia.
fn route_luke_and_leia(mock: &MockTransport) {
    route_luke(mock);
    mock.route_get(
        search_path("a"),
        people_page(&[luke_json(), person_json("Leia Organa", "150", &[])]),
    );
}

fn favorites(client: &CatalogClient, search: &str) -> Vec<(String, bool)> {
    client
        .store()
        .peek(&search_key(search))
        .and_then(|entry| entry.data)
        .unwrap_or_default()
        .into_iter()
        .map(|person| (person.name, person.favorite))
        .collect()
}

fn spawn_toggle(
    client: &CatalogClient,
    name: &'static str,
) -> tokio::task::JoinHandle<holocron_cache::MutationOutcome> {
    let client = client.clone();
    tokio::spawn(async move { client.toggle_favorite("a", name).await })
}

#[tokio::test]
async fn rejected_toggle_keeps_other_accepted_toggle() {
    let mock = MockTransport::shared();
    route_luke_and_leia(&mock);
    let luke_post = mock.hold(Method::Post, "/api/favorites");
    let leia_post = mock.hold(Method::Post, "/api/favorites");
    let client = client(&mock);
    client.search_people("a").await.unwrap();
    let calls = mock.call_count();

    let luke_toggle = spawn_toggle(&client, "Luke Skywalker");
    mock.wait_for_calls(calls + 1).await;
    let leia_toggle = spawn_toggle(&client, "Leia Organa");
    mock.wait_for_calls(calls + 2).await;

    luke_post.respond(Err(FetchError::remote(500, "rejected")));
    assert_rolled_back(&luke_toggle.await.unwrap(), UndoOutcome::Restored);
    leia_post.respond(Ok(Value::Null));
    assert_committed(&leia_toggle.await.unwrap());

    assert_eq!(
        favorites(&client, "a"),
        vec![
            ("Luke Skywalker".to_string(), false),
            ("Leia Organa".to_string(), true)
        ]
    );
}

#[tokio::test]
async fn later_rollback_does_not_revive_earlier_rejected_toggle() {
    let mock = MockTransport::shared();
    route_luke_and_leia(&mock);
    let luke_post = mock.hold(Method::Post, "/api/favorites");
    let leia_post = mock.hold(Method::Post, "/api/favorites");
    let client = client(&mock);
    client.search_people("a").await.unwrap();
    let calls = mock.call_count();

    let luke_toggle = spawn_toggle(&client, "Luke Skywalker");
    mock.wait_for_calls(calls + 1).await;
    let leia_toggle = spawn_toggle(&client, "Leia Organa");
    mock.wait_for_calls(calls + 2).await;

    luke_post.respond(Err(FetchError::remote(500, "rejected")));
    luke_toggle.await.unwrap();
    leia_post.respond(Err(FetchError::remote(500, "rejected")));
    leia_toggle.await.unwrap();

    assert_eq!(
        favorites(&client, "a"),
        vec![
            ("Luke Skywalker".to_string(), false),
            ("Leia Organa".to_string(), false)
        ]
    );
}

#[tokio::test]
async fn double_toggle_settling_out_of_order_matches_server() {
    let mock = MockTransport::shared();
    route_luke_and_leia(&mock);
    let first_post = mock.hold(Method::Post, "/api/favorites");
    let second_post = mock.hold(Method::Post, "/api/favorites");
    let client = client(&mock);
    client.search_people("a").await.unwrap();
    let calls = mock.call_count();

    let first = spawn_toggle(&client, "Luke Skywalker");
    mock.wait_for_calls(calls + 1).await;
    let second = spawn_toggle(&client, "Luke Skywalker");
    mock.wait_for_calls(calls + 2).await;
    assert_eq!(favorites(&client, "a")[0], ("Luke Skywalker".to_string(), false));

    // The server applies only the second toggle.
    second_post.respond(Ok(Value::Null));
    assert_committed(&second.await.unwrap());
    first_post.respond(Err(FetchError::remote(500, "rejected")));
    assert_rolled_back(&first.await.unwrap(), UndoOutcome::Restored);

    assert_eq!(favorites(&client, "a")[0], ("Luke Skywalker".to_string(), true));
}
