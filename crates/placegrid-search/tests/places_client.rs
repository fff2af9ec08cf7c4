//! Integration tests for `PlacesClient` as an `AreaQuery`.
//!
//! Each test stands up a `wiremock` server, so no real network traffic is
//! made. Pacing is disabled and backoff is zero so retries run instantly.

use placegrid_core::{Coordinate, SearchFilters};
use serde_json::json;
use wiremock::matchers::{method, path, query_param, query_param_is_missing};
use wiremock::{Mock, MockServer, ResponseTemplate};

use placegrid_search::pagination::MAX_PAGES;
use placegrid_search::{AreaQuery, EventLevel, Pacing, PlacesClient, SearchEventLog};

const CENTER: Coordinate = Coordinate {
    latitude: 40.7128,
    longitude: -74.006,
};

/// Builds a client against `server` with no pacing and no retries.
fn test_client(server: &MockServer) -> PlacesClient {
    test_client_with_retries(server, 0)
}

fn test_client_with_retries(server: &MockServer, max_retries: u32) -> PlacesClient {
    PlacesClient::with_base_url("test-key", 5, "placegrid-test/0.1", &server.uri())
        .expect("failed to build test PlacesClient")
        .with_pacing(Pacing::none())
        .with_retry_policy(max_retries, 0)
}

fn page(ids: &[&str], next: Option<&str>) -> serde_json::Value {
    let results: Vec<_> = ids
        .iter()
        .map(|id| {
            json!({
                "place_id": id,
                "name": format!("Summary {id}"),
                "vicinity": "1 Main St"
            })
        })
        .collect();
    let mut body = json!({ "status": "OK", "results": results });
    if let Some(token) = next {
        body["next_page_token"] = json!(token);
    }
    body
}

fn detail(name: &str) -> serde_json::Value {
    json!({
        "status": "OK",
        "result": {
            "name": name,
            "formatted_address": "1 Main St, New York, NY",
            "formatted_phone_number": "(212) 555-0100",
            "rating": 4.5,
            "user_ratings_total": 120,
            "opening_hours": { "open_now": true },
            "types": ["cafe", "food", "establishment"],
            "business_status": "OPERATIONAL",
            "price_level": 2
        }
    })
}

async fn mount_detail(server: &MockServer, place_id: &str, body: serde_json::Value) {
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", place_id))
        .respond_with(ResponseTemplate::new(200).set_body_json(&body))
        .mount(server)
        .await;
}

async fn run(
    client: &PlacesClient,
    term: &str,
    filters: &SearchFilters,
    log: &SearchEventLog,
) -> Vec<String> {
    client
        .query_area(CENTER, 1_500.0, filters, term, log)
        .await
        .expect("PlacesClient never fails an area outright")
        .into_iter()
        .map(|r| r.place_id)
        .collect()
}

#[tokio::test]
async fn single_page_is_enriched_with_details() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("location", "40.7128,-74.006"))
        .and(query_param("radius", "1500"))
        .and(query_param("keyword", "coffee"))
        .and(query_param("key", "test-key"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a", "b"], None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("Detail A")).await;
    mount_detail(&server, "b", detail("Detail B")).await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let records = client
        .query_area(CENTER, 1_500.0, &SearchFilters::default(), "coffee", &log)
        .await
        .unwrap();

    assert_eq!(records.len(), 2);
    assert_eq!(records[0].name, "Detail A");
    assert_eq!(records[0].phone.as_deref(), Some("(212) 555-0100"));
    assert_eq!(records[0].primary_type.as_deref(), Some("cafe"));
    assert_eq!(records[0].secondary_types, vec!["food", "establishment"]);
    assert_eq!(records[1].place_id, "b");
    assert!(log.is_empty());
}

#[tokio::test]
async fn follows_next_page_token_until_absent() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param_is_missing("pagetoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a"], Some("tok-2"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("pagetoken", "tok-2"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["b"], Some("tok-3"))))
        .expect(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("pagetoken", "tok-3"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["c"], None)))
        .expect(1)
        .mount(&server)
        .await;
    for id in ["a", "b", "c"] {
        mount_detail(&server, id, detail(id)).await;
    }

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert_eq!(ids, vec!["a", "b", "c"]);
}

#[tokio::test]
async fn cycling_page_token_stops_at_page_cap_and_keeps_records() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a"], Some("same-token"))))
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("A")).await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    let searches = server
        .received_requests()
        .await
        .unwrap_or_default()
        .iter()
        .filter(|r| r.url.path() == "/nearbysearch/json")
        .count();
    assert_eq!(searches, MAX_PAGES);
    assert_eq!(ids.len(), MAX_PAGES);
    let events = log.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, EventLevel::Warning);
    assert!(events[0].message.contains("Stopped paging"), "{}", events[0].message);
}

#[tokio::test]
async fn underscore_term_is_sent_as_type() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("type", "coffee_shop"))
        .and(query_param_is_missing("keyword"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&[], None)))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee_shop", &SearchFilters::default(), &log).await;
    assert!(ids.is_empty());
}

#[tokio::test]
async fn filters_are_sent_as_query_params() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("type", "restaurant"))
        .and(query_param("minprice", "1"))
        .and(query_param("maxprice", "3"))
        .and(query_param("opennow", "true"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a"], None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("Trattoria")).await;

    let filters = SearchFilters {
        min_price: Some(1),
        max_price: Some(3),
        open_now: true,
        place_type: Some("restaurant".to_string()),
    };
    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "pizza", &filters, &log).await;
    assert_eq!(ids, vec!["a"]);
}

#[tokio::test]
async fn failed_or_missing_detail_drops_only_that_result() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a", "b", "c"], None)))
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("A")).await;
    Mock::given(method("GET"))
        .and(path("/details/json"))
        .and(query_param("place_id", "b"))
        .respond_with(ResponseTemplate::new(500))
        .expect(1) // never retried
        .mount(&server)
        .await;
    mount_detail(&server, "c", json!({ "status": "NOT_FOUND" })).await;

    let client = test_client_with_retries(&server, 3);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert_eq!(ids, vec!["a"]);
    assert_eq!(log.count_at(EventLevel::Error), 0);
}

#[tokio::test]
async fn page_failure_returns_partial_results_and_logs_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param_is_missing("pagetoken"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a", "b"], Some("tok-2"))))
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .and(query_param("pagetoken", "tok-2"))
        .respond_with(ResponseTemplate::new(502))
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("A")).await;
    mount_detail(&server, "b", detail("B")).await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert_eq!(ids, vec!["a", "b"]);
    let events = log.drain();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].level, EventLevel::Error);
    assert!(events[0].message.contains("502"), "{}", events[0].message);
}

#[tokio::test]
async fn zero_results_is_an_empty_area() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&json!({ "status": "ZERO_RESULTS", "results": [] })),
        )
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert!(ids.is_empty());
    assert!(log.is_empty());
}

#[tokio::test]
async fn http_429_is_retried_then_succeeds() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(429))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&page(&["a"], None)))
        .expect(1)
        .mount(&server)
        .await;
    mount_detail(&server, "a", detail("A")).await;

    let client = test_client_with_retries(&server, 2);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert_eq!(ids, vec!["a"]);
    assert!(log.is_empty());
}

#[tokio::test]
async fn over_query_limit_exhausts_retries_and_logs_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(&json!({ "status": "OVER_QUERY_LIMIT", "results": [] })),
        )
        .expect(2) // 1 initial + 1 retry
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 1);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert!(ids.is_empty());
    assert_eq!(log.count_at(EventLevel::Error), 1);
}

#[tokio::test]
async fn request_denied_is_not_retried() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_json(&json!({
            "status": "REQUEST_DENIED",
            "error_message": "The provided API key is invalid.",
            "results": []
        })))
        .expect(1)
        .mount(&server)
        .await;

    let client = test_client_with_retries(&server, 3);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert!(ids.is_empty());
    let errors: Vec<_> = log
        .drain()
        .into_iter()
        .filter(|e| e.level == EventLevel::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("REQUEST_DENIED"));
}

#[tokio::test]
async fn malformed_body_logs_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nearbysearch/json"))
        .respond_with(ResponseTemplate::new(200).set_body_string("<html>not json</html>"))
        .mount(&server)
        .await;

    let client = test_client(&server);
    let log = SearchEventLog::new();
    let ids = run(&client, "coffee", &SearchFilters::default(), &log).await;

    assert!(ids.is_empty());
    assert_eq!(log.count_at(EventLevel::Error), 1);
}
