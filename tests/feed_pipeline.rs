//! Integration tests for the ride feed pipeline: fetch, parse, rank.
//!
//! Each test stands up its own wiremock server for the queue-times endpoint.

use pretty_assertions::assert_eq;
use ridewait::feed::{load_rides, FeedClient, FeedError, FetchError, RideStatus};
use std::time::Duration;
use url::Url;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const FEED_PATH: &str = "/parks/65/queue_times.json";

fn client_for(server: &MockServer, read_timeout: Duration) -> FeedClient {
    let endpoint = Url::parse(&format!("{}{}", server.uri(), FEED_PATH)).unwrap();
    FeedClient::new(endpoint, Duration::from_secs(2), read_timeout, "ridewait-test").unwrap()
}

async fn serve(server: &MockServer, body: &str) {
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_raw(body.as_bytes().to_vec(), "application/json"),
        )
        .mount(server)
        .await;
}

fn ride(name: &str, wait_minutes: u32, is_open: bool) -> RideStatus {
    RideStatus {
        name: name.to_string(),
        wait_minutes,
        is_open,
    }
}

// ============================================================================
// Successful loads
// ============================================================================

#[tokio::test]
async fn test_land_and_park_rides_merge_then_rank_open_shortest_first() {
    let server = MockServer::start().await;
    serve(
        &server,
        r#"{"lands":[{"rides":[{"name":"A","wait_time":30,"is_open":true}]}],"rides":[{"name":"B","wait_time":5,"is_open":true},{"name":"C","is_open":false}]}"#,
    )
    .await;

    let rides = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap();
    assert_eq!(
        rides,
        vec![ride("B", 5, true), ride("A", 30, true), ride("C", 0, false)]
    );
}

#[tokio::test]
async fn test_land_rides_and_top_level_rides_are_merged() {
    let server = MockServer::start().await;
    serve(
        &server,
        r#"{
            "lands":[
                {"name":"Minion Land","rides":[{"name":"Villain-Con","wait_time":45,"is_open":true}]},
                {"name":"Empty Land"}
            ],
            "rides":[{"name":"Jaws","wait_time":"10","is_open":"true"}]
        }"#,
    )
    .await;

    let rides = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap();
    assert_eq!(
        rides,
        vec![ride("Jaws", 10, true), ride("Villain-Con", 45, true)]
    );
}

#[tokio::test]
async fn test_empty_object_yields_no_rides() {
    let server = MockServer::start().await;
    serve(&server, "{}").await;

    let rides = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap();
    assert!(rides.is_empty());
}

#[tokio::test]
async fn test_bare_entries_decode_to_defaults() {
    let server = MockServer::start().await;
    serve(&server, r#"{"rides":[{}, {"name":"Open One","is_open":true}]}"#).await;

    let rides = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap();
    assert_eq!(rides, vec![ride("Open One", 0, true), ride("", 0, false)]);
}

// ============================================================================
// Failures
// ============================================================================

#[tokio::test]
async fn test_truncated_json_is_parse_error() {
    let server = MockServer::start().await;
    serve(&server, r#"{"lands":[{"rides":["#).await;

    let err = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap_err();
    assert!(matches!(err, FeedError::Parse(_)), "got {err:?}");
}

#[tokio::test]
async fn test_server_error_is_transport_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let err = load_rides(&client_for(&server, Duration::from_secs(2)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, FeedError::Transport(FetchError::HttpStatus(500))),
        "got {err:?}"
    );
}

#[tokio::test]
async fn test_slow_server_times_out() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(FEED_PATH))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_string("{}")
                .set_delay(Duration::from_secs(3)),
        )
        .mount(&server)
        .await;

    let err = load_rides(&client_for(&server, Duration::from_millis(200)))
        .await
        .unwrap_err();
    assert!(
        matches!(err, FeedError::Transport(FetchError::Timeout)),
        "got {err:?}"
    );
}
