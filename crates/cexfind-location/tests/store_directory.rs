//! Integration tests for `StoreDirectory` refresh behaviour.
//!
//! A local `wiremock` server stands in for the store list endpoint.
//! Background-refresh tests use millisecond intervals and poll for the
//! expected state rather than sleeping a fixed time.

use std::time::Duration;

use serde_json::json;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use cexfind_location::{DirectorySettings, LocationError, StoreDirectory};

const STORES_FIXTURE: &str = include_str!("fixtures/stores.json");

fn settings_for(server: &MockServer, refresh: Duration, retry: Duration) -> DirectorySettings {
    DirectorySettings {
        url: format!("{}/stores", server.uri()),
        timeout: Duration::from_secs(5),
        user_agent: "cexfind-test/0.1".to_string(),
        refresh_interval: refresh,
        retry_interval: retry,
    }
}

async fn mount_stores(server: &MockServer) {
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STORES_FIXTURE))
        .mount(server)
        .await;
}

/// Polls `check` every 10ms until it holds or two seconds pass.
async fn eventually<F>(mut check: F) -> bool
where
    F: FnMut() -> bool,
{
    for _ in 0..200 {
        if check() {
            return true;
        }
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
    check()
}

#[tokio::test]
async fn refresh_loads_stores_and_aliases() {
    let server = MockServer::start().await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::new(&settings).expect("directory");
    let received = directory.refresh().await.expect("refresh");

    // Five stores listed, one without coordinates, plus one alias.
    assert_eq!(received, 5);
    assert_eq!(directory.len().await, 5);
    assert!(directory.is_operational());

    let walthamstow = directory.get("Walthamstow").await.expect("Walthamstow");
    assert_eq!(walthamstow.store_id, 145);
    assert!((walthamstow.latitude - 51.583_371).abs() < 1e-9);

    let alias = directory.get("London W1 Rathbone").await.expect("alias");
    assert_eq!(alias.store_id, 2);
    assert_eq!(alias.store_name, "London - W1 Rathbone Place");

    assert!(directory.get("Opening Soon").await.is_none());
}

#[tokio::test]
async fn failed_refresh_keeps_last_good_data() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_string(STORES_FIXTURE))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::new(&settings).expect("directory");
    directory.refresh().await.expect("first refresh");

    let err = directory.refresh().await.unwrap_err();
    assert!(
        matches!(err, LocationError::UnexpectedStatus { status: 500, .. }),
        "got: {err:?}"
    );
    assert!(directory.is_operational());
    assert!(directory.get("Havant").await.is_some());
}

#[tokio::test]
async fn empty_store_list_is_a_failed_refresh() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(
            ResponseTemplate::new(200)
                .set_body_json(json!({"response": {"data": {"stores": []}}})),
        )
        .mount(&server)
        .await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::new(&settings).expect("directory");
    let err = directory.refresh().await.unwrap_err();

    assert!(matches!(err, LocationError::EmptyStoreList { .. }), "got: {err:?}");
    assert!(!directory.is_operational());
}

#[tokio::test]
async fn malformed_store_list_is_a_deserialize_error() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(200).set_body_string("not json"))
        .mount(&server)
        .await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::new(&settings).expect("directory");
    let err = directory.refresh().await.unwrap_err();
    assert!(matches!(err, LocationError::Deserialize { .. }), "got: {err:?}");
}

#[tokio::test]
async fn start_returns_operational_directory_when_first_refresh_succeeds() {
    let server = MockServer::start().await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::start(settings).await.expect("directory");
    assert!(directory.is_operational());
    directory.shutdown().await;
}

#[tokio::test]
async fn start_survives_failed_first_refresh_and_retries() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_millis(50));
    let directory = StoreDirectory::start(settings).await.expect("directory");
    assert!(!directory.is_operational());

    assert!(
        eventually(|| directory.is_operational()).await,
        "directory should recover after the retry interval"
    );
    assert!(directory.get("Woolwich").await.is_some());
    directory.shutdown().await;
}

#[tokio::test]
async fn successful_retry_returns_to_refresh_interval() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/stores"))
        .respond_with(ResponseTemplate::new(503))
        .up_to_n_times(1)
        .mount(&server)
        .await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_millis(20));
    let directory = StoreDirectory::spawn(&settings).expect("directory");
    assert!(eventually(|| directory.is_operational()).await);

    // Ten retry intervals; the next refresh is a minute away.
    tokio::time::sleep(Duration::from_millis(200)).await;
    let requests = server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len());
    assert_eq!(requests, 2, "one failed refresh, one successful retry");

    directory.shutdown().await;
}

#[tokio::test]
async fn spawn_refreshes_in_background() {
    let server = MockServer::start().await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_secs(60), Duration::from_secs(1));
    let directory = StoreDirectory::spawn(&settings).expect("directory");

    assert!(eventually(|| directory.is_operational()).await);
    assert!(directory.get("London W1 Rathbone").await.is_some());
    directory.shutdown().await;
}

#[tokio::test]
async fn shutdown_stops_periodic_refreshes() {
    let server = MockServer::start().await;
    mount_stores(&server).await;

    let settings = settings_for(&server, Duration::from_millis(20), Duration::from_millis(20));
    let directory = StoreDirectory::spawn(&settings).expect("directory");
    assert!(eventually(|| directory.is_operational()).await);

    directory.shutdown().await;
    let requests_at_shutdown = server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len());
    tokio::time::sleep(Duration::from_millis(100)).await;
    let requests_later = server
        .received_requests()
        .await
        .map_or(0, |requests| requests.len());

    assert_eq!(requests_at_shutdown, requests_later);
    assert!(directory.get("Havant").await.is_some());
}
