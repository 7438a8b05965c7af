// tests/fetch_conditional.rs
use std::io::Write;
use std::time::Duration;

use mockito::Server;
use statuswatch::fetch::{ConditionalFetcher, FetchError, FetchOutcome};

fn fetcher() -> ConditionalFetcher {
    ConditionalFetcher::new(
        reqwest::Client::new(),
        Duration::from_secs(5),
        50,
    )
}

#[tokio::test]
async fn second_fetch_with_matching_etag_is_unchanged() {
    let mut server = Server::new_async().await;

    let first = server
        .mock("GET", "/incidents.json")
        .with_status(200)
        .with_header("etag", "\"v1\"")
        .with_body(r#"{"incidents": []}"#)
        .expect(1)
        .create_async()
        .await;

    let f = fetcher();
    let url = format!("{}/incidents.json", server.url());

    match f.fetch(&url).await.unwrap() {
        FetchOutcome::Changed(data) => assert!(data["incidents"].as_array().unwrap().is_empty()),
        FetchOutcome::Unchanged => panic!("first fetch must return Changed"),
    }
    first.assert_async().await;

    // Once the ETag is cached, the client must send If-None-Match and
    // accept the 304 without a body.
    let second = server
        .mock("GET", "/incidents.json")
        .match_header("if-none-match", "\"v1\"")
        .with_status(304)
        .expect(1)
        .create_async()
        .await;

    assert!(matches!(
        f.fetch(&url).await.unwrap(),
        FetchOutcome::Unchanged
    ));
    second.assert_async().await;
}

#[tokio::test]
async fn etag_is_replaced_when_the_server_rotates_it() {
    let mut server = Server::new_async().await;
    let url = format!("{}/incidents.json", server.url());
    let f = fetcher();

    let m1 = server
        .mock("GET", "/incidents.json")
        .with_status(200)
        .with_header("etag", "\"v1\"")
        .with_body(r#"{"incidents": []}"#)
        .expect(1)
        .create_async()
        .await;
    f.fetch(&url).await.unwrap();
    m1.assert_async().await;

    // Server returns new content with a new ETag even though the client
    // validated against v1.
    let m2 = server
        .mock("GET", "/incidents.json")
        .match_header("if-none-match", "\"v1\"")
        .with_status(200)
        .with_header("etag", "\"v2\"")
        .with_body(r#"{"incidents": []}"#)
        .expect(1)
        .create_async()
        .await;
    assert!(matches!(
        f.fetch(&url).await.unwrap(),
        FetchOutcome::Changed(_)
    ));
    m2.assert_async().await;

    // Next poll must validate against v2, not v1.
    let m3 = server
        .mock("GET", "/incidents.json")
        .match_header("if-none-match", "\"v2\"")
        .with_status(304)
        .expect(1)
        .create_async()
        .await;
    assert!(matches!(
        f.fetch(&url).await.unwrap(),
        FetchOutcome::Unchanged
    ));
    m3.assert_async().await;
}

#[tokio::test]
async fn error_status_is_reported_with_its_code_and_caches_nothing() {
    let mut server = Server::new_async().await;
    let url = format!("{}/incidents.json", server.url());
    let f = fetcher();

    let failing = server
        .mock("GET", "/incidents.json")
        .with_status(503)
        .expect(1)
        .create_async()
        .await;

    match f.fetch(&url).await {
        Err(FetchError::Status(code)) => assert_eq!(code.as_u16(), 503),
        other => panic!("expected status error, got {other:?}"),
    }
    failing.assert_async().await;

    // The failed poll must not have stored a validator: the next request
    // carries no If-None-Match header.
    let recovered = server
        .mock("GET", "/incidents.json")
        .match_header("if-none-match", mockito::Matcher::Missing)
        .with_status(200)
        .with_body(r#"{"incidents": []}"#)
        .expect(1)
        .create_async()
        .await;
    assert!(matches!(
        f.fetch(&url).await.unwrap(),
        FetchOutcome::Changed(_)
    ));
    recovered.assert_async().await;
}

#[tokio::test]
async fn connection_refused_is_a_transport_error() {
    let f = fetcher();
    // Port 9 (discard); nothing listens there.
    match f.fetch("http://127.0.0.1:9/incidents.json").await {
        Err(FetchError::Transport(_)) => {}
        other => panic!("expected transport error, got {other:?}"),
    }
}

#[tokio::test]
async fn slow_server_times_out() {
    let mut server = Server::new_async().await;
    let url = format!("{}/incidents.json", server.url());

    let _slow = server
        .mock("GET", "/incidents.json")
        .with_status(200)
        .with_chunked_body(|w| {
            std::thread::sleep(Duration::from_millis(500));
            w.write_all(b"{\"incidents\": []}")
        })
        .create_async()
        .await;

    let f = ConditionalFetcher::new(reqwest::Client::new(), Duration::from_millis(50), 50);
    match f.fetch(&url).await {
        Err(FetchError::Timeout) => {}
        other => panic!("expected timeout, got {other:?}"),
    }
}
