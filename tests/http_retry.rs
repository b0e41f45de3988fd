use crypto_digest_bot::api::{HttpFetcher, RetryPolicy};
use mockito::Server;
use std::time::Duration;

fn fetcher(attempts: u32) -> HttpFetcher {
    HttpFetcher::new(RetryPolicy::new(attempts, Duration::from_millis(10)), Duration::from_secs(5)).unwrap()
}

// mockito answers with the first matching mock that still expects hits,
// so mocks created in order play out as a status sequence on one path.
#[tokio::test]
async fn test_success_on_final_attempt_is_returned() {
    let mut server = Server::new_async().await;
    let mut mocks = Vec::new();
    for status in [500, 502] {
        mocks.push(server.mock("GET", "/data").with_status(status).with_body("busy").expect(1).create_async().await);
    }
    mocks.push(
        server
            .mock("GET", "/data")
            .with_header("content-type", "application/json")
            .with_body(r#"{"ok":true}"#)
            .expect(1)
            .create_async()
            .await,
    );

    let body = fetcher(3).get_json(&format!("{}/data", server.url()), &[]).await;

    assert_eq!(body, Some(serde_json::json!({"ok": true})));
    for mock in &mocks {
        mock.assert_async().await;
    }
}

#[tokio::test]
async fn test_no_attempt_beyond_the_limit() {
    let mut server = Server::new_async().await;
    let failing = server
        .mock("GET", "/data")
        .with_status(500)
        .with_body("busy")
        .expect(2)
        .create_async()
        .await;
    let recovered = server
        .mock("GET", "/data")
        .with_body(r#"{"ok":true}"#)
        .expect(0)
        .create_async()
        .await;

    let body = fetcher(2).get_json(&format!("{}/data", server.url()), &[]).await;

    assert!(body.is_none());
    failing.assert_async().await;
    recovered.assert_async().await;
}
