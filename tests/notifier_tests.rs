//! MattermostNotifier against a local fake chat webhook.

mod common;

use axum::http::StatusCode;
use common::{init_rustls, spawn_chat_server};
use kube_guard::notifier::{
    dispatch, AlertPayload, DispatchError, DispatchOutcome, MattermostNotifier, Notifier,
    WebhookTarget,
};
use std::time::Duration;

fn target(url: &str) -> WebhookTarget {
    WebhookTarget {
        url: url.to_string(),
        channel: "alerts".to_string(),
        display_name: "KubeGuard".to_string(),
    }
}

#[tokio::test]
async fn test_posts_payload_json() {
    init_rustls();
    let server = spawn_chat_server(StatusCode::OK, Duration::ZERO).await;
    let notifier = MattermostNotifier::new().unwrap();

    let outcome = dispatch(&notifier, &target(&server.url), "hello from the cluster").await;

    assert_eq!(outcome, DispatchOutcome::Delivered);
    let payloads = server.payloads();
    assert_eq!(payloads.len(), 1);
    assert_eq!(payloads[0]["channel"], "#alerts");
    assert_eq!(payloads[0]["username"], "KubeGuard");
    assert_eq!(payloads[0]["text"], "hello from the cluster");
    assert_eq!(payloads[0]["icon_emoji"], ":warning:");
}

#[tokio::test]
async fn test_non_success_status_is_error() {
    init_rustls();
    let server = spawn_chat_server(StatusCode::INTERNAL_SERVER_ERROR, Duration::ZERO).await;
    let notifier = MattermostNotifier::new().unwrap();
    let target = target(&server.url);
    let payload = AlertPayload::new(&target, "hello");

    let err = notifier.send(&target, &payload).await.unwrap_err();
    assert!(matches!(err, DispatchError::Status { status: 500, .. }));

    assert_eq!(dispatch(&notifier, &target, "hello").await, DispatchOutcome::Failed);
    assert_eq!(server.payloads().len(), 2);
}

#[tokio::test]
async fn test_timeout_is_failure() {
    init_rustls();
    let server = spawn_chat_server(StatusCode::OK, Duration::from_secs(2)).await;
    let notifier = MattermostNotifier::with_timeout(Duration::from_millis(100)).unwrap();
    let target = target(&server.url);
    let payload = AlertPayload::new(&target, "hello");

    let err = notifier.send(&target, &payload).await.unwrap_err();
    match err {
        DispatchError::Request(e) => assert!(e.is_timeout()),
        other => panic!("expected timeout, got {other:?}"),
    }
}

#[tokio::test]
async fn test_unreachable_host_is_failure() {
    init_rustls();
    // Bind then drop to get a port nothing is listening on
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    drop(listener);

    let notifier = MattermostNotifier::new().unwrap();
    let url = format!("http://{addr}/hooks/test");

    assert_eq!(dispatch(&notifier, &target(&url), "hello").await, DispatchOutcome::Failed);
}

#[tokio::test]
async fn test_invalid_url_is_failure() {
    init_rustls();
    let notifier = MattermostNotifier::new().unwrap();

    assert_eq!(
        dispatch(&notifier, &target("not a url"), "hello").await,
        DispatchOutcome::Failed
    );
}
