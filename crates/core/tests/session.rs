//! Session behavior against a live (mock) host application.

mod support;

use serde_json::json;
use support::{APP_SELECTOR, HostOptions, MockHost, ODD_ATTRIBUTES_NODE, SCREENSHOT_PAYLOAD};
use uidriver::{Error, ScreenshotFormat, ScreenshotOptions, SessionManager, SessionState};
use uidriver_protocol::DOCUMENT_NODE_TYPE;

#[tokio::test]
async fn document_snapshot_has_a_document_root() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let document = session.get_document().await.unwrap();
    assert!(document.node_id > 0);
    assert_eq!(document.node_type, DOCUMENT_NODE_TYPE);
    assert_eq!(document.node_name, "#document");
    assert!(document.children.is_some());

    manager.disconnect_all().await;
}

#[tokio::test]
async fn connect_enables_every_domain() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    assert_eq!(session.state(), SessionState::Connected);
    assert_eq!(
        session.enabled_domains(),
        vec!["DOM", "Runtime", "Page", "Network"]
    );

    manager.disconnect_all().await;
}

#[tokio::test]
async fn partial_domain_failure_tears_the_channel_down() {
    let host = MockHost::spawn(HostOptions {
        failing_domains: vec!["Network"],
        ..HostOptions::default()
    })
    .await;
    let manager = SessionManager::new();

    let err = manager.connect(&host.target("page-1")).await.unwrap_err();
    assert!(err.is_protocol(), "got {err:?}");
    assert!(err.to_string().contains("Network"), "got {err}");

    // No half-open session is left behind.
    assert!(manager.session("page-1").is_none());
}

#[tokio::test]
async fn query_selector_miss_is_absent_not_an_error() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    assert_eq!(session.query_selector(APP_SELECTOR).await.unwrap(), Some(7));
    assert_eq!(session.query_selector("#missing").await.unwrap(), None);

    assert_eq!(session.query_selector_all("button").await.unwrap(), vec![5, 6]);
    assert!(session.query_selector_all(".nothing").await.unwrap().is_empty());

    manager.disconnect_all().await;
}

#[tokio::test]
async fn attributes_fold_pairwise_and_reject_odd_payloads() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let attributes = session.get_node_attributes(7).await.unwrap();
    assert_eq!(attributes.get("id").map(String::as_str), Some("app"));
    assert_eq!(attributes.get("class").map(String::as_str), Some("main"));
    assert_eq!(attributes.len(), 2);

    let err = session
        .get_node_attributes(ODD_ATTRIBUTES_NODE)
        .await
        .unwrap_err();
    assert!(err.is_protocol(), "got {err:?}");
    assert!(err.to_string().contains("odd length"), "got {err}");

    manager.disconnect_all().await;
}

#[tokio::test]
async fn outer_html_round_trips() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let html = session.get_outer_html(7).await.unwrap();
    assert!(html.starts_with("<div"));

    manager.disconnect_all().await;
}

#[tokio::test]
async fn evaluate_distinguishes_values_from_script_failures() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let two = session.evaluate("1+1").await.unwrap();
    assert_eq!(two.into_json(), json!(2));

    let title = session.evaluate("document.title").await.unwrap();
    assert_eq!(title.into_json(), json!("Mock Window"));

    let err = session.evaluate("null.x").await.unwrap_err();
    assert!(err.is_script(), "expected script error, got {err:?}");
    assert!(!err.is_protocol());
    assert!(err.to_string().contains("null"), "got {err}");
    assert!(err.script_stack().unwrap().contains("app://main"));

    manager.disconnect_all().await;
}

#[tokio::test]
async fn screenshot_payload_is_passed_through_opaque() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let payload = session
        .screenshot(ScreenshotOptions::new(ScreenshotFormat::Jpeg).with_quality(80))
        .await
        .unwrap();
    assert_eq!(payload, SCREENSHOT_PAYLOAD);

    manager.disconnect_all().await;
}

#[tokio::test]
async fn quality_on_a_lossless_format_is_rejected_locally() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();

    let err = session
        .screenshot(ScreenshotOptions::new(ScreenshotFormat::Png).with_quality(80))
        .await
        .unwrap_err();
    assert!(matches!(err, Error::InvalidArgument(_)), "got {err:?}");

    manager.disconnect_all().await;
}

#[tokio::test]
async fn operations_after_disconnect_fail_fast() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let session = manager.connect(&host.target("page-1")).await.unwrap();
    manager.disconnect("page-1").await;

    assert_eq!(session.state(), SessionState::Disconnected);
    let err = session.get_document().await.unwrap_err();
    assert!(err.is_not_connected());
}
