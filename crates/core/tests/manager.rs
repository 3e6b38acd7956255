//! Session manager lifecycle against a live (mock) host application.

mod support;

use support::MockHost;
use uidriver::SessionManager;

#[tokio::test]
async fn concurrent_connects_open_exactly_one_channel() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let target = host.target("page-1");

    let (first, second) = tokio::join!(manager.connect(&target), manager.connect(&target));
    let first = first.unwrap();
    let second = second.unwrap();

    assert!(std::sync::Arc::ptr_eq(&first, &second));
    assert_eq!(host.channels_opened(), 1);

    manager.disconnect_all().await;
}

#[tokio::test]
async fn connect_is_idempotent_for_a_connected_target() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let target = host.target("page-1");

    manager.connect(&target).await.unwrap();
    manager.connect(&target).await.unwrap();
    manager.connect(&target).await.unwrap();

    assert_eq!(host.channels_opened(), 1);
    assert!(manager.is_connected("page-1"));

    manager.disconnect_all().await;
}

#[tokio::test]
async fn disconnect_all_leaves_no_sessions_and_is_idempotent() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();

    manager.connect(&host.target("page-1")).await.unwrap();
    assert_eq!(manager.target_ids(), vec!["page-1"]);

    manager.disconnect_all().await;
    assert!(manager.target_ids().is_empty());
    assert!(!manager.is_connected("page-1"));

    // A second sweep over an empty map is a no-op.
    manager.disconnect_all().await;
    assert!(manager.target_ids().is_empty());
}

#[tokio::test]
async fn connect_after_disconnect_all_starts_fresh() {
    let host = MockHost::spawn_default().await;
    let manager = SessionManager::new();
    let target = host.target("page-1");

    manager.connect(&target).await.unwrap();
    manager.disconnect_all().await;

    let session = manager.connect(&target).await.unwrap();
    assert!(session.is_connected());
    assert_eq!(host.channels_opened(), 2);

    manager.disconnect_all().await;
}

#[tokio::test]
async fn sessions_for_different_targets_are_independent() {
    let host = MockHost::spawn(support::HostOptions {
        targets: vec![
            support::TargetSpec {
                id: "page-1",
                kind: "page",
            },
            support::TargetSpec {
                id: "page-2",
                kind: "page",
            },
        ],
        ..Default::default()
    })
    .await;
    let manager = SessionManager::new();

    let one = manager.connect(&host.target("page-1")).await.unwrap();
    let two = manager.connect(&host.target("page-2")).await.unwrap();
    assert_eq!(host.channels_opened(), 2);

    manager.disconnect("page-1").await;
    assert!(!one.is_connected());
    assert!(two.is_connected());
    assert_eq!(manager.target_ids(), vec!["page-2"]);

    manager.disconnect_all().await;
}
