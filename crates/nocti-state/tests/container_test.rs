//! Dashboard container integration tests.
//!
//! Drives the container against a mock validation service:
//! - Bulk pull success and the explicit-empty-on-failure policy
//! - Stale in-flight refreshes never clobber newer rows
//! - Admin polling, the unauthorized path, and snapshot retention
//! - Live push reconciliation over the event stream
//! - Settings persistence and rehydration

mod integration;
use integration::common::mock_api::{MockApiServer, GOOD_TOKEN};

use nocti_core::{ActivityKind, FilterState, Language, LiveMode, Status, ViewMode};
use nocti_state::{Dashboard, MemoryStore, Settings, SettingsStore};
use std::sync::Arc;
use std::time::Duration;
use tokio::time::timeout;

const WAIT: Duration = Duration::from_secs(3);

fn store_for(server: &MockApiServer, admin_token: &str) -> Arc<MemoryStore> {
    Arc::new(MemoryStore::with_settings(Settings {
        api_base_url: server.base_url(),
        assistant_base_url: server.base_url(),
        admin_token: admin_token.to_string(),
        ..Default::default()
    }))
}

#[tokio::test]
async fn test_refresh_results_populates_cache() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    dashboard.refresh_results().await;

    let results = dashboard.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "1");
    assert_eq!(results[0].status, Status::Valid);

    // The pull carried the cache limit and default sort.
    let heads = server.request_heads().await;
    let results_head = heads
        .iter()
        .find(|h| h.starts_with("GET /results"))
        .expect("results request");
    assert!(results_head.contains("limit=1000"));
    assert!(results_head.contains("sort=created_at"));
    assert!(results_head.contains("dir=desc"));

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_failed_refresh_clears_cache_and_logs_error() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    dashboard.refresh_results().await;
    assert_eq!(dashboard.result_count(), 1);

    // Changing the filter triggers a refresh; this one fails server-side.
    dashboard
        .set_filters(FilterState {
            query: Some("fail".to_string()),
            ..Default::default()
        })
        .await;

    // Explicit-empty policy: no stale rows survive a failed refresh.
    assert_eq!(dashboard.result_count(), 0);
    let log = dashboard.activity_log();
    let errors: Vec<_> = log
        .iter()
        .filter(|e| e.kind == ActivityKind::Error)
        .collect();
    assert_eq!(errors.len(), 1);
    assert!(errors[0].message.contains("Failed to fetch results"));

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_stale_refresh_never_clobbers_newer_rows() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    // First refresh hangs server-side for 500ms and would return the
    // stale marker row.
    let slow_dashboard = dashboard.clone();
    let slow = tokio::spawn(async move {
        slow_dashboard
            .set_filters(FilterState {
                query: Some("slow".to_string()),
                ..Default::default()
            })
            .await;
    });
    tokio::time::sleep(Duration::from_millis(100)).await;

    // A newer refresh completes immediately with the fresh row.
    dashboard.set_filters(FilterState::default()).await;
    assert_eq!(dashboard.results()[0].id, "1");

    // When the slow response finally lands it must be discarded.
    slow.await.unwrap();
    let results = dashboard.results();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0].id, "1");

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_unauthorized_admin_refresh_keeps_snapshot_and_logs_once() {
    let server = MockApiServer::start(Vec::new()).await;
    // Rehydrated bad token: polling starts immediately.
    let dashboard = Dashboard::new(Box::new(store_for(&server, "bad"))).unwrap();

    // Give the first poll tick time to run and fail.
    tokio::time::sleep(Duration::from_millis(400)).await;

    assert!(dashboard.admin_status().is_none());
    assert!(dashboard.stats().is_none());

    let errors = dashboard
        .activity_log()
        .into_iter()
        .filter(|e| e.kind == ActivityKind::Error)
        .count();
    assert_eq!(errors, 1, "Exactly one unauthorized audit entry");

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_admin_polling_with_valid_token() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, GOOD_TOKEN))).unwrap();

    let polled = timeout(WAIT, async {
        loop {
            if dashboard.admin_status().is_some() && dashboard.stats().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "Polling should populate admin snapshots");

    let status = dashboard.admin_status().unwrap();
    assert_eq!(status.workers_total, 8);
    assert_eq!(status.queue_size, 42);

    let stats = dashboard.stats().unwrap();
    assert_eq!(stats.queue, 7);
    assert_eq!(stats.by_status.get(&Status::Invalid), Some(&3));

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_setting_token_starts_polling() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    // Without a token the refresh is a no-op.
    dashboard.refresh_admin_status().await;
    assert!(dashboard.admin_status().is_none());

    dashboard.set_admin_token(GOOD_TOKEN);
    let polled = timeout(WAIT, async {
        loop {
            if dashboard.admin_status().is_some() {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(polled.is_ok(), "Token set should start polling");

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_live_push_replaces_bulk_row() {
    // The event stream pushes an update for the same id the bulk pull
    // returned, with a different status.
    let push = r#"{"id":"1","url":"https://a.com/login","login":"u","status":"invalid","created_at":"2024-01-01T00:01:00Z","domain":"a.com"}"#;
    let server = MockApiServer::start(vec![push.to_string()]).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    dashboard.refresh_results().await;
    assert_eq!(dashboard.results()[0].status, Status::Valid);

    dashboard.set_live_mode(LiveMode::Sse).await;

    let updated = timeout(WAIT, async {
        loop {
            let results = dashboard.results();
            if results.len() == 1 && results[0].status == Status::Invalid {
                return;
            }
            tokio::time::sleep(Duration::from_millis(50)).await;
        }
    })
    .await;
    assert!(updated.is_ok(), "Push should replace the row in place");
    assert!(dashboard.is_connected());
    assert!(dashboard.connection_error().is_none());

    // The successful open left one audit entry naming the transport.
    let log = dashboard.activity_log();
    assert!(log
        .iter()
        .any(|e| e.kind == ActivityKind::Info && e.message.contains("event-stream connected")));

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_settings_persist_and_rehydrate() {
    let server = MockApiServer::start(Vec::new()).await;
    let store = store_for(&server, "");

    {
        let dashboard = Dashboard::new(Box::new(store.clone())).unwrap();
        dashboard.set_view_mode(ViewMode::Expert);
        dashboard.set_language(Language::Ru);
        dashboard.set_admin_token("persisted-token");
        dashboard.shutdown().await;
    }

    // Every setter hit the store; a rebuilt container sees the values.
    let persisted = store.load().unwrap();
    assert_eq!(persisted.view_mode, ViewMode::Expert);
    assert_eq!(persisted.language, Language::Ru);
    assert_eq!(persisted.admin_token, "persisted-token");

    let dashboard = Dashboard::new(Box::new(store.clone())).unwrap();
    let settings = dashboard.settings();
    assert_eq!(settings.view_mode, ViewMode::Expert);
    assert_eq!(settings.language, Language::Ru);

    dashboard.shutdown().await;
    server.shutdown().await;
}

#[tokio::test]
async fn test_unchanged_filters_do_not_refetch() {
    let server = MockApiServer::start(Vec::new()).await;
    let dashboard = Dashboard::new(Box::new(store_for(&server, ""))).unwrap();

    dashboard.set_filters(FilterState::default()).await;
    dashboard.set_sort(Default::default()).await;

    let heads = server.request_heads().await;
    assert!(
        heads.iter().all(|h| !h.starts_with("GET /results")),
        "No-op assignments must not trigger a refresh"
    );

    dashboard.shutdown().await;
    server.shutdown().await;
}
