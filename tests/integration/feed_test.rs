//! End-to-end tests for the desktop client against a served instance:
//! REST feed aggregation, background read confirmation, and live
//! WebSocket intake.

use std::sync::Arc;
use std::time::Duration;

use axum::http::StatusCode;
use serde_json::json;
use tokio::sync::watch;
use tokio::time::{sleep, timeout};

use taskhub_client::{
    ApiClient, EventsListener, NotificationFeed, ReadEventSet, SessionStore, SettingsStore,
};
use taskhub_entity::user::UserRole;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_health_check() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/api/health", None, None).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["status"], "ok");

    let response = app
        .request("GET", "/api/health/detailed", None, None)
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["database"], "connected");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_ws_upgrade_requires_token() {
    let app = TestApp::new().await;

    let response = app.request("GET", "/ws", None, None).await;

    assert!(
        response.status == StatusCode::UNAUTHORIZED
            || response.status == StatusCode::BAD_REQUEST
            || response.status == StatusCode::UPGRADE_REQUIRED,
        "Expected 401, 400, or 426, got {}",
        response.status
    );
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_client_feed_end_to_end() {
    let app = TestApp::new().await;
    app.create_test_user("feedlead", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("feedworker", "Str0ng&Secret1", "user")
        .await;

    // Two assignments and one calendar event, seeded through the API.
    let lead_token = app.login("feedlead", "Str0ng&Secret1").await;
    for title in ["First task", "Second task"] {
        let response = app
            .request(
                "POST",
                "/api/tasks",
                Some(json!({ "title": title, "assignee_id": worker_id })),
                Some(&lead_token),
            )
            .await;
        assert_eq!(response.status, StatusCode::OK);
    }
    app.request(
        "POST",
        "/api/events",
        Some(json!({
            "title": "Planning",
            "start_time": "2026-09-20T10:00:00Z",
            "all_day": false,
        })),
        Some(&lead_token),
    )
    .await;

    let base_url = app.serve().await;
    let state_dir = tempfile::tempdir().expect("Failed to create state dir");
    let session = Arc::new(SessionStore::open(state_dir.path()).expect("Failed to open session"));
    let api = Arc::new(ApiClient::new(base_url, Arc::clone(&session)));

    let user = api
        .login("feedworker", "Str0ng&Secret1")
        .await
        .expect("Client login failed");
    assert_eq!(user.username, "feedworker");

    let settings = SettingsStore::new(state_dir.path()).load(user.id);
    let read_events =
        ReadEventSet::open(state_dir.path(), user.id).expect("Failed to open read set");
    let feed = Arc::new(NotificationFeed::new(
        Arc::clone(&api),
        settings.notifications,
        user.role == UserRole::Admin,
        read_events,
    ));

    feed.set_open(true);
    feed.refresh().await.expect("Feed refresh failed");

    // Two unread notifications; the calendar event joins the list but
    // never the badge.
    assert_eq!(feed.badge_count(), 2);
    let items = feed.items();
    assert_eq!(items.len(), 3);

    feed.mark_all_read().expect("mark_all_read failed");
    assert_eq!(feed.badge_count(), 0);
    assert!(feed.items().is_empty());

    // Confirmation happens in the background; wait for the server to
    // agree.
    let worker_token = app.login("feedworker", "Str0ng&Secret1").await;
    let mut server_count = -1;
    for _ in 0..50 {
        let response = app
            .request(
                "GET",
                "/api/notifications/unread-count",
                None,
                Some(&worker_token),
            )
            .await;
        server_count = response.body["data"]["count"].as_i64().unwrap();
        if server_count == 0 {
            break;
        }
        sleep(Duration::from_millis(100)).await;
    }
    assert_eq!(server_count, 0, "Server never saw the reads");

    // A fresh refresh stays empty: the event is in the read set.
    feed.refresh().await.expect("Feed refresh failed");
    assert_eq!(feed.badge_count(), 0);
    assert!(feed.items().is_empty());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_ws_push_reaches_feed() {
    let app = TestApp::new().await;
    app.create_test_user("pushlead", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("pushworker", "Str0ng&Secret1", "user")
        .await;

    let base_url = app.serve().await;
    let state_dir = tempfile::tempdir().expect("Failed to create state dir");
    let session = Arc::new(SessionStore::open(state_dir.path()).expect("Failed to open session"));
    let api = Arc::new(ApiClient::new(base_url, Arc::clone(&session)));

    let user = api
        .login("pushworker", "Str0ng&Secret1")
        .await
        .expect("Client login failed");

    let settings = SettingsStore::new(state_dir.path()).load(user.id);
    let read_events =
        ReadEventSet::open(state_dir.path(), user.id).expect("Failed to open read set");
    let feed = Arc::new(NotificationFeed::new(
        Arc::clone(&api),
        settings.notifications,
        false,
        read_events,
    ));
    feed.refresh().await.expect("Feed refresh failed");
    assert_eq!(feed.badge_count(), 0);

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let listener = EventsListener::new(Arc::clone(&api), Arc::clone(&feed));
    let listener_handle = tokio::spawn(async move { listener.run(shutdown_rx).await });

    // Give the socket a moment to register before triggering the push.
    sleep(Duration::from_millis(500)).await;

    let mut revision = feed.subscribe();
    revision.mark_unchanged();

    let lead_token = app.login("pushlead", "Str0ng&Secret1").await;
    let response = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "Live push", "assignee_id": worker_id })),
            Some(&lead_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    timeout(Duration::from_secs(10), revision.changed())
        .await
        .expect("No push arrived within 10s")
        .expect("Revision channel closed");

    let items = feed.items();
    assert!(
        items.iter().any(|item| item.body.contains("Live push")),
        "Pushed notification missing from feed: {items:?}"
    );

    let _ = shutdown_tx.send(true);
    let _ = timeout(Duration::from_secs(5), listener_handle).await;
}
