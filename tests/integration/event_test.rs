//! Integration tests for calendar events.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_create_and_range_query() {
    let app = TestApp::new().await;
    app.create_test_user("planner1", "Str0ng&Secret1", "user")
        .await;
    let token = app.login("planner1", "Str0ng&Secret1").await;

    let response = app
        .request(
            "POST",
            "/api/events",
            Some(json!({
                "title": "Sprint review",
                "start_time": "2026-09-03T10:00:00Z",
                "end_time": "2026-09-03T11:00:00Z",
                "all_day": false,
            })),
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Sprint review");

    app.request(
        "POST",
        "/api/events",
        Some(json!({
            "title": "Next month kickoff",
            "start_time": "2026-10-07T09:00:00Z",
            "all_day": false,
        })),
        Some(&token),
    )
    .await;

    let response = app
        .request(
            "GET",
            "/api/events?from=2026-09-01T00:00:00Z&to=2026-09-30T23:59:59Z",
            None,
            Some(&token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let events = response.body["data"].as_array().unwrap();
    assert_eq!(events.len(), 1);
    assert_eq!(events[0]["title"], "Sprint review");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_events_visible_to_everyone() {
    let app = TestApp::new().await;
    app.create_test_user("planner2", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("viewer2", "Str0ng&Secret1", "user")
        .await;

    let planner_token = app.login("planner2", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/events",
            Some(json!({
                "title": "All hands",
                "start_time": "2026-09-10T14:00:00Z",
                "all_day": false,
            })),
            Some(&planner_token),
        )
        .await;
    let event_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let viewer_token = app.login("viewer2", "Str0ng&Secret1").await;
    let response = app
        .request(
            "GET",
            &format!("/api/events/{event_id}"),
            None,
            Some(&viewer_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "All hands");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_only_creator_or_admin_updates_event() {
    let app = TestApp::new().await;
    app.create_test_user("planner3", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("viewer3", "Str0ng&Secret1", "user")
        .await;

    let planner_token = app.login("planner3", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/events",
            Some(json!({
                "title": "Design sync",
                "start_time": "2026-09-12T09:00:00Z",
                "all_day": false,
            })),
            Some(&planner_token),
        )
        .await;
    let event_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let viewer_token = app.login("viewer3", "Str0ng&Secret1").await;
    let response = app
        .request(
            "PUT",
            &format!("/api/events/{event_id}"),
            Some(json!({ "title": "Taken over" })),
            Some(&viewer_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let response = app
        .request(
            "PUT",
            &format!("/api/events/{event_id}"),
            Some(json!({ "title": "Design sync (moved)" })),
            Some(&planner_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["title"], "Design sync (moved)");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_delete_event() {
    let app = TestApp::new().await;
    app.create_test_user("planner4", "Str0ng&Secret1", "user")
        .await;
    let token = app.login("planner4", "Str0ng&Secret1").await;

    let created = app
        .request(
            "POST",
            "/api/events",
            Some(json!({
                "title": "Cancelled meeting",
                "start_time": "2026-09-15T16:00:00Z",
                "all_day": true,
            })),
            Some(&token),
        )
        .await;
    let event_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "DELETE",
            &format!("/api/events/{event_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            &format!("/api/events/{event_id}"),
            None,
            Some(&token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}
