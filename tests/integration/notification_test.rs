//! Integration tests for notification fanout and read state.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

/// Creates a task by `lead` assigned to `worker_id` and returns its ID.
async fn assign_task(app: &TestApp, lead_token: &str, worker_id: uuid::Uuid, title: &str) -> String {
    let response = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": title, "assignee_id": worker_id })),
            Some(lead_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    response.body["data"]["id"].as_str().unwrap().to_string()
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_assignment_notifies_assignee() {
    let app = TestApp::new().await;
    app.create_test_user("lead2", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("worker2", "Str0ng&Secret1", "user")
        .await;

    let lead_token = app.login("lead2", "Str0ng&Secret1").await;
    assign_task(&app, &lead_token, worker_id, "Notify me").await;

    let worker_token = app.login("worker2", "Str0ng&Secret1").await;
    let response = app
        .request("GET", "/api/notifications/unread", None, Some(&worker_token))
        .await;

    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "task_assigned");
    assert_eq!(items[0]["is_read"], false);

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 1);

    // The actor is never notified about their own action.
    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&lead_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_self_assignment_is_silent() {
    let app = TestApp::new().await;
    let solo_id = app
        .create_test_user("solo2", "Str0ng&Secret1", "user")
        .await;
    let token = app.login("solo2", "Str0ng&Secret1").await;

    assign_task(&app, &token, solo_id, "My own task").await;

    let response = app
        .request("GET", "/api/notifications/unread-count", None, Some(&token))
        .await;
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_mark_read_is_idempotent() {
    let app = TestApp::new().await;
    app.create_test_user("lead3", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("worker3", "Str0ng&Secret1", "user")
        .await;

    let lead_token = app.login("lead3", "Str0ng&Secret1").await;
    assign_task(&app, &lead_token, worker_id, "Read me").await;

    let worker_token = app.login("worker3", "Str0ng&Secret1").await;
    let unread = app
        .request("GET", "/api/notifications/unread", None, Some(&worker_token))
        .await;
    let notification_id = unread.body["data"]["items"][0]["id"]
        .as_str()
        .unwrap()
        .to_string();

    let path = format!("/api/notifications/{notification_id}/read");
    let response = app.request("PUT", &path, None, Some(&worker_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 0);

    // Marking again is harmless.
    let response = app.request("PUT", &path, None, Some(&worker_token)).await;
    assert_eq!(response.status, StatusCode::OK);

    // The notification is still listed, now read.
    let response = app
        .request("GET", "/api/notifications", None, Some(&worker_token))
        .await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["is_read"], true);
    assert!(items[0]["read_at"].is_string());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_mark_read_scoped_to_recipient() {
    let app = TestApp::new().await;
    app.create_test_user("lead4", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("worker4", "Str0ng&Secret1", "user")
        .await;

    let lead_token = app.login("lead4", "Str0ng&Secret1").await;
    assign_task(&app, &lead_token, worker_id, "Not yours").await;

    let worker_token = app.login("worker4", "Str0ng&Secret1").await;
    let unread = app
        .request("GET", "/api/notifications/unread", None, Some(&worker_token))
        .await;
    let notification_id = unread.body["data"]["items"][0]["id"].as_str().unwrap();

    // The lead cannot mark the worker's notification.
    let response = app
        .request(
            "PUT",
            &format!("/api/notifications/{notification_id}/read"),
            None,
            Some(&lead_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::NOT_FOUND);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_mark_all_read() {
    let app = TestApp::new().await;
    app.create_test_user("lead5", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("worker5", "Str0ng&Secret1", "user")
        .await;

    let lead_token = app.login("lead5", "Str0ng&Secret1").await;
    assign_task(&app, &lead_token, worker_id, "First").await;
    assign_task(&app, &lead_token, worker_id, "Second").await;

    let worker_token = app.login("worker5", "Str0ng&Secret1").await;
    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 2);

    let response = app
        .request(
            "PUT",
            "/api/notifications/read-all",
            None,
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["marked"], 2);

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_completion_notifies_creator() {
    let app = TestApp::new().await;
    app.create_test_user("lead6", "Str0ng&Secret1", "user")
        .await;
    let worker_id = app
        .create_test_user("worker6", "Str0ng&Secret1", "user")
        .await;

    let lead_token = app.login("lead6", "Str0ng&Secret1").await;
    let task_id = assign_task(&app, &lead_token, worker_id, "Finish me").await;

    let worker_token = app.login("worker6", "Str0ng&Secret1").await;
    let response = app
        .request(
            "PUT",
            &format!("/api/tasks/{task_id}/status"),
            Some(json!({ "status": "completed" })),
            Some(&worker_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/notifications/unread", None, Some(&lead_token))
        .await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "task_completed");

    // The worker only has the original assignment notification.
    let response = app
        .request("GET", "/api/notifications/unread", None, Some(&worker_token))
        .await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "task_assigned");
}
