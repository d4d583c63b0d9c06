//! Integration tests for role and ownership enforcement.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_uninvolved_user_cannot_view_task() {
    let app = TestApp::new().await;
    app.create_test_user("owner7", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("stranger7", "Str0ng&Secret1", "user")
        .await;

    let owner_token = app.login("owner7", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "Private work" })),
            Some(&owner_token),
        )
        .await;
    let task_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let stranger_token = app.login("stranger7", "Str0ng&Secret1").await;
    let response = app
        .request(
            "GET",
            &format!("/api/tasks/{task_id}"),
            None,
            Some(&stranger_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_assignee_cannot_edit_fields() {
    let app = TestApp::new().await;
    app.create_test_user("owner8", "Str0ng&Secret1", "user")
        .await;
    let helper_id = app
        .create_test_user("helper8", "Str0ng&Secret1", "user")
        .await;

    let owner_token = app.login("owner8", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "Hands off", "assignee_id": helper_id })),
            Some(&owner_token),
        )
        .await;
    let task_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let helper_token = app.login("helper8", "Str0ng&Secret1").await;
    let response = app
        .request(
            "PUT",
            &format!("/api/tasks/{task_id}"),
            Some(json!({ "title": "Renamed by assignee" })),
            Some(&helper_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_only_creator_or_admin_deletes_task() {
    let app = TestApp::new().await;
    app.create_test_user("owner9", "Str0ng&Secret1", "user")
        .await;
    let helper_id = app
        .create_test_user("helper9", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("admin9", "Str0ng&Secret1", "admin")
        .await;

    let owner_token = app.login("owner9", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/tasks",
            Some(json!({ "title": "Contested", "assignee_id": helper_id })),
            Some(&owner_token),
        )
        .await;
    let task_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let helper_token = app.login("helper9", "Str0ng&Secret1").await;
    let response = app
        .request(
            "DELETE",
            &format!("/api/tasks/{task_id}"),
            None,
            Some(&helper_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let admin_token = app.login("admin9", "Str0ng&Secret1").await;
    let response = app
        .request(
            "DELETE",
            &format!("/api/tasks/{task_id}"),
            None,
            Some(&admin_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_admin_endpoints_require_admin_role() {
    let app = TestApp::new().await;
    app.create_test_user("user10", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("admin10", "Str0ng&Secret1", "admin")
        .await;

    let user_token = app.login("user10", "Str0ng&Secret1").await;
    let response = app
        .request("GET", "/api/admin/users", None, Some(&user_token))
        .await;
    assert_eq!(response.status, StatusCode::FORBIDDEN);

    let admin_token = app.login("admin10", "Str0ng&Secret1").await;
    let response = app
        .request("GET", "/api/admin/users", None, Some(&admin_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["items"].is_array());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_admin_creates_user_who_can_login() {
    let app = TestApp::new().await;
    app.create_test_user("admin11", "Str0ng&Secret1", "admin")
        .await;
    let admin_token = app.login("admin11", "Str0ng&Secret1").await;

    let response = app
        .request(
            "POST",
            "/api/admin/users",
            Some(json!({
                "username": "newhire",
                "email": "newhire@test.com",
                "password": "Fresh&Start99",
                "display_name": "New Hire",
                "role": "user",
            })),
            Some(&admin_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "newhire");

    let token = app.login("newhire", "Fresh&Start99").await;
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::OK);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_duplicate_username_conflicts() {
    let app = TestApp::new().await;
    app.create_test_user("admin12", "Str0ng&Secret1", "admin")
        .await;
    app.create_test_user("taken", "Str0ng&Secret1", "user")
        .await;

    let admin_token = app.login("admin12", "Str0ng&Secret1").await;
    let response = app
        .request(
            "POST",
            "/api/admin/users",
            Some(json!({
                "username": "taken",
                "email": "other@test.com",
                "password": "Fresh&Start99",
                "role": "user",
            })),
            Some(&admin_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::CONFLICT);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_project_manage_requires_owner_or_admin() {
    let app = TestApp::new().await;
    app.create_test_user("owner13", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("member13", "Str0ng&Secret1", "user")
        .await;

    let owner_token = app.login("owner13", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/projects",
            Some(json!({ "name": "Launch plan" })),
            Some(&owner_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let project_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let member_token = app.login("member13", "Str0ng&Secret1").await;
    let response = app
        .request(
            "PUT",
            &format!("/api/projects/{project_id}"),
            Some(json!({ "name": "Hijacked plan" })),
            Some(&member_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}
