//! Integration tests for the authentication flow.

use axum::http::StatusCode;

use crate::helpers;

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_login_success() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("testuser", "Str0ng&Secret1", "user")
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "testuser",
                "password": "Str0ng&Secret1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["access_token"].is_string());
    assert!(response.body["data"]["refresh_token"].is_string());
    assert_eq!(response.body["data"]["user"]["username"], "testuser");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_login_invalid_password() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("testuser2", "Str0ng&Secret1", "user")
        .await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "testuser2",
                "password": "wrongpassword",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
    assert_eq!(response.body["success"], false);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_login_nonexistent_user() {
    let app = helpers::TestApp::new().await;

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "nobody",
                "password": "Str0ng&Secret1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_login_deactivated_account() {
    let app = helpers::TestApp::new().await;
    let user_id = app
        .create_test_user("inactiveuser", "Str0ng&Secret1", "user")
        .await;

    sqlx::query("UPDATE users SET status = 'inactive'::user_status WHERE id = $1")
        .bind(user_id)
        .execute(&app.db_pool)
        .await
        .expect("Failed to deactivate user");

    let response = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "inactiveuser",
                "password": "Str0ng&Secret1",
            })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_me_authenticated() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("meuser", "Str0ng&Secret1", "admin")
        .await;
    let token = app.login("meuser", "Str0ng&Secret1").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["username"], "meuser");
    assert_eq!(response.body["data"]["role"], "admin");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_me_unauthenticated() {
    let app = helpers::TestApp::new().await;

    let response = app.request("GET", "/api/auth/me", None, None).await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_me_never_exposes_password_hash() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("hashuser", "Str0ng&Secret1", "user")
        .await;
    let token = app.login("hashuser", "Str0ng&Secret1").await;

    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"].get("password_hash").is_none());
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_logout_revokes_session() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("logoutuser", "Str0ng&Secret1", "user")
        .await;
    let token = app.login("logoutuser", "Str0ng&Secret1").await;

    let response = app
        .request("POST", "/api/auth/logout", None, Some(&token))
        .await;
    assert_eq!(response.status, StatusCode::OK);

    // The access token is still within its lifetime, but its session
    // is gone.
    let response = app.request("GET", "/api/auth/me", None, Some(&token)).await;
    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_refresh_rotates_tokens() {
    let app = helpers::TestApp::new().await;
    app.create_test_user("refreshuser", "Str0ng&Secret1", "user")
        .await;

    let login_resp = app
        .request(
            "POST",
            "/api/auth/login",
            Some(serde_json::json!({
                "username": "refreshuser",
                "password": "Str0ng&Secret1",
            })),
            None,
        )
        .await;

    let refresh_token = login_resp.body["data"]["refresh_token"]
        .as_str()
        .expect("No refresh_token in login response")
        .to_string();

    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::OK);
    assert!(response.body["data"]["access_token"].is_string());

    // The old refresh token was rotated away and no longer works.
    let response = app
        .request(
            "POST",
            "/api/auth/refresh",
            Some(serde_json::json!({ "refresh_token": refresh_token })),
            None,
        )
        .await;

    assert_eq!(response.status, StatusCode::UNAUTHORIZED);
}
