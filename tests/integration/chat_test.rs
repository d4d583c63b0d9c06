//! Integration tests for conversations and messages.

use axum::http::StatusCode;
use serde_json::json;

use crate::helpers::TestApp;

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_direct_conversation_and_message() {
    let app = TestApp::new().await;
    app.create_test_user("alice1", "Str0ng&Secret1", "user")
        .await;
    let bob_id = app
        .create_test_user("bob1", "Str0ng&Secret1", "user")
        .await;

    let alice_token = app.login("alice1", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(created.status, StatusCode::OK);
    let conversation_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let response = app
        .request(
            "POST",
            &format!("/api/conversations/{conversation_id}/messages"),
            Some(json!({ "body": "Hello Bob" })),
            Some(&alice_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    assert_eq!(response.body["data"]["body"], "Hello Bob");

    let bob_token = app.login("bob1", "Str0ng&Secret1").await;
    let response = app
        .request(
            "GET",
            &format!("/api/conversations/{conversation_id}/messages"),
            None,
            Some(&bob_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["body"], "Hello Bob");
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_direct_conversations_are_deduplicated() {
    let app = TestApp::new().await;
    app.create_test_user("alice2", "Str0ng&Secret1", "user")
        .await;
    let bob_id = app
        .create_test_user("bob2", "Str0ng&Secret1", "user")
        .await;

    let alice_token = app.login("alice2", "Str0ng&Secret1").await;
    let first = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;
    let second = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;

    assert_eq!(first.body["data"]["id"], second.body["data"]["id"]);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_message_notifies_other_member_only() {
    let app = TestApp::new().await;
    app.create_test_user("alice3", "Str0ng&Secret1", "user")
        .await;
    let bob_id = app
        .create_test_user("bob3", "Str0ng&Secret1", "user")
        .await;

    let alice_token = app.login("alice3", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;
    let conversation_id = created.body["data"]["id"].as_str().unwrap().to_string();

    app.request(
        "POST",
        &format!("/api/conversations/{conversation_id}/messages"),
        Some(json!({ "body": "Ping" })),
        Some(&alice_token),
    )
    .await;

    let bob_token = app.login("bob3", "Str0ng&Secret1").await;
    let response = app
        .request("GET", "/api/notifications/unread", None, Some(&bob_token))
        .await;
    let items = response.body["data"]["items"].as_array().unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0]["kind"], "message_new");

    let response = app
        .request(
            "GET",
            "/api/notifications/unread-count",
            None,
            Some(&alice_token),
        )
        .await;
    assert_eq!(response.body["data"]["count"], 0);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_non_member_cannot_read_messages() {
    let app = TestApp::new().await;
    app.create_test_user("alice4", "Str0ng&Secret1", "user")
        .await;
    let bob_id = app
        .create_test_user("bob4", "Str0ng&Secret1", "user")
        .await;
    app.create_test_user("eve4", "Str0ng&Secret1", "user")
        .await;

    let alice_token = app.login("alice4", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;
    let conversation_id = created.body["data"]["id"].as_str().unwrap().to_string();

    let eve_token = app.login("eve4", "Str0ng&Secret1").await;
    let response = app
        .request(
            "GET",
            &format!("/api/conversations/{conversation_id}/messages"),
            None,
            Some(&eve_token),
        )
        .await;

    assert_eq!(response.status, StatusCode::FORBIDDEN);
}

#[tokio::test]
#[ignore = "needs PostgreSQL"]
async fn test_conversation_read_clears_unread_summary() {
    let app = TestApp::new().await;
    app.create_test_user("alice5", "Str0ng&Secret1", "user")
        .await;
    let bob_id = app
        .create_test_user("bob5", "Str0ng&Secret1", "user")
        .await;

    let alice_token = app.login("alice5", "Str0ng&Secret1").await;
    let created = app
        .request(
            "POST",
            "/api/conversations",
            Some(json!({ "kind": "direct", "member_ids": [bob_id] })),
            Some(&alice_token),
        )
        .await;
    let conversation_id = created.body["data"]["id"].as_str().unwrap().to_string();

    app.request(
        "POST",
        &format!("/api/conversations/{conversation_id}/messages"),
        Some(json!({ "body": "Unread for Bob" })),
        Some(&alice_token),
    )
    .await;

    let bob_token = app.login("bob5", "Str0ng&Secret1").await;
    let response = app
        .request("GET", "/api/conversations", None, Some(&bob_token))
        .await;
    assert_eq!(response.status, StatusCode::OK);
    let summaries = response.body["data"].as_array().unwrap();
    assert_eq!(summaries.len(), 1);
    assert_eq!(summaries[0]["unread_count"], 1);

    let response = app
        .request(
            "PUT",
            &format!("/api/conversations/{conversation_id}/read"),
            None,
            Some(&bob_token),
        )
        .await;
    assert_eq!(response.status, StatusCode::OK);

    let response = app
        .request("GET", "/api/conversations", None, Some(&bob_token))
        .await;
    let summaries = response.body["data"].as_array().unwrap();
    assert_eq!(summaries[0]["unread_count"], 0);
}
