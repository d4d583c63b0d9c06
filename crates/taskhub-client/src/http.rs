//! HTTP access to the TaskHub REST API.
//!
//! Every response is wrapped in the server's `{success, data, message}`
//! envelope. Authenticated calls attach the stored access token and
//! retry exactly once through the refresh endpoint on a 401; a second
//! 401 propagates to the caller.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use reqwest::StatusCode;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskhub_core::types::pagination::PageResponse;
use taskhub_entity::chat::ConversationSummary;
use taskhub_entity::event::CalendarEvent;
use taskhub_entity::notification::Notification;
use taskhub_entity::user::User;

use crate::error::{ClientError, ClientResult};
use crate::session::{SessionStore, StoredSession};

/// Response envelope as the server emits it.
#[derive(Debug, Deserialize)]
struct Envelope<T> {
    success: bool,
    data: Option<T>,
    message: Option<String>,
}

/// Token pair plus user, returned by login and refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct AuthTokens {
    /// JWT access token.
    pub access_token: String,
    /// Access token TTL in seconds.
    pub access_expires_in: u64,
    /// JWT refresh token.
    pub refresh_token: String,
    /// Refresh token TTL in seconds.
    pub refresh_expires_in: u64,
    /// The authenticated user.
    pub user: User,
}

#[derive(Debug, Serialize)]
struct LoginBody<'a> {
    username: &'a str,
    password: &'a str,
}

#[derive(Debug, Serialize)]
struct RefreshBody<'a> {
    refresh_token: &'a str,
}

#[derive(Debug, Deserialize)]
struct CountPayload {
    count: i64,
}

#[derive(Debug, Serialize)]
struct EventRangeParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    from: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    to: Option<DateTime<Utc>>,
}

/// HTTP client for the TaskHub REST API.
pub struct ApiClient {
    http: reqwest::Client,
    base_url: String,
    session: Arc<SessionStore>,
}

impl ApiClient {
    /// Create a client for the server at `base_url`.
    pub fn new(base_url: impl Into<String>, session: Arc<SessionStore>) -> Self {
        let base_url = base_url.into().trim_end_matches('/').to_string();
        Self {
            http: reqwest::Client::new(),
            base_url,
            session,
        }
    }

    /// The server base URL, without a trailing slash.
    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    /// The session store backing this client.
    pub fn session(&self) -> &Arc<SessionStore> {
        &self.session
    }

    /// Log in with username and password, persisting the session.
    pub async fn login(&self, username: &str, password: &str) -> ClientResult<User> {
        let tokens: AuthTokens = Self::parse(
            self.http
                .post(self.url("/api/auth/login"))
                .json(&LoginBody { username, password })
                .send()
                .await?,
        )
        .await?;
        let user = tokens.user.clone();
        self.session.store(StoredSession {
            server_url: self.base_url.clone(),
            access_token: tokens.access_token,
            refresh_token: tokens.refresh_token,
            user: tokens.user,
        })?;
        Ok(user)
    }

    /// Log out, revoking the server session and clearing local state.
    ///
    /// Local state is cleared even when the server rejects the call, so
    /// a stale token never wedges the client in a half-logged-in state.
    pub async fn logout(&self) -> ClientResult<()> {
        let result = self
            .execute_unit(self.http.post(self.url("/api/auth/logout")))
            .await;
        self.session.clear()?;
        match result {
            Err(ClientError::Api { .. }) | Ok(()) => Ok(()),
            Err(err) => Err(err),
        }
    }

    /// Mint a fresh token pair from the stored refresh token.
    pub async fn refresh(&self) -> ClientResult<()> {
        let refresh_token = self
            .session
            .refresh_token()
            .ok_or(ClientError::NotAuthenticated)?;
        let tokens: AuthTokens = Self::parse(
            self.http
                .post(self.url("/api/auth/refresh"))
                .json(&RefreshBody {
                    refresh_token: &refresh_token,
                })
                .send()
                .await?,
        )
        .await?;
        self.session
            .update_tokens(tokens.access_token, tokens.refresh_token)?;
        Ok(())
    }

    /// Fetch the authenticated user's profile.
    pub async fn me(&self) -> ClientResult<User> {
        self.execute(self.http.get(self.url("/api/auth/me"))).await
    }

    /// Fetch one page of the user's notifications, read and unread.
    pub async fn notifications(
        &self,
        page: u64,
        page_size: u64,
    ) -> ClientResult<PageResponse<Notification>> {
        self.execute(
            self.http
                .get(self.url("/api/notifications"))
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }

    /// Fetch one page of the user's unread notifications.
    pub async fn unread_notifications(
        &self,
        page: u64,
        page_size: u64,
    ) -> ClientResult<PageResponse<Notification>> {
        self.execute(
            self.http
                .get(self.url("/api/notifications/unread"))
                .query(&[("page", page), ("page_size", page_size)]),
        )
        .await
    }

    /// Fetch the unread notification count.
    pub async fn unread_count(&self) -> ClientResult<i64> {
        let payload: CountPayload = self
            .execute(self.http.get(self.url("/api/notifications/unread-count")))
            .await?;
        Ok(payload.count)
    }

    /// Mark a single notification as read.
    pub async fn mark_notification_read(&self, id: Uuid) -> ClientResult<()> {
        self.execute_unit(
            self.http
                .put(self.url(&format!("/api/notifications/{id}/read"))),
        )
        .await
    }

    /// Fetch calendar events, optionally bounded to a time range.
    pub async fn events(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> ClientResult<Vec<CalendarEvent>> {
        self.execute(
            self.http
                .get(self.url("/api/events"))
                .query(&EventRangeParams { from, to }),
        )
        .await
    }

    /// Fetch the user's conversations with last message and unread count.
    pub async fn conversations(&self) -> ClientResult<Vec<ConversationSummary>> {
        self.execute(self.http.get(self.url("/api/conversations")))
            .await
    }

    /// Mark a conversation read up to now.
    pub async fn mark_conversation_read(&self, id: Uuid) -> ClientResult<()> {
        self.execute_unit(
            self.http
                .put(self.url(&format!("/api/conversations/{id}/read"))),
        )
        .await
    }

    /// Derive the live-events WebSocket URL, token included.
    pub fn ws_url(&self) -> ClientResult<String> {
        let token = self
            .session
            .access_token()
            .ok_or(ClientError::NotAuthenticated)?;
        let ws_base = if let Some(rest) = self.base_url.strip_prefix("https://") {
            format!("wss://{rest}")
        } else if let Some(rest) = self.base_url.strip_prefix("http://") {
            format!("ws://{rest}")
        } else {
            self.base_url.clone()
        };
        Ok(format!("{ws_base}/ws?token={token}"))
    }

    fn url(&self, path: &str) -> String {
        format!("{}{}", self.base_url, path)
    }

    /// Send an authenticated request whose envelope carries data.
    async fn execute<T: DeserializeOwned>(
        &self,
        builder: reqwest::RequestBuilder,
    ) -> ClientResult<T> {
        let retry = builder.try_clone();
        let token = self
            .session
            .access_token()
            .ok_or(ClientError::NotAuthenticated)?;
        let first = Self::parse(builder.bearer_auth(token).send().await?).await;
        match (first, retry) {
            (Err(err), Some(retry)) if err.is_unauthorized() => {
                self.refresh().await?;
                let token = self
                    .session
                    .access_token()
                    .ok_or(ClientError::NotAuthenticated)?;
                Self::parse(retry.bearer_auth(token).send().await?).await
            }
            (result, _) => result,
        }
    }

    /// Send an authenticated request whose envelope carries null data.
    async fn execute_unit(&self, builder: reqwest::RequestBuilder) -> ClientResult<()> {
        let retry = builder.try_clone();
        let token = self
            .session
            .access_token()
            .ok_or(ClientError::NotAuthenticated)?;
        let first = Self::parse_unit(builder.bearer_auth(token).send().await?).await;
        match (first, retry) {
            (Err(err), Some(retry)) if err.is_unauthorized() => {
                self.refresh().await?;
                let token = self
                    .session
                    .access_token()
                    .ok_or(ClientError::NotAuthenticated)?;
                Self::parse_unit(retry.bearer_auth(token).send().await?).await
            }
            (result, _) => result,
        }
    }

    async fn parse<T: DeserializeOwned>(response: reqwest::Response) -> ClientResult<T> {
        let status = response.status();
        let raw = response.bytes().await?;
        let envelope = decode_envelope::<T>(status, &raw)?;
        envelope
            .data
            .ok_or_else(|| ClientError::api(status.as_u16(), "response carried no data"))
    }

    async fn parse_unit(response: reqwest::Response) -> ClientResult<()> {
        let status = response.status();
        let raw = response.bytes().await?;
        decode_envelope::<serde_json::Value>(status, &raw)?;
        Ok(())
    }
}

/// Decode and check a response envelope.
///
/// Non-2xx statuses and `success: false` envelopes both become
/// [`ClientError::Api`]; error bodies that are not valid envelopes fall
/// back to the HTTP status text.
fn decode_envelope<T: DeserializeOwned>(status: StatusCode, raw: &[u8]) -> ClientResult<Envelope<T>> {
    let envelope: Envelope<T> = match serde_json::from_slice(raw) {
        Ok(envelope) => envelope,
        Err(err) => {
            if status.is_success() {
                return Err(ClientError::Serialization(err));
            }
            return Err(ClientError::api(status.as_u16(), status_text(status)));
        }
    };
    if !status.is_success() || !envelope.success {
        let message = envelope
            .message
            .unwrap_or_else(|| status_text(status).to_string());
        return Err(ClientError::api(status.as_u16(), message));
    }
    Ok(envelope)
}

fn status_text(status: StatusCode) -> &'static str {
    status.canonical_reason().unwrap_or("request failed")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_success_envelope() {
        let raw = br#"{"success":true,"data":{"count":7},"message":null}"#;
        let envelope = decode_envelope::<CountPayload>(StatusCode::OK, raw).unwrap();
        assert_eq!(envelope.data.unwrap().count, 7);
    }

    #[test]
    fn test_decode_failure_envelope_uses_message() {
        let raw = br#"{"success":false,"data":null,"message":"Notification not found"}"#;
        let err = decode_envelope::<CountPayload>(StatusCode::NOT_FOUND, raw).unwrap_err();
        match err {
            ClientError::Api { status, message } => {
                assert_eq!(status, 404);
                assert_eq!(message, "Notification not found");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_non_json_error_body() {
        let err =
            decode_envelope::<CountPayload>(StatusCode::BAD_GATEWAY, b"<html>oops</html>")
                .unwrap_err();
        match err {
            ClientError::Api { status, .. } => assert_eq!(status, 502),
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn test_decode_garbage_on_success_status() {
        let err = decode_envelope::<CountPayload>(StatusCode::OK, b"garbage").unwrap_err();
        assert!(matches!(err, ClientError::Serialization(_)));
    }

    #[test]
    fn test_decode_null_data_envelope_as_unit() {
        let raw = br#"{"success":true,"data":null,"message":"Notification marked as read"}"#;
        let envelope = decode_envelope::<serde_json::Value>(StatusCode::OK, raw).unwrap();
        assert!(envelope.data.is_none());
    }

    #[test]
    fn test_ws_url_swaps_scheme_and_carries_token() {
        let dir = tempfile::tempdir().unwrap();
        let session = Arc::new(SessionStore::open(dir.path()).unwrap());
        let client = ApiClient::new("http://localhost:8080/", session.clone());
        assert_eq!(client.base_url(), "http://localhost:8080");

        assert!(client.ws_url().is_err());

        let user: User = serde_json::from_value(serde_json::json!({
            "id": Uuid::new_v4(),
            "username": "alice",
            "email": "alice@example.com",
            "display_name": null,
            "avatar_path": null,
            "role": "user",
            "status": "active",
            "created_at": Utc::now(),
            "updated_at": Utc::now(),
            "last_login_at": null,
        }))
        .unwrap();
        session
            .store(StoredSession {
                server_url: "http://localhost:8080".into(),
                access_token: "tok123".into(),
                refresh_token: "ref456".into(),
                user,
            })
            .unwrap();

        assert_eq!(
            client.ws_url().unwrap(),
            "ws://localhost:8080/ws?token=tok123"
        );
    }
}
