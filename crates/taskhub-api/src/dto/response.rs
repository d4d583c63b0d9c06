//! Response DTOs.
//!
//! Entities serialize directly (password hashes are skipped at the
//! entity level), so most endpoints wrap a domain type in
//! [`ApiResponse`] without an intermediate mapping struct.

use serde::{Deserialize, Serialize};

use taskhub_auth::LoginResult;
use taskhub_entity::user::User;

/// The uniform response envelope every endpoint returns.
///
/// All three keys are always present: `data` is `null` on errors and
/// for endpoints that only confirm an action, `message` is `null`
/// unless there is something human-readable to say.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiResponse<T: Serialize> {
    /// Whether the request was successful.
    pub success: bool,
    /// Response payload.
    pub data: T,
    /// Optional human-readable message.
    pub message: Option<String>,
}

impl<T: Serialize> ApiResponse<T> {
    /// Creates a successful response.
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data,
            message: None,
        }
    }

    /// Creates a successful response carrying a confirmation message.
    pub fn with_message(data: T, message: impl Into<String>) -> Self {
        Self {
            success: true,
            data,
            message: Some(message.into()),
        }
    }
}

impl ApiResponse<()> {
    /// Creates a failed response. `data` serializes as `null`.
    pub fn error(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: (),
            message: Some(message.into()),
        }
    }
}

/// Login and refresh response: the token pair plus the user it belongs to.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResponse {
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

impl From<LoginResult> for LoginResponse {
    fn from(result: LoginResult) -> Self {
        Self {
            access_token: result.tokens.access_token.token,
            access_expires_in: result.tokens.access_token.expires_in,
            refresh_token: result.tokens.refresh_token.token,
            refresh_expires_in: result.tokens.refresh_token.expires_in,
            user: result.user,
        }
    }
}

/// Count payload, used by the unread-count endpoint.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CountResponse {
    /// Count value.
    pub count: i64,
}

/// How many rows a bulk operation touched.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarkedResponse {
    /// Number of notifications marked as read.
    pub marked: i64,
}

/// Health check payload.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    /// Service status.
    pub status: String,
    /// Server version.
    pub version: String,
    /// Seconds since the server started.
    pub uptime_seconds: u64,
}

/// Detailed health payload with dependency checks.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetailedHealthResponse {
    /// Overall status.
    pub status: String,
    /// Database connectivity.
    pub database: String,
    /// Active WebSocket connections.
    pub ws_connections: usize,
    /// Users with at least one live connection.
    pub online_users: usize,
}
