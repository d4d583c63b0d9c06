//! Session entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A login session backed by a refresh token.
///
/// Sessions are created on login and revoked on logout or refresh-token
/// rotation failure. Access tokens reference their session via the
/// `sid` claim; a revoked session invalidates all of its tokens.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Session {
    /// Unique session identifier.
    pub id: Uuid,
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// JWT ID of the currently valid refresh token. Rotated on refresh.
    pub refresh_jti: Uuid,
    /// IP address from which the session was created.
    pub ip_address: Option<String>,
    /// User-Agent header value.
    pub user_agent: Option<String>,
    /// When the session was created (login time).
    pub created_at: DateTime<Utc>,
    /// Last time a token from this session was used.
    pub last_seen_at: DateTime<Utc>,
    /// When the session expires (refresh token lifetime).
    pub expires_at: DateTime<Utc>,
    /// When the session was revoked (logout or rotation failure).
    pub revoked_at: Option<DateTime<Utc>>,
}

impl Session {
    /// Check whether the session is still active (not revoked and not expired).
    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none() && self.expires_at > Utc::now()
    }

    /// Check whether the session has expired.
    pub fn is_expired(&self) -> bool {
        self.expires_at <= Utc::now()
    }
}

/// Data required to create a new session.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateSession {
    /// The user this session belongs to.
    pub user_id: Uuid,
    /// JWT ID of the issued refresh token.
    pub refresh_jti: Uuid,
    /// IP address of the client.
    pub ip_address: Option<String>,
    /// User-Agent header.
    pub user_agent: Option<String>,
    /// When the session expires.
    pub expires_at: DateTime<Utc>,
}
