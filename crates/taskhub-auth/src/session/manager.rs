//! Session lifecycle manager — login, logout, refresh token flows.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::{info, warn};
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::repositories::{SessionRepository, UserRepository};
use taskhub_entity::session::model::{CreateSession, Session};
use taskhub_entity::session::token::TokenPair;
use taskhub_entity::user::User;

use crate::jwt::{Claims, JwtDecoder, JwtEncoder};
use crate::password::PasswordHasher;

/// Result of a successful login or refresh.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoginResult {
    /// Generated token pair.
    pub tokens: TokenPair,
    /// The session backing the tokens.
    pub session: Session,
    /// The authenticated user.
    pub user: User,
}

/// An access token resolved to a live session and user.
#[derive(Debug, Clone)]
pub struct AuthenticatedRequest {
    /// Decoded token claims.
    pub claims: Claims,
    /// The user, freshly loaded so role and status changes take effect
    /// before the token expires.
    pub user: User,
}

/// Manages the complete session lifecycle.
///
/// Revocation is database-backed: every access token carries a session ID
/// that must resolve to an active row, and refresh tokens must match the
/// session's stored JTI. Rotating the JTI on each refresh means a stolen
/// refresh token stops working as soon as the legitimate client uses its
/// own copy.
#[derive(Debug, Clone)]
pub struct SessionManager {
    jwt_encoder: JwtEncoder,
    jwt_decoder: JwtDecoder,
    sessions: SessionRepository,
    users: UserRepository,
    password_hasher: PasswordHasher,
}

impl SessionManager {
    /// Creates a new session manager.
    pub fn new(
        jwt_encoder: JwtEncoder,
        jwt_decoder: JwtDecoder,
        sessions: SessionRepository,
        users: UserRepository,
        password_hasher: PasswordHasher,
    ) -> Self {
        Self {
            jwt_encoder,
            jwt_decoder,
            sessions,
            users,
            password_hasher,
        }
    }

    /// Performs the login flow:
    ///
    /// 1. Look up the user by username
    /// 2. Check the account is active
    /// 3. Verify the password
    /// 4. Create a session row holding the refresh JTI
    /// 5. Generate the token pair
    pub async fn login(
        &self,
        username: &str,
        password: &str,
        ip_address: Option<String>,
        user_agent: Option<String>,
    ) -> AppResult<LoginResult> {
        let user = self
            .users
            .find_by_username(username)
            .await?
            .ok_or_else(|| AppError::authentication("Invalid username or password"))?;

        if !user.can_login() {
            warn!(user_id = %user.id, "Login attempt on deactivated account");
            return Err(AppError::authorization(
                "Account is deactivated. Contact an administrator.",
            ));
        }

        let password_valid = self
            .password_hasher
            .verify_password(password, &user.password_hash)?;

        if !password_valid {
            warn!(user_id = %user.id, "Failed login attempt");
            return Err(AppError::authentication("Invalid username or password"));
        }

        let refresh_jti = Uuid::new_v4();
        let session = self
            .sessions
            .create(&CreateSession {
                user_id: user.id,
                refresh_jti,
                ip_address,
                user_agent,
                expires_at: Utc::now() + self.jwt_encoder.refresh_ttl(),
            })
            .await?;

        let tokens = self
            .jwt_encoder
            .generate_token_pair(&user, session.id, refresh_jti)?;

        let _ = self.users.record_login(user.id).await;

        info!(user_id = %user.id, session_id = %session.id, "Login successful");

        Ok(LoginResult {
            tokens,
            session,
            user,
        })
    }

    /// Exchanges a refresh token for a new token pair.
    ///
    /// The session's stored JTI must match the presented token; the match
    /// and the rotation happen in one statement, so a replayed refresh
    /// token loses the race and is rejected.
    pub async fn refresh(&self, refresh_token: &str) -> AppResult<LoginResult> {
        let claims = self.jwt_decoder.decode_refresh_token(refresh_token)?;

        let new_jti = Uuid::new_v4();
        let session = self
            .sessions
            .rotate_refresh(
                claims.session_id(),
                claims.jti,
                new_jti,
                Utc::now() + self.jwt_encoder.refresh_ttl(),
            )
            .await?
            .ok_or_else(|| {
                warn!(session_id = %claims.session_id(), "Refresh token rotation failed");
                AppError::authentication("Refresh token is no longer valid")
            })?;

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        if !user.can_login() {
            return Err(AppError::authorization(
                "Account is deactivated. Contact an administrator.",
            ));
        }

        let tokens = self
            .jwt_encoder
            .generate_token_pair(&user, session.id, new_jti)?;

        info!(user_id = %user.id, session_id = %session.id, "Token refreshed");

        Ok(LoginResult {
            tokens,
            session,
            user,
        })
    }

    /// Revokes a session. Logout is idempotent: revoking an
    /// already-revoked session succeeds silently.
    pub async fn logout(&self, session_id: Uuid) -> AppResult<()> {
        let revoked = self.sessions.revoke(session_id).await?;
        if revoked {
            info!(session_id = %session_id, "Logout completed");
        }
        Ok(())
    }

    /// Revokes every session for a user. Used when an admin deactivates
    /// an account or a password is changed.
    pub async fn logout_all(&self, user_id: Uuid) -> AppResult<u64> {
        let revoked = self.sessions.revoke_all_for_user(user_id).await?;
        if revoked > 0 {
            info!(user_id = %user_id, sessions = revoked, "Revoked all sessions");
        }
        Ok(revoked)
    }

    /// Validates an access token end to end: signature, expiry, session
    /// liveness, and user status.
    pub async fn authenticate(&self, access_token: &str) -> AppResult<AuthenticatedRequest> {
        let claims = self.jwt_decoder.decode_access_token(access_token)?;

        let session = self
            .sessions
            .find_by_id(claims.session_id())
            .await?
            .ok_or_else(|| AppError::authentication("Session not found"))?;

        if !session.is_active() {
            return Err(AppError::authentication("Session is no longer active"));
        }

        let user = self
            .users
            .find_by_id(claims.user_id())
            .await?
            .ok_or_else(|| AppError::authentication("User not found"))?;

        if !user.can_login() {
            return Err(AppError::authorization(
                "Account is deactivated. Contact an administrator.",
            ));
        }

        Ok(AuthenticatedRequest { claims, user })
    }
}
