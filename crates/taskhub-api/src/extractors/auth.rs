//! `AuthUser` extractor — validates the bearer token and injects the
//! request context.

use axum::extract::FromRequestParts;
use axum::http::request::Parts;

use taskhub_core::error::AppError;
use taskhub_service::RequestContext;

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user context, available to any handler that lists it
/// as a parameter.
///
/// Authentication goes through the session manager, so a revoked
/// session or a deactivated account rejects the request even while the
/// token itself is still within its lifetime.
#[derive(Debug, Clone)]
pub struct AuthUser(pub RequestContext);

impl std::ops::Deref for AuthUser {
    type Target = RequestContext;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get("authorization")
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| AppError::authentication("Missing Authorization header"))?;

        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::authentication("Authorization header must be a bearer token"))?;

        let authenticated = state.session_manager.authenticate(token).await?;
        let session_id = authenticated.claims.session_id();

        Ok(AuthUser(RequestContext::new(authenticated.user, session_id)))
    }
}
