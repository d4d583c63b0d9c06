//! Request context carrying the authenticated user and session.

use chrono::{DateTime, Utc};
use uuid::Uuid;

use taskhub_entity::user::{User, UserRole};

/// Context for the current authenticated request.
///
/// Built by the API layer after token verification and passed into
/// service methods so that every operation knows *who* is acting and
/// from *which* session. Carries the full user row (not just claims) so
/// access checks see the role and status as stored, not as issued.
#[derive(Debug, Clone)]
pub struct RequestContext {
    /// The authenticated user.
    pub user: User,
    /// The current session ID.
    pub session_id: Uuid,
    /// When the request was received.
    pub request_time: DateTime<Utc>,
}

impl RequestContext {
    /// Creates a new request context.
    pub fn new(user: User, session_id: Uuid) -> Self {
        Self {
            user,
            session_id,
            request_time: Utc::now(),
        }
    }

    /// The acting user's ID.
    pub fn user_id(&self) -> Uuid {
        self.user.id
    }

    /// The acting user's role.
    pub fn role(&self) -> UserRole {
        self.user.role
    }

    /// Returns whether the current user is an admin.
    pub fn is_admin(&self) -> bool {
        self.user.is_admin()
    }
}
