//! Project membership entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// Membership of a user in a project.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ProjectMember {
    /// The project.
    pub project_id: Uuid,
    /// The member user.
    pub user_id: Uuid,
    /// When the user was added.
    pub added_at: DateTime<Utc>,
}
