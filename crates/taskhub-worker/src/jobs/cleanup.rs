//! Retention cleanup jobs for notifications and sessions.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::info;

use taskhub_core::result::AppResult;
use taskhub_database::repositories::{NotificationRepository, SessionRepository};

/// Deletes read notifications past the retention window and trims each
/// user's stored notifications to the configured ceiling.
pub struct NotificationCleanupJob {
    /// Notification repository.
    notifications: Arc<NotificationRepository>,
    /// Read rows older than this many days are deleted.
    retention_days: i64,
    /// Per-user row ceiling; oldest rows beyond it are trimmed.
    max_stored_per_user: i64,
}

impl NotificationCleanupJob {
    /// Creates a new notification cleanup job.
    pub fn new(
        notifications: Arc<NotificationRepository>,
        retention_days: i64,
        max_stored_per_user: i64,
    ) -> Self {
        Self {
            notifications,
            retention_days,
            max_stored_per_user,
        }
    }

    /// Runs one cleanup pass. Returns (expired deleted, overflow trimmed).
    pub async fn run(&self) -> AppResult<(u64, u64)> {
        let cutoff = Utc::now() - Duration::days(self.retention_days);

        let expired = self.notifications.cleanup_read_older_than(cutoff).await?;
        let trimmed = self
            .notifications
            .trim_per_user(self.max_stored_per_user)
            .await?;

        info!(
            expired,
            trimmed,
            retention_days = self.retention_days,
            "Notification cleanup finished"
        );
        Ok((expired, trimmed))
    }
}

/// Deletes sessions whose refresh token has expired. Revoked sessions
/// are kept until expiry so token reuse stays detectable.
pub struct SessionCleanupJob {
    /// Session repository.
    sessions: Arc<SessionRepository>,
}

impl SessionCleanupJob {
    /// Creates a new session cleanup job.
    pub fn new(sessions: Arc<SessionRepository>) -> Self {
        Self { sessions }
    }

    /// Runs one cleanup pass. Returns the number of sessions deleted.
    pub async fn run(&self) -> AppResult<u64> {
        let deleted = self.sessions.delete_expired().await?;
        if deleted > 0 {
            info!(deleted, "Expired sessions removed");
        }
        Ok(deleted)
    }
}
