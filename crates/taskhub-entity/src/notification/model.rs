//! Notification entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::kind::NotificationKind;

/// A notification delivered to a user.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Notification {
    /// Unique notification identifier.
    pub id: Uuid,
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Notification title.
    pub title: String,
    /// Notification body text.
    pub body: String,
    /// Whether the user has read this notification.
    pub is_read: bool,
    /// When the notification was read.
    pub read_at: Option<DateTime<Utc>>,
    /// The user whose action triggered this notification (if any).
    pub actor_id: Option<Uuid>,
    /// Related task (if any).
    pub task_id: Option<Uuid>,
    /// Related conversation (if any).
    pub conversation_id: Option<Uuid>,
    /// Related calendar event (if any).
    pub event_id: Option<Uuid>,
    /// When the notification was created.
    pub created_at: DateTime<Utc>,
}

impl Notification {
    /// Check if the notification has not been read yet.
    pub fn is_unread(&self) -> bool {
        !self.is_read
    }
}

/// Data required to persist a new notification.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateNotification {
    /// The recipient user.
    pub user_id: Uuid,
    /// Notification kind.
    pub kind: NotificationKind,
    /// Title.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Triggering user (optional).
    pub actor_id: Option<Uuid>,
    /// Related task (optional).
    pub task_id: Option<Uuid>,
    /// Related conversation (optional).
    pub conversation_id: Option<Uuid>,
    /// Related calendar event (optional).
    pub event_id: Option<Uuid>,
}
