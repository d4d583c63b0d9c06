//! Notification kind enumeration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Kind of a notification, used for per-kind filtering in client settings.
///
/// `CalendarEvent` never appears in server-stored rows; it is the kind
/// carried by feed items that clients synthesize from calendar events.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "notification_kind", rename_all = "snake_case")]
#[serde(rename_all = "snake_case")]
pub enum NotificationKind {
    /// A task was assigned to the recipient.
    TaskAssigned,
    /// A task the recipient is involved in was updated.
    TaskUpdated,
    /// A task the recipient is involved in was completed.
    TaskCompleted,
    /// A task's due date is approaching.
    DeadlineReminder,
    /// A new chat message arrived while the recipient was offline.
    MessageNew,
    /// A calendar event surfaced as a feed item (client-side only).
    CalendarEvent,
}

impl NotificationKind {
    /// All kinds, in settings display order.
    pub const ALL: [NotificationKind; 6] = [
        Self::TaskAssigned,
        Self::TaskUpdated,
        Self::TaskCompleted,
        Self::DeadlineReminder,
        Self::MessageNew,
        Self::CalendarEvent,
    ];

    /// Check whether this kind is synthesized client-side from calendar events.
    pub fn is_calendar(&self) -> bool {
        matches!(self, Self::CalendarEvent)
    }

    /// Return the kind as a snake_case string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TaskAssigned => "task_assigned",
            Self::TaskUpdated => "task_updated",
            Self::TaskCompleted => "task_completed",
            Self::DeadlineReminder => "deadline_reminder",
            Self::MessageNew => "message_new",
            Self::CalendarEvent => "calendar_event",
        }
    }
}

impl fmt::Display for NotificationKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for NotificationKind {
    type Err = taskhub_core::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "task_assigned" => Ok(Self::TaskAssigned),
            "task_updated" => Ok(Self::TaskUpdated),
            "task_completed" => Ok(Self::TaskCompleted),
            "deadline_reminder" => Ok(Self::DeadlineReminder),
            "message_new" => Ok(Self::MessageNew),
            "calendar_event" => Ok(Self::CalendarEvent),
            _ => Err(taskhub_core::AppError::validation(format!(
                "Invalid notification kind: '{s}'"
            ))),
        }
    }
}
