//! Calendar event entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A calendar event.
///
/// Events are stored server-side, but their *read* state as feed items is
/// tracked only by each client; the server never records which events a
/// user has seen.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CalendarEvent {
    /// Unique event identifier.
    pub id: Uuid,
    /// Event title.
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// When the event starts.
    pub start_time: DateTime<Utc>,
    /// When the event ends.
    pub end_time: DateTime<Utc>,
    /// Whether the event spans whole days.
    pub all_day: bool,
    /// The user who created the event.
    pub created_by: Uuid,
    /// Task this event is linked to (if any).
    pub task_id: Option<Uuid>,
    /// When the event was created.
    pub created_at: DateTime<Utc>,
    /// When the event was last updated.
    pub updated_at: DateTime<Utc>,
}

impl CalendarEvent {
    /// Check whether the event lies in the past.
    pub fn is_past(&self, now: DateTime<Utc>) -> bool {
        self.end_time < now
    }

    /// Check whether the event is currently in progress.
    pub fn is_happening(&self, now: DateTime<Utc>) -> bool {
        now >= self.start_time && now <= self.end_time
    }
}

/// Data required to create a new calendar event.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateEvent {
    /// Event title.
    pub title: String,
    /// Description (optional).
    pub description: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time.
    pub end_time: DateTime<Utc>,
    /// Whole-day flag.
    pub all_day: bool,
    /// Creating user.
    pub created_by: Uuid,
    /// Linked task (optional).
    pub task_id: Option<Uuid>,
}

/// Data for updating an existing event. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateEvent {
    /// New title.
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New start time.
    pub start_time: Option<DateTime<Utc>>,
    /// New end time.
    pub end_time: Option<DateTime<Utc>>,
    /// New whole-day flag.
    pub all_day: Option<bool>,
}
