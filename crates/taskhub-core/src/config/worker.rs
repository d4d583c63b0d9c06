//! Background worker configuration.

use serde::{Deserialize, Serialize};

/// Background job worker configuration.
///
/// Job schedules themselves are registered by the worker's cron
/// scheduler; this section tunes what the jobs do.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WorkerConfig {
    /// Whether the worker is enabled.
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// How far ahead of a task's due date deadline reminders fire, in hours.
    #[serde(default = "default_reminder_window")]
    pub deadline_reminder_window_hours: i64,
    /// Read notifications older than this many days are deleted.
    #[serde(default = "default_retention_days")]
    pub notification_retention_days: u32,
    /// Maximum stored notifications per user; older rows beyond this are trimmed.
    #[serde(default = "default_max_stored")]
    pub max_stored_per_user: i64,
}

fn default_true() -> bool {
    true
}

fn default_reminder_window() -> i64 {
    24
}

fn default_retention_days() -> u32 {
    30
}

fn default_max_stored() -> i64 {
    1000
}
