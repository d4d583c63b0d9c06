//! Progress report entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A progress report submitted against a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Report {
    /// Unique report identifier.
    pub id: Uuid,
    /// The task this report is about.
    pub task_id: Uuid,
    /// The user who wrote the report.
    pub author_id: Uuid,
    /// Report text.
    pub content: String,
    /// When the report was submitted.
    pub created_at: DateTime<Utc>,
}
