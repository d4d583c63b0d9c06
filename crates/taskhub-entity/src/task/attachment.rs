//! Task attachment entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A file attached to a task.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct TaskAttachment {
    /// Unique attachment identifier.
    pub id: Uuid,
    /// The task this file is attached to.
    pub task_id: Uuid,
    /// Original file name as uploaded.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Path within the storage provider.
    pub storage_path: String,
    /// The user who uploaded the file.
    pub uploaded_by: Uuid,
    /// When the attachment was uploaded.
    pub created_at: DateTime<Utc>,
}

/// Data required to record a new attachment.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateTaskAttachment {
    /// The task to attach to.
    pub task_id: Uuid,
    /// Original file name.
    pub file_name: String,
    /// Declared MIME type.
    pub mime_type: String,
    /// File size in bytes.
    pub size_bytes: i64,
    /// Path within the storage provider.
    pub storage_path: String,
    /// Uploading user.
    pub uploaded_by: Uuid,
}
