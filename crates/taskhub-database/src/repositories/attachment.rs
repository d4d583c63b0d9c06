//! Task attachment repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::task::attachment::{CreateTaskAttachment, TaskAttachment};

/// Repository for task attachment rows.
#[derive(Debug, Clone)]
pub struct AttachmentRepository {
    pool: PgPool,
}

impl AttachmentRepository {
    /// Create a new attachment repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Record a new attachment.
    pub async fn create(&self, data: &CreateTaskAttachment) -> AppResult<TaskAttachment> {
        sqlx::query_as::<_, TaskAttachment>(
            "INSERT INTO task_attachments (task_id, file_name, mime_type, size_bytes, storage_path, uploaded_by) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.task_id)
        .bind(&data.file_name)
        .bind(&data.mime_type)
        .bind(data.size_bytes)
        .bind(&data.storage_path)
        .bind(data.uploaded_by)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create attachment", e))
    }

    /// Find an attachment by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<TaskAttachment>> {
        sqlx::query_as::<_, TaskAttachment>("SELECT * FROM task_attachments WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find attachment", e))
    }

    /// List attachments for a task, oldest first.
    pub async fn find_by_task(&self, task_id: Uuid) -> AppResult<Vec<TaskAttachment>> {
        sqlx::query_as::<_, TaskAttachment>(
            "SELECT * FROM task_attachments WHERE task_id = $1 ORDER BY created_at ASC",
        )
        .bind(task_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list attachments", e))
    }

    /// Count attachments on a task.
    pub async fn count_by_task(&self, task_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar("SELECT COUNT(*) FROM task_attachments WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to count attachments", e)
            })
    }

    /// Delete an attachment row, returning it for storage cleanup.
    pub async fn delete(&self, id: Uuid) -> AppResult<Option<TaskAttachment>> {
        sqlx::query_as::<_, TaskAttachment>(
            "DELETE FROM task_attachments WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete attachment", e))
    }
}
