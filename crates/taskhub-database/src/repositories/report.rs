//! Progress report repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_entity::report::Report;

/// Repository for task progress reports.
#[derive(Debug, Clone)]
pub struct ReportRepository {
    pool: PgPool,
}

impl ReportRepository {
    /// Create a new report repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Submit a report against a task.
    pub async fn create(&self, task_id: Uuid, author_id: Uuid, content: &str) -> AppResult<Report> {
        sqlx::query_as::<_, Report>(
            "INSERT INTO reports (task_id, author_id, content) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(task_id)
        .bind(author_id)
        .bind(content)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create report", e))
    }

    /// List reports for a task, newest first.
    pub async fn find_by_task(
        &self,
        task_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Report>> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM reports WHERE task_id = $1")
            .bind(task_id)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count reports", e))?;

        let reports = sqlx::query_as::<_, Report>(
            "SELECT * FROM reports WHERE task_id = $1 ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(task_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list reports", e))?;

        Ok(PageResponse::new(
            reports,
            page.page,
            page.page_size,
            total as u64,
        ))
    }
}
