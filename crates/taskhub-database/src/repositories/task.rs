//! Task repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_entity::task::model::{CreateTask, UpdateTask};
use taskhub_entity::task::{Task, TaskStatus};

/// Filters for task list queries. `None` fields are not applied.
#[derive(Debug, Clone, Default)]
pub struct TaskFilter {
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user.
    pub assignee_id: Option<Uuid>,
    /// Only tasks in this project.
    pub project_id: Option<Uuid>,
    /// Only tasks this user created or is assigned to. Set for non-admins.
    pub involving: Option<Uuid>,
}

/// Repository for task CRUD and query operations.
#[derive(Debug, Clone)]
pub struct TaskRepository {
    pool: PgPool,
}

impl TaskRepository {
    /// Create a new task repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find a task by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Task>> {
        sqlx::query_as::<_, Task>("SELECT * FROM tasks WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find task", e))
    }

    /// List tasks matching the filter, newest first.
    pub async fn find_page(
        &self,
        filter: &TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        const WHERE_CLAUSE: &str = "($1::task_status IS NULL OR status = $1) \
             AND ($2::uuid IS NULL OR assignee_id = $2) \
             AND ($3::uuid IS NULL OR project_id = $3) \
             AND ($4::uuid IS NULL OR creator_id = $4 OR assignee_id = $4)";

        let total: i64 = sqlx::query_scalar(&format!(
            "SELECT COUNT(*) FROM tasks WHERE {WHERE_CLAUSE}"
        ))
        .bind(filter.status)
        .bind(filter.assignee_id)
        .bind(filter.project_id)
        .bind(filter.involving)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tasks", e))?;

        let tasks = sqlx::query_as::<_, Task>(&format!(
            "SELECT * FROM tasks WHERE {WHERE_CLAUSE} ORDER BY created_at DESC LIMIT $5 OFFSET $6"
        ))
        .bind(filter.status)
        .bind(filter.assignee_id)
        .bind(filter.project_id)
        .bind(filter.involving)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list tasks", e))?;

        Ok(PageResponse::new(
            tasks,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Create a new task.
    pub async fn create(&self, data: &CreateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "INSERT INTO tasks (project_id, title, description, priority, assignee_id, creator_id, due_date) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(data.project_id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.assignee_id)
        .bind(data.creator_id)
        .bind(data.due_date)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create task", e))
    }

    /// Update a task's fields. Double-optional fields distinguish
    /// "leave unchanged" from "clear".
    pub async fn update(&self, id: Uuid, data: &UpdateTask) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                priority = COALESCE($4, priority), \
                assignee_id = CASE WHEN $5 THEN $6 ELSE assignee_id END, \
                due_date = CASE WHEN $7 THEN $8 ELSE due_date END, \
                project_id = CASE WHEN $9 THEN $10 ELSE project_id END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.priority)
        .bind(data.assignee_id.is_some())
        .bind(data.assignee_id.flatten())
        .bind(data.due_date.is_some())
        .bind(data.due_date.flatten())
        .bind(data.project_id.is_some())
        .bind(data.project_id.flatten())
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update task", e))
    }

    /// Transition a task's status. Completing sets `completed_at`;
    /// leaving the completed state clears it.
    pub async fn set_status(&self, id: Uuid, status: TaskStatus) -> AppResult<Task> {
        sqlx::query_as::<_, Task>(
            "UPDATE tasks SET \
                status = $2, \
                completed_at = CASE WHEN $2 = 'completed'::task_status THEN NOW() ELSE NULL END, \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(status)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to set task status", e))
    }

    /// Delete a task.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM tasks WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete task", e))?;
        Ok(result.rows_affected() > 0)
    }

    /// Count tasks by status, optionally scoped to tasks involving a user.
    pub async fn count_by_status(
        &self,
        status: TaskStatus,
        involving: Option<Uuid>,
    ) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks WHERE status = $1 \
             AND ($2::uuid IS NULL OR creator_id = $2 OR assignee_id = $2)",
        )
        .bind(status)
        .bind(involving)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count tasks", e))
    }

    /// Count open tasks past their due date.
    pub async fn count_overdue(&self, involving: Option<Uuid>) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM tasks \
             WHERE status IN ('pending', 'in_progress') AND due_date < NOW() \
             AND ($1::uuid IS NULL OR creator_id = $1 OR assignee_id = $1)",
        )
        .bind(involving)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count overdue tasks", e))
    }

    /// Find open, assigned tasks due within the given window.
    ///
    /// Used by the deadline reminder job.
    pub async fn find_due_between(
        &self,
        from: DateTime<Utc>,
        to: DateTime<Utc>,
    ) -> AppResult<Vec<Task>> {
        sqlx::query_as::<_, Task>(
            "SELECT * FROM tasks \
             WHERE status IN ('pending', 'in_progress') \
             AND assignee_id IS NOT NULL \
             AND due_date >= $1 AND due_date <= $2 \
             ORDER BY due_date ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find due tasks", e))
    }
}
