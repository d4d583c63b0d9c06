//! Calendar event repository implementation.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_entity::event::model::{CalendarEvent, CreateEvent, UpdateEvent};

/// Repository for calendar events.
#[derive(Debug, Clone)]
pub struct EventRepository {
    pool: PgPool,
}

impl EventRepository {
    /// Create a new event repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Find an event by primary key.
    pub async fn find_by_id(&self, id: Uuid) -> AppResult<Option<CalendarEvent>> {
        sqlx::query_as::<_, CalendarEvent>("SELECT * FROM calendar_events WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find event", e))
    }

    /// List events overlapping the given range, start-time ascending.
    /// Both bounds are optional.
    pub async fn find_in_range(
        &self,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<CalendarEvent>> {
        sqlx::query_as::<_, CalendarEvent>(
            "SELECT * FROM calendar_events \
             WHERE ($1::timestamptz IS NULL OR end_time >= $1) \
             AND ($2::timestamptz IS NULL OR start_time <= $2) \
             ORDER BY start_time ASC",
        )
        .bind(from)
        .bind(to)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list events", e))
    }

    /// Create a new event.
    pub async fn create(&self, data: &CreateEvent) -> AppResult<CalendarEvent> {
        sqlx::query_as::<_, CalendarEvent>(
            "INSERT INTO calendar_events (title, description, start_time, end_time, all_day, created_by, task_id) \
             VALUES ($1, $2, $3, $4, $5, $6, $7) RETURNING *",
        )
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.all_day)
        .bind(data.created_by)
        .bind(data.task_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create event", e))
    }

    /// Update an event's fields.
    pub async fn update(&self, id: Uuid, data: &UpdateEvent) -> AppResult<CalendarEvent> {
        sqlx::query_as::<_, CalendarEvent>(
            "UPDATE calendar_events SET \
                title = COALESCE($2, title), \
                description = COALESCE($3, description), \
                start_time = COALESCE($4, start_time), \
                end_time = COALESCE($5, end_time), \
                all_day = COALESCE($6, all_day), \
                updated_at = NOW() \
             WHERE id = $1 RETURNING *",
        )
        .bind(id)
        .bind(&data.title)
        .bind(&data.description)
        .bind(data.start_time)
        .bind(data.end_time)
        .bind(data.all_day)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to update event", e))
    }

    /// Delete an event.
    pub async fn delete(&self, id: Uuid) -> AppResult<bool> {
        let result = sqlx::query("DELETE FROM calendar_events WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to delete event", e))?;
        Ok(result.rows_affected() > 0)
    }
}
