//! Calendar event CRUD.
//!
//! Events never create server-side notifications. Clients synthesize
//! `calendar_event` feed items from the event list and track their read
//! state locally, so the server's only job is CRUD and range queries.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::info;
use uuid::Uuid;

use taskhub_auth::AccessPolicy;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_database::repositories::{EventRepository, TaskRepository};
use taskhub_entity::event::model::{CreateEvent, UpdateEvent};
use taskhub_entity::event::CalendarEvent;

use crate::context::RequestContext;

/// Handles shared calendar events.
#[derive(Debug, Clone)]
pub struct EventService {
    /// Event repository.
    events: Arc<EventRepository>,
    /// Task repository, for validating linked tasks.
    tasks: Arc<TaskRepository>,
    /// Access policy.
    access: AccessPolicy,
}

/// Request to create a new event. The creator is the current user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateEventRequest {
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
    /// Linked task (optional).
    pub task_id: Option<Uuid>,
}

impl EventService {
    /// Creates a new event service.
    pub fn new(
        events: Arc<EventRepository>,
        tasks: Arc<TaskRepository>,
        access: AccessPolicy,
    ) -> Self {
        Self {
            events,
            tasks,
            access,
        }
    }

    /// Lists events overlapping the given range. The calendar is shared:
    /// every authenticated user sees every event.
    pub async fn list(
        &self,
        _ctx: &RequestContext,
        from: Option<DateTime<Utc>>,
        to: Option<DateTime<Utc>>,
    ) -> AppResult<Vec<CalendarEvent>> {
        if let (Some(from), Some(to)) = (from, to) {
            if to < from {
                return Err(AppError::validation("Range end is before its start"));
            }
        }
        self.events.find_in_range(from, to).await
    }

    /// Gets a single event.
    pub async fn get(&self, _ctx: &RequestContext, event_id: Uuid) -> AppResult<CalendarEvent> {
        self.find_event(event_id).await
    }

    /// Creates an event.
    pub async fn create(
        &self,
        ctx: &RequestContext,
        req: CreateEventRequest,
    ) -> AppResult<CalendarEvent> {
        if req.title.trim().is_empty() {
            return Err(AppError::validation("Event title cannot be empty"));
        }
        if req.end_time < req.start_time {
            return Err(AppError::validation("Event ends before it starts"));
        }
        if let Some(task_id) = req.task_id {
            self.tasks
                .find_by_id(task_id)
                .await?
                .ok_or_else(|| AppError::not_found("Linked task not found"))?;
        }

        let event = self
            .events
            .create(&CreateEvent {
                title: req.title.trim().to_string(),
                description: req.description,
                start_time: req.start_time,
                end_time: req.end_time,
                all_day: req.all_day,
                created_by: ctx.user_id(),
                task_id: req.task_id,
            })
            .await?;

        info!(event_id = %event.id, creator = %ctx.user_id(), "Event created");
        Ok(event)
    }

    /// Updates an event. Creator or admin only. The patched times must
    /// still form a valid range.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        event_id: Uuid,
        data: UpdateEvent,
    ) -> AppResult<CalendarEvent> {
        let event = self.find_event(event_id).await?;
        self.access.require_event_manage(&ctx.user, &event)?;

        if let Some(ref title) = data.title {
            if title.trim().is_empty() {
                return Err(AppError::validation("Event title cannot be empty"));
            }
        }

        let start = data.start_time.unwrap_or(event.start_time);
        let end = data.end_time.unwrap_or(event.end_time);
        if end < start {
            return Err(AppError::validation("Event ends before it starts"));
        }

        let updated = self.events.update(event_id, &data).await?;
        info!(event_id = %event_id, actor = %ctx.user_id(), "Event updated");
        Ok(updated)
    }

    /// Deletes an event. Creator or admin only.
    pub async fn delete(&self, ctx: &RequestContext, event_id: Uuid) -> AppResult<()> {
        let event = self.find_event(event_id).await?;
        self.access.require_event_manage(&ctx.user, &event)?;

        if !self.events.delete(event_id).await? {
            return Err(AppError::not_found("Event not found"));
        }

        info!(event_id = %event_id, actor = %ctx.user_id(), "Event deleted");
        Ok(())
    }

    async fn find_event(&self, event_id: Uuid) -> AppResult<CalendarEvent> {
        self.events
            .find_by_id(event_id)
            .await?
            .ok_or_else(|| AppError::not_found("Event not found"))
    }
}
