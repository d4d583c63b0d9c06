//! Calendar event handlers.
//!
//! Events carry no notification side effects on the server. Clients
//! synthesize calendar feed entries locally from the event list.

use axum::Json;
use axum::extract::{Path, Query, State};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_entity::event::model::{CalendarEvent, UpdateEvent};
use taskhub_service::event::service::CreateEventRequest as SvcCreateEvent;

use crate::dto::request::{CreateEventRequest, UpdateEventRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// Optional time range for the event list.
#[derive(Debug, Deserialize)]
pub struct EventRangeQuery {
    /// Range start (inclusive).
    pub from: Option<DateTime<Utc>>,
    /// Range end (inclusive).
    pub to: Option<DateTime<Utc>>,
}

/// GET /api/events
pub async fn list_events(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(range): Query<EventRangeQuery>,
) -> Result<Json<ApiResponse<Vec<CalendarEvent>>>, ApiError> {
    let events = state
        .event_service
        .list(&auth, range.from, range.to)
        .await?;
    Ok(Json(ApiResponse::ok(events)))
}

/// GET /api/events/{id}
pub async fn get_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<CalendarEvent>>, ApiError> {
    let event = state.event_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(event)))
}

/// POST /api/events
pub async fn create_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateEventRequest>,
) -> Result<Json<ApiResponse<CalendarEvent>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    // An omitted end marks an instant event.
    let end_time = req.end_time.unwrap_or(req.start_time);

    let event = state
        .event_service
        .create(
            &auth,
            SvcCreateEvent {
                title: req.title,
                description: req.description,
                start_time: req.start_time,
                end_time,
                all_day: req.all_day,
                task_id: req.task_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(event)))
}

/// PUT /api/events/{id}
pub async fn update_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateEventRequest>,
) -> Result<Json<ApiResponse<CalendarEvent>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let event = state
        .event_service
        .update(
            &auth,
            id,
            UpdateEvent {
                title: req.title,
                description: req.description,
                start_time: req.start_time,
                end_time: req.end_time,
                all_day: req.all_day,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(event)))
}

/// DELETE /api/events/{id}
pub async fn delete_event(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.event_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::with_message((), "Event deleted")))
}
