//! Task handlers — CRUD, status transitions, attachments, reports.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, Query, State};
use axum::http::header;
use axum::response::Response;
use serde::Deserialize;
use uuid::Uuid;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::task::TaskFilter;
use taskhub_entity::report::model::Report;
use taskhub_entity::task::attachment::TaskAttachment;
use taskhub_entity::task::model::{Task, UpdateTask};
use taskhub_entity::task::TaskStatus;
use taskhub_service::task::service::CreateTaskRequest as SvcCreateTask;

use crate::dto::request::{
    CreateReportRequest, CreateTaskRequest, SetStatusRequest, UpdateTaskRequest,
};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

use super::user::read_file_field;

/// Filter and pagination query for the task list.
#[derive(Debug, Deserialize)]
pub struct TaskListQuery {
    /// Only tasks with this status.
    pub status: Option<TaskStatus>,
    /// Only tasks assigned to this user.
    pub assignee_id: Option<Uuid>,
    /// Only tasks in this project.
    pub project_id: Option<Uuid>,
    /// Page number (1-based).
    #[serde(default = "default_page")]
    pub page: u64,
    /// Items per page.
    #[serde(default = "default_page_size")]
    pub page_size: u64,
}

fn default_page() -> u64 {
    1
}

fn default_page_size() -> u64 {
    25
}

/// GET /api/tasks
pub async fn list_tasks(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(query): Query<TaskListQuery>,
) -> Result<Json<ApiResponse<PageResponse<Task>>>, ApiError> {
    let filter = TaskFilter {
        status: query.status,
        assignee_id: query.assignee_id,
        project_id: query.project_id,
        involving: None,
    };
    let page = PageRequest::new(query.page, query.page_size);

    let tasks = state.task_service.list(&auth, filter, &page).await?;
    Ok(Json(ApiResponse::ok(tasks)))
}

/// GET /api/tasks/{id}
pub async fn get_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// POST /api/tasks
pub async fn create_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let task = state
        .task_service
        .create(
            &auth,
            SvcCreateTask {
                project_id: req.project_id,
                title: req.title,
                description: req.description,
                priority: req.priority,
                assignee_id: req.assignee_id,
                due_date: req.due_date,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(task)))
}

/// PUT /api/tasks/{id}
pub async fn update_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateTaskRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let task = state
        .task_service
        .update(
            &auth,
            id,
            UpdateTask {
                title: req.title,
                description: req.description,
                priority: req.priority,
                assignee_id: req.assignee_id,
                due_date: req.due_date,
                project_id: req.project_id,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(task)))
}

/// PUT /api/tasks/{id}/status
pub async fn set_task_status(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<SetStatusRequest>,
) -> Result<Json<ApiResponse<Task>>, ApiError> {
    let task = state.task_service.set_status(&auth, id, req.status).await?;
    Ok(Json(ApiResponse::ok(task)))
}

/// DELETE /api/tasks/{id}
pub async fn delete_task(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.task_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::with_message((), "Task deleted")))
}

/// POST /api/tasks/{id}/attachments — multipart upload
pub async fn upload_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    multipart: Multipart,
) -> Result<Json<ApiResponse<TaskAttachment>>, ApiError> {
    let (file_name, data) = read_file_field(multipart).await?;
    let attachment = state
        .attachment_service
        .upload(&auth, id, &file_name, data)
        .await?;
    Ok(Json(ApiResponse::ok(attachment)))
}

/// GET /api/tasks/{id}/attachments
pub async fn list_attachments(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<TaskAttachment>>>, ApiError> {
    let attachments = state.attachment_service.list(&auth, id).await?;
    Ok(Json(ApiResponse::ok(attachments)))
}

/// GET /api/tasks/{id}/attachments/{attachment_id}/download
pub async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let (attachment, stream) = state
        .attachment_service
        .download(&auth, task_id, attachment_id)
        .await?;

    let response = Response::builder()
        .header(header::CONTENT_TYPE, attachment.mime_type)
        .header(
            header::CONTENT_DISPOSITION,
            content_disposition(&attachment.file_name),
        )
        .header(header::CONTENT_LENGTH, attachment.size_bytes)
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// DELETE /api/tasks/{id}/attachments/{attachment_id}
pub async fn delete_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((task_id, attachment_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .attachment_service
        .delete(&auth, task_id, attachment_id)
        .await?;
    Ok(Json(ApiResponse::with_message((), "Attachment deleted")))
}

/// POST /api/tasks/{id}/reports
pub async fn add_report(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<CreateReportRequest>,
) -> Result<Json<ApiResponse<Report>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let report = state.report_service.add(&auth, id, &req.content).await?;
    Ok(Json(ApiResponse::ok(report)))
}

/// GET /api/tasks/{id}/reports
pub async fn list_reports(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Report>>>, ApiError> {
    let reports = state
        .report_service
        .list(&auth, id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(reports)))
}

/// Quotes a file name for a Content-Disposition header.
pub(crate) fn content_disposition(file_name: &str) -> String {
    let safe = file_name.replace(['"', '\r', '\n'], "_");
    format!("attachment; filename=\"{safe}\"")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_content_disposition_strips_quotes() {
        assert_eq!(
            content_disposition(r#"we"ird.pdf"#),
            r#"attachment; filename="we_ird.pdf""#
        );
    }
}
