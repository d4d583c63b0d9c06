//! Project handlers — CRUD and membership.

use axum::Json;
use axum::extract::{Path, Query, State};
use uuid::Uuid;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_core::types::pagination::PageResponse;
use taskhub_entity::project::model::{Project, UpdateProject};
use taskhub_entity::user::User;
use taskhub_service::project::service::CreateProjectRequest as SvcCreateProject;

use crate::dto::request::{AddMemberRequest, CreateProjectRequest, UpdateProjectRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/projects
pub async fn list_projects(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<Project>>>, ApiError> {
    let projects = state
        .project_service
        .list(&auth, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(projects)))
}

/// GET /api/projects/{id}
pub async fn get_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    let project = state.project_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(project)))
}

/// POST /api/projects
pub async fn create_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let project = state
        .project_service
        .create(
            &auth,
            SvcCreateProject {
                name: req.name,
                description: req.description,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(project)))
}

/// PUT /api/projects/{id}
pub async fn update_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateProjectRequest>,
) -> Result<Json<ApiResponse<Project>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let project = state
        .project_service
        .update(
            &auth,
            id,
            UpdateProject {
                name: req.name,
                description: req.description,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(project)))
}

/// DELETE /api/projects/{id}
pub async fn delete_project(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.project_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::with_message((), "Project deleted")))
}

/// GET /api/projects/{id}/members
pub async fn list_members(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<Vec<User>>>, ApiError> {
    let members = state.project_service.members(&auth, id).await?;
    Ok(Json(ApiResponse::ok(members)))
}

/// POST /api/projects/{id}/members
pub async fn add_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<AddMemberRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .project_service
        .add_member(&auth, id, req.user_id)
        .await?;
    Ok(Json(ApiResponse::with_message((), "Member added")))
}

/// DELETE /api/projects/{id}/members/{user_id}
pub async fn remove_member(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, user_id)): Path<(Uuid, Uuid)>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .project_service
        .remove_member(&auth, id, user_id)
        .await?;
    Ok(Json(ApiResponse::with_message((), "Member removed")))
}
