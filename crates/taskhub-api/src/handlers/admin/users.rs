//! Admin user management handlers.

use axum::extract::{Path, Query, State};
use axum::Json;
use uuid::Uuid;
use validator::Validate;

use taskhub_core::error::AppError;
use taskhub_core::types::pagination::PageResponse;
use taskhub_entity::user::User;
use taskhub_service::user::admin::{
    AdminUpdateUserRequest as SvcUpdateUser, CreateUserRequest as SvcCreateUser,
};

use crate::dto::request::{CreateUserRequest, ResetPasswordRequest, UpdateUserRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

/// GET /api/admin/users
pub async fn list_users(
    State(state): State<AppState>,
    auth: AuthUser,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<User>>>, ApiError> {
    let page = state
        .admin_user_service
        .list(&auth, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(page)))
}

/// GET /api/admin/users/{id}
pub async fn get_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state.admin_user_service.get(&auth, id).await?;
    Ok(Json(ApiResponse::ok(user)))
}

/// POST /api/admin/users
pub async fn create_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    let user = state
        .admin_user_service
        .create(
            &auth,
            SvcCreateUser {
                username: req.username,
                email: req.email,
                password: req.password,
                display_name: req.display_name,
                role: req.role,
            },
        )
        .await?;

    Ok(Json(ApiResponse::with_message(user, "User created")))
}

/// PUT /api/admin/users/{id}
pub async fn update_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<UpdateUserRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .admin_user_service
        .update(
            &auth,
            id,
            SvcUpdateUser {
                email: req.email,
                display_name: req.display_name,
                role: req.role,
                status: req.status,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(user)))
}

/// DELETE /api/admin/users/{id}
pub async fn delete_user(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.admin_user_service.delete(&auth, id).await?;
    Ok(Json(ApiResponse::with_message((), "User deleted")))
}

/// PUT /api/admin/users/{id}/password
pub async fn reset_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Json(req): Json<ResetPasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    req.validate()
        .map_err(|e| AppError::validation(e.to_string()))?;

    state
        .admin_user_service
        .reset_password(&auth, id, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::with_message((), "Password reset")))
}
