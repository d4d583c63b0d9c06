//! User self-service handlers — profile, password, avatar.

use axum::Json;
use axum::body::Body;
use axum::extract::{Multipart, Path, State};
use axum::http::header;
use axum::response::Response;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_entity::user::User;
use taskhub_service::user::service::UpdateProfileRequest as SvcUpdateProfile;

use crate::dto::request::{ChangePasswordRequest, UpdateProfileRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::AuthUser;
use crate::state::AppState;

/// GET /api/users/me
pub async fn get_profile(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    Ok(Json(ApiResponse::ok(state.user_service.profile(&auth))))
}

/// PUT /api/users/me
pub async fn update_profile(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<UpdateProfileRequest>,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let user = state
        .user_service
        .update_profile(
            &auth,
            SvcUpdateProfile {
                display_name: req.display_name,
                email: req.email,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(user)))
}

/// PUT /api/users/me/password
pub async fn change_password(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<ChangePasswordRequest>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state
        .user_service
        .change_password(&auth, &req.current_password, &req.new_password)
        .await?;

    Ok(Json(ApiResponse::with_message((), "Password changed")))
}

/// POST /api/users/avatar — multipart image upload
pub async fn upload_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    multipart: Multipart,
) -> Result<Json<ApiResponse<User>>, ApiError> {
    let (file_name, data) = read_file_field(multipart).await?;
    let user = state.user_service.upload_avatar(&auth, &file_name, data).await?;
    Ok(Json(ApiResponse::with_message(user, "Avatar updated")))
}

/// GET /api/users/{id}/avatar
pub async fn download_avatar(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(user_id): Path<Uuid>,
) -> Result<Response, ApiError> {
    let (user, stream) = state.user_service.avatar(&auth, user_id).await?;

    let content_type = user
        .avatar_path
        .as_deref()
        .map(avatar_mime)
        .unwrap_or("application/octet-stream");

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CACHE_CONTROL, "private, max-age=300")
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Pulls the first file out of a multipart body.
pub(crate) async fn read_file_field(
    mut multipart: Multipart,
) -> Result<(String, bytes::Bytes), ApiError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        if field.file_name().is_none() {
            continue;
        }
        let file_name = field
            .file_name()
            .map(String::from)
            .unwrap_or_else(|| "upload".to_string());
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::validation(format!("Failed to read upload: {e}")))?;
        return Ok((file_name, data));
    }

    Err(ApiError(AppError::validation(
        "Request contains no file field",
    )))
}

fn avatar_mime(path: &str) -> &'static str {
    match path.rsplit('.').next() {
        Some("png") => "image/png",
        Some("jpg") | Some("jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("webp") => "image/webp",
        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_avatar_mime_from_extension() {
        assert_eq!(avatar_mime("avatars/u1.png"), "image/png");
        assert_eq!(avatar_mime("avatars/u1.jpeg"), "image/jpeg");
        assert_eq!(avatar_mime("avatars/u1.bin"), "application/octet-stream");
    }
}
