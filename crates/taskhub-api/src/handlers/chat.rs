//! Chat handlers — conversations, messages, attachments.

use axum::body::Body;
use axum::extract::{Multipart, Path, Query, Request, State};
use axum::http::header;
use axum::response::Response;
use axum::{Json, RequestExt};
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::types::pagination::PageResponse;
use taskhub_entity::chat::{ChatMessage, Conversation, ConversationSummary};
use taskhub_service::chat::service::{
    CreateConversationRequest as SvcCreateConversation, MessageAttachment,
};

use crate::dto::request::{CreateConversationRequest, SendMessageRequest};
use crate::dto::response::ApiResponse;
use crate::error::ApiError;
use crate::extractors::{AuthUser, PaginationParams};
use crate::state::AppState;

use super::task::content_disposition;

/// GET /api/conversations
pub async fn list_conversations(
    State(state): State<AppState>,
    auth: AuthUser,
) -> Result<Json<ApiResponse<Vec<ConversationSummary>>>, ApiError> {
    let conversations = state.chat_service.conversations(&auth).await?;
    Ok(Json(ApiResponse::ok(conversations)))
}

/// POST /api/conversations
pub async fn create_conversation(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(req): Json<CreateConversationRequest>,
) -> Result<Json<ApiResponse<Conversation>>, ApiError> {
    let conversation = state
        .chat_service
        .create_conversation(
            &auth,
            SvcCreateConversation {
                kind: req.kind,
                name: req.name,
                member_ids: req.member_ids,
            },
        )
        .await?;

    Ok(Json(ApiResponse::ok(conversation)))
}

/// GET /api/conversations/{id}/messages
pub async fn list_messages(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    Query(params): Query<PaginationParams>,
) -> Result<Json<ApiResponse<PageResponse<ChatMessage>>>, ApiError> {
    let messages = state
        .chat_service
        .messages(&auth, id, &params.into_page_request())
        .await?;
    Ok(Json(ApiResponse::ok(messages)))
}

/// POST /api/conversations/{id}/messages
///
/// Accepts either a JSON `{body}` payload or a multipart form with a
/// `body` text field and one attachment file.
pub async fn send_message(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
    request: Request,
) -> Result<Json<ApiResponse<ChatMessage>>, ApiError> {
    let content_type = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("")
        .to_string();

    let (body, attachment) = if content_type.starts_with("multipart/form-data") {
        let multipart = request
            .extract::<Multipart, _>()
            .await
            .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?;
        read_message_parts(multipart).await?
    } else {
        let Json(req) = request
            .extract::<Json<SendMessageRequest>, _>()
            .await
            .map_err(|e| AppError::validation(format!("Invalid message body: {e}")))?;
        (req.body, None)
    };

    let message = state
        .chat_service
        .send_message(&auth, id, &body, attachment)
        .await?;

    Ok(Json(ApiResponse::ok(message)))
}

/// PUT /api/conversations/{id}/read
pub async fn mark_conversation_read(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<Uuid>,
) -> Result<Json<ApiResponse<()>>, ApiError> {
    state.chat_service.mark_read(&auth, id).await?;
    Ok(Json(ApiResponse::with_message((), "Conversation marked as read")))
}

/// GET /api/conversations/{id}/messages/{message_id}/attachment
pub async fn download_attachment(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((conversation_id, message_id)): Path<(Uuid, Uuid)>,
) -> Result<Response, ApiError> {
    let (message, stream) = state
        .chat_service
        .download_attachment(&auth, conversation_id, message_id)
        .await?;

    let content_type = message
        .attachment_mime
        .unwrap_or_else(|| "application/octet-stream".to_string());
    let file_name = message
        .attachment_name
        .unwrap_or_else(|| "attachment".to_string());

    let response = Response::builder()
        .header(header::CONTENT_TYPE, content_type)
        .header(header::CONTENT_DISPOSITION, content_disposition(&file_name))
        .body(Body::from_stream(stream))
        .map_err(|e| AppError::internal(format!("Response build failed: {e}")))?;

    Ok(response)
}

/// Reads the `body` text field and the attachment file from a
/// multipart message form.
async fn read_message_parts(
    mut multipart: Multipart,
) -> Result<(String, Option<MessageAttachment>), ApiError> {
    let mut body = String::new();
    let mut attachment = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
    {
        let name = field.name().map(String::from);
        let file_name = field.file_name().map(String::from);

        if let Some(file_name) = file_name {
            let data = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read attachment: {e}")))?;
            attachment = Some(MessageAttachment { file_name, data });
        } else if name.as_deref() == Some("body") {
            body = field
                .text()
                .await
                .map_err(|e| AppError::validation(format!("Failed to read body field: {e}")))?;
        }
    }

    Ok((body, attachment))
}
