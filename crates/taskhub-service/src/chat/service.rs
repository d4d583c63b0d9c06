//! Conversations and messaging.
//!
//! Message delivery is split by presence: online members get the message
//! pushed over their WebSocket, offline members get a stored
//! `message_new` notification to find on their next login. Storing both
//! would show online users the same message twice.

use std::sync::Arc;

use bytes::Bytes;
use tracing::info;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::storage::{ByteStream, StorageProvider};
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::{ChatRepository, UserRepository};
use taskhub_entity::chat::message::{ChatMessage, CreateChatMessage};
use taskhub_entity::chat::{Conversation, ConversationKind, ConversationSummary};
use taskhub_realtime::NotificationDispatcher;
use taskhub_storage::{paths, UploadPolicy};

use crate::context::RequestContext;
use crate::notification::NotificationRules;

/// Handles conversations, messages, and chat attachments.
#[derive(Debug, Clone)]
pub struct ChatService {
    /// Chat repository.
    chats: Arc<ChatRepository>,
    /// User repository, for member validation.
    users: Arc<UserRepository>,
    /// Storage provider for attachments.
    storage: Arc<dyn StorageProvider>,
    /// Upload validation policy.
    policy: UploadPolicy,
    /// Notification emission rules.
    rules: NotificationRules,
    /// Realtime dispatcher.
    dispatcher: Arc<NotificationDispatcher>,
}

/// Request to start a conversation. The current user is always included
/// as a member.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateConversationRequest {
    /// Direct or group.
    pub kind: ConversationKind,
    /// Group name; ignored for direct conversations.
    pub name: Option<String>,
    /// Members to include.
    pub member_ids: Vec<Uuid>,
}

/// An attachment carried by an outgoing message.
#[derive(Debug, Clone)]
pub struct MessageAttachment {
    /// Original file name.
    pub file_name: String,
    /// File contents.
    pub data: Bytes,
}

impl ChatService {
    /// Creates a new chat service.
    pub fn new(
        chats: Arc<ChatRepository>,
        users: Arc<UserRepository>,
        storage: Arc<dyn StorageProvider>,
        policy: UploadPolicy,
        rules: NotificationRules,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            chats,
            users,
            storage,
            policy,
            rules,
            dispatcher,
        }
    }

    /// Lists the current user's conversations with last message and
    /// unread count.
    pub async fn conversations(&self, ctx: &RequestContext) -> AppResult<Vec<ConversationSummary>> {
        self.chats.summaries_for_user(ctx.user_id()).await
    }

    /// Starts a conversation. Direct conversations are deduplicated: if
    /// one already exists between the two users it is returned as-is.
    pub async fn create_conversation(
        &self,
        ctx: &RequestContext,
        req: CreateConversationRequest,
    ) -> AppResult<Conversation> {
        let mut member_ids = req.member_ids;
        if !member_ids.contains(&ctx.user_id()) {
            member_ids.push(ctx.user_id());
        }
        member_ids.sort();
        member_ids.dedup();

        let found = self.users.find_by_ids(&member_ids).await?;
        if found.len() != member_ids.len() {
            return Err(AppError::not_found("One or more members do not exist"));
        }

        match req.kind {
            ConversationKind::Direct => {
                if member_ids.len() != 2 {
                    return Err(AppError::validation(
                        "A direct conversation has exactly two members",
                    ));
                }
                let other = member_ids
                    .iter()
                    .copied()
                    .find(|id| *id != ctx.user_id())
                    .ok_or_else(|| {
                        AppError::validation("A direct conversation needs another user")
                    })?;

                if let Some(existing) =
                    self.chats.find_direct_between(ctx.user_id(), other).await?
                {
                    return Ok(existing);
                }

                let conversation = self
                    .chats
                    .create_conversation(ConversationKind::Direct, None, ctx.user_id(), &member_ids)
                    .await?;
                info!(conversation_id = %conversation.id, "Direct conversation created");
                Ok(conversation)
            }
            ConversationKind::Group => {
                let name = req
                    .name
                    .as_deref()
                    .map(str::trim)
                    .filter(|n| !n.is_empty())
                    .ok_or_else(|| AppError::validation("A group conversation needs a name"))?;
                if member_ids.len() < 2 {
                    return Err(AppError::validation(
                        "A group conversation needs at least two members",
                    ));
                }

                let conversation = self
                    .chats
                    .create_conversation(
                        ConversationKind::Group,
                        Some(name),
                        ctx.user_id(),
                        &member_ids,
                    )
                    .await?;
                info!(
                    conversation_id = %conversation.id,
                    members = member_ids.len(),
                    "Group conversation created"
                );
                Ok(conversation)
            }
        }
    }

    /// Sends a message, optionally with one attachment. Online members
    /// receive it live; offline members get a stored notification.
    pub async fn send_message(
        &self,
        ctx: &RequestContext,
        conversation_id: Uuid,
        body: &str,
        attachment: Option<MessageAttachment>,
    ) -> AppResult<ChatMessage> {
        self.require_member(ctx, conversation_id).await?;

        if body.trim().is_empty() && attachment.is_none() {
            return Err(AppError::validation("Message cannot be empty"));
        }

        let mut attachment_path = None;
        let mut attachment_name = None;
        let mut attachment_mime = None;

        if let Some(upload) = attachment {
            let validated = self
                .policy
                .validate_chat_attachment(&upload.file_name, &upload.data)?;
            let path = paths::chat_attachment_path(conversation_id, &validated.file_name);
            self.storage.write(&path, upload.data).await?;

            attachment_path = Some(path);
            attachment_name = Some(validated.file_name);
            attachment_mime = Some(validated.mime_type);
        }

        let message = self
            .chats
            .create_message(&CreateChatMessage {
                conversation_id,
                sender_id: ctx.user_id(),
                body: body.trim().to_string(),
                attachment_path,
                attachment_name,
                attachment_mime,
            })
            .await?;

        // The sender has obviously seen the conversation up to now.
        self.chats.mark_read(conversation_id, ctx.user_id()).await?;

        let members = self.chats.members(conversation_id).await?;
        let member_ids: Vec<Uuid> = members.iter().map(|m| m.user_id).collect();

        self.dispatcher.push_chat_message(&member_ids, &message);
        for member_id in member_ids {
            if member_id == ctx.user_id() {
                continue;
            }
            self.dispatcher
                .dispatch_if_offline(self.rules.message_new(member_id, &message, &ctx.user))
                .await;
        }

        info!(
            conversation_id = %conversation_id,
            message_id = %message.id,
            has_attachment = message.has_attachment(),
            "Message sent"
        );
        Ok(message)
    }

    /// Lists messages in a conversation, newest first.
    pub async fn messages(
        &self,
        ctx: &RequestContext,
        conversation_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>> {
        self.require_member(ctx, conversation_id).await?;
        self.chats.messages_page(conversation_id, page).await
    }

    /// Moves the current user's read marker to now.
    pub async fn mark_read(&self, ctx: &RequestContext, conversation_id: Uuid) -> AppResult<()> {
        self.require_member(ctx, conversation_id).await?;
        self.chats.mark_read(conversation_id, ctx.user_id()).await
    }

    /// Opens a message's attachment for download.
    pub async fn download_attachment(
        &self,
        ctx: &RequestContext,
        conversation_id: Uuid,
        message_id: Uuid,
    ) -> AppResult<(ChatMessage, ByteStream)> {
        self.require_member(ctx, conversation_id).await?;

        let message = self
            .chats
            .find_message(message_id)
            .await?
            .filter(|m| m.conversation_id == conversation_id)
            .ok_or_else(|| AppError::not_found("Message not found"))?;

        let path = message
            .attachment_path
            .clone()
            .ok_or_else(|| AppError::not_found("Message has no attachment"))?;

        let stream = self.storage.read(&path).await?;
        Ok((message, stream))
    }

    async fn require_member(&self, ctx: &RequestContext, conversation_id: Uuid) -> AppResult<()> {
        self.chats
            .member(conversation_id, ctx.user_id())
            .await?
            .ok_or_else(|| {
                AppError::authorization("You are not a member of this conversation")
            })?;
        Ok(())
    }
}
