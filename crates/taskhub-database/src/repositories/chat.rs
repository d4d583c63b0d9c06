//! Chat repository implementation.

use sqlx::PgPool;
use uuid::Uuid;

use taskhub_core::error::{AppError, ErrorKind};
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_entity::chat::conversation::{
    Conversation, ConversationKind, ConversationMember, ConversationSummary,
};
use taskhub_entity::chat::message::{ChatMessage, CreateChatMessage};

/// Repository for conversations, membership, and messages.
#[derive(Debug, Clone)]
pub struct ChatRepository {
    pool: PgPool,
}

impl ChatRepository {
    /// Create a new chat repository.
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Create a conversation with its initial members.
    pub async fn create_conversation(
        &self,
        kind: ConversationKind,
        name: Option<&str>,
        created_by: Uuid,
        member_ids: &[Uuid],
    ) -> AppResult<Conversation> {
        let mut tx = self.pool.begin().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to begin transaction", e)
        })?;

        let conversation = sqlx::query_as::<_, Conversation>(
            "INSERT INTO conversations (kind, name, created_by) VALUES ($1, $2, $3) RETURNING *",
        )
        .bind(kind)
        .bind(name)
        .bind(created_by)
        .fetch_one(&mut *tx)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to create conversation", e)
        })?;

        for user_id in member_ids {
            sqlx::query(
                "INSERT INTO conversation_members (conversation_id, user_id) VALUES ($1, $2) \
                 ON CONFLICT (conversation_id, user_id) DO NOTHING",
            )
            .bind(conversation.id)
            .bind(user_id)
            .execute(&mut *tx)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to add member", e))?;
        }

        tx.commit().await.map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to commit transaction", e)
        })?;

        Ok(conversation)
    }

    /// Find a conversation by primary key.
    pub async fn find_conversation(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>("SELECT * FROM conversations WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find conversation", e)
            })
    }

    /// Find an existing direct conversation between two users.
    pub async fn find_direct_between(&self, a: Uuid, b: Uuid) -> AppResult<Option<Conversation>> {
        sqlx::query_as::<_, Conversation>(
            "SELECT c.* FROM conversations c \
             WHERE c.kind = 'direct' \
             AND EXISTS (SELECT 1 FROM conversation_members WHERE conversation_id = c.id AND user_id = $1) \
             AND EXISTS (SELECT 1 FROM conversation_members WHERE conversation_id = c.id AND user_id = $2) \
             LIMIT 1",
        )
        .bind(a)
        .bind(b)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to find direct conversation", e)
        })
    }

    /// Get one member row of a conversation.
    pub async fn member(
        &self,
        conversation_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<Option<ConversationMember>> {
        sqlx::query_as::<_, ConversationMember>(
            "SELECT * FROM conversation_members WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find member", e))
    }

    /// List all members of a conversation.
    pub async fn members(&self, conversation_id: Uuid) -> AppResult<Vec<ConversationMember>> {
        sqlx::query_as::<_, ConversationMember>(
            "SELECT * FROM conversation_members WHERE conversation_id = $1 ORDER BY joined_at ASC",
        )
        .bind(conversation_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list members", e))
    }

    /// Build the conversation list for a user: every conversation they are
    /// a member of, with member IDs, last message, and unread count.
    pub async fn summaries_for_user(&self, user_id: Uuid) -> AppResult<Vec<ConversationSummary>> {
        let conversations = sqlx::query_as::<_, Conversation>(
            "SELECT c.* FROM conversations c \
             JOIN conversation_members m ON m.conversation_id = c.id \
             WHERE m.user_id = $1 \
             ORDER BY c.created_at DESC",
        )
        .bind(user_id)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| {
            AppError::with_source(ErrorKind::Database, "Failed to list conversations", e)
        })?;

        let mut summaries = Vec::with_capacity(conversations.len());
        for conversation in conversations {
            let member_ids: Vec<Uuid> = sqlx::query_scalar(
                "SELECT user_id FROM conversation_members WHERE conversation_id = $1",
            )
            .bind(conversation.id)
            .fetch_all(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to list member ids", e)
            })?;

            let last_message = sqlx::query_as::<_, ChatMessage>(
                "SELECT * FROM chat_messages WHERE conversation_id = $1 \
                 ORDER BY created_at DESC LIMIT 1",
            )
            .bind(conversation.id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| {
                AppError::with_source(ErrorKind::Database, "Failed to find last message", e)
            })?;

            let unread_count = self.unread_count(conversation.id, user_id).await?;

            summaries.push(ConversationSummary {
                conversation,
                member_ids,
                last_message,
                unread_count,
            });
        }

        Ok(summaries)
    }

    /// Count messages in a conversation the member has not read.
    /// The member's own messages never count as unread.
    pub async fn unread_count(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<i64> {
        sqlx::query_scalar(
            "SELECT COUNT(*) FROM chat_messages msg \
             JOIN conversation_members m \
               ON m.conversation_id = msg.conversation_id AND m.user_id = $2 \
             WHERE msg.conversation_id = $1 \
             AND msg.sender_id <> $2 \
             AND (m.last_read_at IS NULL OR msg.created_at > m.last_read_at)",
        )
        .bind(conversation_id)
        .bind(user_id)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to count unread", e))
    }

    /// Persist a new message.
    pub async fn create_message(&self, data: &CreateChatMessage) -> AppResult<ChatMessage> {
        sqlx::query_as::<_, ChatMessage>(
            "INSERT INTO chat_messages (conversation_id, sender_id, body, attachment_path, attachment_name, attachment_mime) \
             VALUES ($1, $2, $3, $4, $5, $6) RETURNING *",
        )
        .bind(data.conversation_id)
        .bind(data.sender_id)
        .bind(&data.body)
        .bind(&data.attachment_path)
        .bind(&data.attachment_name)
        .bind(&data.attachment_mime)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to create message", e))
    }

    /// Find a single message by primary key.
    pub async fn find_message(&self, id: Uuid) -> AppResult<Option<ChatMessage>> {
        sqlx::query_as::<_, ChatMessage>("SELECT * FROM chat_messages WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to find message", e))
    }

    /// List messages in a conversation, newest first.
    pub async fn messages_page(
        &self,
        conversation_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<ChatMessage>> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM chat_messages WHERE conversation_id = $1")
                .bind(conversation_id)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| {
                    AppError::with_source(ErrorKind::Database, "Failed to count messages", e)
                })?;

        let messages = sqlx::query_as::<_, ChatMessage>(
            "SELECT * FROM chat_messages WHERE conversation_id = $1 \
             ORDER BY created_at DESC LIMIT $2 OFFSET $3",
        )
        .bind(conversation_id)
        .bind(page.limit() as i64)
        .bind(page.offset() as i64)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to list messages", e))?;

        Ok(PageResponse::new(
            messages,
            page.page,
            page.page_size,
            total as u64,
        ))
    }

    /// Move the member's read marker to now.
    pub async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<()> {
        sqlx::query(
            "UPDATE conversation_members SET last_read_at = NOW() \
             WHERE conversation_id = $1 AND user_id = $2",
        )
        .bind(conversation_id)
        .bind(user_id)
        .execute(&self.pool)
        .await
        .map_err(|e| AppError::with_source(ErrorKind::Database, "Failed to mark read", e))?;
        Ok(())
    }
}
