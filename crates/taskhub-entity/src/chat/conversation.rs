//! Conversation entity models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

use super::message::ChatMessage;

/// Kind of conversation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, sqlx::Type)]
#[sqlx(type_name = "conversation_kind", rename_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum ConversationKind {
    /// One-to-one conversation.
    Direct,
    /// Named group conversation.
    Group,
}

impl ConversationKind {
    /// Return the kind as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Direct => "direct",
            Self::Group => "group",
        }
    }
}

impl std::fmt::Display for ConversationKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// A chat conversation between two or more users.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct Conversation {
    /// Unique conversation identifier.
    pub id: Uuid,
    /// Direct or group.
    pub kind: ConversationKind,
    /// Group name (unused for direct conversations).
    pub name: Option<String>,
    /// The user who started the conversation.
    pub created_by: Uuid,
    /// When the conversation was created.
    pub created_at: DateTime<Utc>,
}

/// Membership of a user in a conversation.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ConversationMember {
    /// The conversation.
    pub conversation_id: Uuid,
    /// The member user.
    pub user_id: Uuid,
    /// When the user joined.
    pub joined_at: DateTime<Utc>,
    /// High-water mark for read messages; messages after this are unread.
    pub last_read_at: Option<DateTime<Utc>>,
}

/// A conversation as shown in the conversation list, with the last
/// message and the requesting member's unread count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversationSummary {
    /// The conversation itself.
    pub conversation: Conversation,
    /// Other member user IDs.
    pub member_ids: Vec<Uuid>,
    /// The most recent message (if any).
    pub last_message: Option<ChatMessage>,
    /// Number of messages the requesting member has not read.
    pub unread_count: i64,
}
