//! Chat message entity model.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::FromRow;
use uuid::Uuid;

/// A message in a conversation, optionally carrying one attachment.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct ChatMessage {
    /// Unique message identifier.
    pub id: Uuid,
    /// The conversation this message belongs to.
    pub conversation_id: Uuid,
    /// The sending user.
    pub sender_id: Uuid,
    /// Message text.
    pub body: String,
    /// Storage path of the attachment (if any).
    pub attachment_path: Option<String>,
    /// Original attachment file name.
    pub attachment_name: Option<String>,
    /// Attachment MIME type.
    pub attachment_mime: Option<String>,
    /// When the message was sent.
    pub created_at: DateTime<Utc>,
}

impl ChatMessage {
    /// Check whether the message carries an attachment.
    pub fn has_attachment(&self) -> bool {
        self.attachment_path.is_some()
    }
}

/// Data required to persist a new chat message.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateChatMessage {
    /// Target conversation.
    pub conversation_id: Uuid,
    /// Sending user.
    pub sender_id: Uuid,
    /// Message text.
    pub body: String,
    /// Attachment storage path (optional).
    pub attachment_path: Option<String>,
    /// Attachment original name (optional).
    pub attachment_name: Option<String>,
    /// Attachment MIME type (optional).
    pub attachment_mime: Option<String>,
}
