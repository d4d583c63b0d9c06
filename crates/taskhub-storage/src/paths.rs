//! Storage path layout.
//!
//! All stored files live under the provider root:
//!
//! ```text
//! avatars/<user_id>.<ext>
//! tasks/<task_id>/<uuid>_<file_name>
//! chat/<conversation_id>/<uuid>_<file_name>
//! ```
//!
//! Attachment paths embed a fresh UUID so repeated uploads of the same
//! file name never collide. Avatar paths are stable per user; a new
//! avatar overwrites the old one when the extension matches.

use uuid::Uuid;

/// Path for a user's avatar.
pub fn avatar_path(user_id: Uuid, extension: &str) -> String {
    format!("avatars/{user_id}.{extension}")
}

/// Path for a task attachment.
pub fn task_attachment_path(task_id: Uuid, file_name: &str) -> String {
    format!("tasks/{task_id}/{}_{file_name}", Uuid::new_v4())
}

/// Path for a chat attachment.
pub fn chat_attachment_path(conversation_id: Uuid, file_name: &str) -> String {
    format!("chat/{conversation_id}/{}_{file_name}", Uuid::new_v4())
}
