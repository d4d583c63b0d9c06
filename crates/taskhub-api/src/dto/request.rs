//! Request DTOs with validation.
//!
//! These are the wire shapes; handlers convert them into the service
//! layer's request structs after `validate()` passes. Structural rules
//! (lengths, required fields) live here, semantic rules (uniqueness,
//! access) stay in the services.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize};
use uuid::Uuid;
use validator::Validate;

use taskhub_entity::chat::ConversationKind;
use taskhub_entity::project::ProjectStatus;
use taskhub_entity::task::{TaskPriority, TaskStatus};
use taskhub_entity::user::{UserRole, UserStatus};

/// Distinguishes an absent field from an explicit `null`.
///
/// Fields annotated with this deserializer are `None` when omitted and
/// `Some(None)` when the client sends `null` to clear a value.
fn double_option<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Deserialize::deserialize(deserializer).map(Some)
}

/// Login request body.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct LoginRequest {
    /// Username.
    #[validate(length(min = 1, message = "Username is required"))]
    pub username: String,
    /// Password.
    #[validate(length(min = 1, message = "Password is required"))]
    pub password: String,
}

/// Token refresh request body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefreshRequest {
    /// Refresh token.
    pub refresh_token: String,
}

/// Update profile request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name.
    pub display_name: Option<String>,
    /// New email.
    pub email: Option<String>,
}

/// Password change request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ChangePasswordRequest {
    /// Current password, re-verified before the change.
    #[validate(length(min = 1, message = "Current password is required"))]
    pub current_password: String,
    /// New password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

/// Create task request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateTaskRequest {
    /// Project to create the task under (optional).
    pub project_id: Option<Uuid>,
    /// Task title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// Longer description.
    pub description: Option<String>,
    /// Priority; defaults to medium.
    #[serde(default)]
    pub priority: TaskPriority,
    /// Initial assignee.
    pub assignee_id: Option<Uuid>,
    /// Due date.
    pub due_date: Option<DateTime<Utc>>,
}

/// Update task request. Nullable fields use the absent/`null`
/// distinction: omitted means unchanged, `null` clears.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateTaskRequest {
    /// New title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New priority.
    pub priority: Option<TaskPriority>,
    /// New assignee; `null` unassigns.
    #[serde(default, deserialize_with = "double_option")]
    pub assignee_id: Option<Option<Uuid>>,
    /// New due date; `null` clears it.
    #[serde(default, deserialize_with = "double_option")]
    pub due_date: Option<Option<DateTime<Utc>>>,
    /// New project; `null` detaches the task.
    #[serde(default, deserialize_with = "double_option")]
    pub project_id: Option<Option<Uuid>>,
}

/// Task status transition request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SetStatusRequest {
    /// Target status.
    pub status: TaskStatus,
}

/// Progress report submission.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReportRequest {
    /// Report text.
    #[validate(length(min = 1, message = "Report content is required"))]
    pub content: String,
}

/// Create project request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateProjectRequest {
    /// Project name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: String,
    /// Description.
    pub description: Option<String>,
}

/// Update project request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateProjectRequest {
    /// New name.
    #[validate(length(min = 1, max = 255, message = "Name must be 1-255 characters"))]
    pub name: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New status.
    pub status: Option<ProjectStatus>,
}

/// Add a member to a project.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddMemberRequest {
    /// The user to add.
    pub user_id: Uuid,
}

/// Create calendar event request.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateEventRequest {
    /// Event title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: String,
    /// Description.
    pub description: Option<String>,
    /// Start time.
    pub start_time: DateTime<Utc>,
    /// End time (optional for open-ended events).
    pub end_time: Option<DateTime<Utc>>,
    /// Whole-day flag.
    #[serde(default)]
    pub all_day: bool,
    /// Linked task (optional).
    pub task_id: Option<Uuid>,
}

/// Update calendar event request.
#[derive(Debug, Clone, Default, Serialize, Deserialize, Validate)]
pub struct UpdateEventRequest {
    /// New title.
    #[validate(length(min = 1, max = 255, message = "Title must be 1-255 characters"))]
    pub title: Option<String>,
    /// New description.
    pub description: Option<String>,
    /// New start time.
    pub start_time: Option<DateTime<Utc>>,
    /// New end time.
    pub end_time: Option<DateTime<Utc>>,
    /// New whole-day flag.
    pub all_day: Option<bool>,
}

/// Create conversation request.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreateConversationRequest {
    /// Direct or group.
    pub kind: ConversationKind,
    /// Group name; required for groups, rejected for direct chats.
    pub name: Option<String>,
    /// Members to include. The creator is always added.
    pub member_ids: Vec<Uuid>,
}

/// Plain-text message body (the JSON variant of message sending;
/// attachments go through multipart).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SendMessageRequest {
    /// Message text.
    pub body: String,
}

/// Create user request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateUserRequest {
    /// Login name.
    #[validate(length(min = 3, max = 100, message = "Username must be 3-100 characters"))]
    pub username: String,
    /// Email address.
    #[validate(email(message = "Invalid email address"))]
    pub email: String,
    /// Initial password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub password: String,
    /// Display name.
    pub display_name: Option<String>,
    /// Role; defaults to a regular user.
    #[serde(default)]
    pub role: UserRole,
}

/// Update user request (admin).
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UpdateUserRequest {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New account status.
    pub status: Option<UserStatus>,
}

/// Reset password request (admin).
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct ResetPasswordRequest {
    /// New password.
    #[validate(length(min = 8, message = "Password must be at least 8 characters"))]
    pub new_password: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_update_task_distinguishes_null_from_absent() {
        let req: UpdateTaskRequest =
            serde_json::from_str(r#"{"title":"New title","assignee_id":null}"#).unwrap();
        assert_eq!(req.title.as_deref(), Some("New title"));
        assert_eq!(req.assignee_id, Some(None));
        assert_eq!(req.due_date, None);
    }

    #[test]
    fn test_update_task_accepts_concrete_assignee() {
        let id = Uuid::new_v4();
        let req: UpdateTaskRequest =
            serde_json::from_str(&format!(r#"{{"assignee_id":"{id}"}}"#)).unwrap();
        assert_eq!(req.assignee_id, Some(Some(id)));
    }

    #[test]
    fn test_login_request_rejects_empty_username() {
        let req = LoginRequest {
            username: String::new(),
            password: "secret".into(),
        };
        assert!(req.validate().is_err());
    }

    #[test]
    fn test_create_user_rejects_bad_email() {
        let req = CreateUserRequest {
            username: "alice".into(),
            email: "not-an-email".into(),
            password: "longenough1".into(),
            display_name: None,
            role: UserRole::User,
        };
        assert!(req.validate().is_err());
    }
}
