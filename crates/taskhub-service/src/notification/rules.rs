//! Notification emission rules — determines who is notified about which
//! task and chat events, and builds the payloads.
//!
//! Two rules apply everywhere: the acting user is never notified about
//! their own action, and a `task_updated` for the same task and
//! recipient is suppressed while a recent one exists.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::warn;
use uuid::Uuid;

use taskhub_database::repositories::NotificationRepository;
use taskhub_entity::chat::message::ChatMessage;
use taskhub_entity::notification::kind::NotificationKind;
use taskhub_entity::notification::model::CreateNotification;
use taskhub_entity::task::{Task, TaskStatus};
use taskhub_entity::user::User;

/// Window within which a repeated `task_updated` to the same recipient
/// is dropped instead of stored again.
const DUPLICATE_WINDOW_MINUTES: i64 = 10;

/// Longest chat preview carried in a `message_new` body.
const MESSAGE_PREVIEW_CHARS: usize = 80;

/// Builds notification payloads for domain events.
#[derive(Debug, Clone)]
pub struct NotificationRules {
    /// Notification repository, used for duplicate suppression.
    notifications: Arc<NotificationRepository>,
}

impl NotificationRules {
    /// Creates a new rules engine.
    pub fn new(notifications: Arc<NotificationRepository>) -> Self {
        Self { notifications }
    }

    /// Payload for a task being assigned. Returns `None` when the task
    /// has no assignee or the actor assigned themselves.
    pub fn task_assigned(&self, task: &Task, actor: &User) -> Option<CreateNotification> {
        let assignee_id = task.assignee_id?;
        if assignee_id == actor.id {
            return None;
        }
        Some(CreateNotification {
            user_id: assignee_id,
            kind: NotificationKind::TaskAssigned,
            title: "New task assigned".to_string(),
            body: format!("{} assigned you \"{}\"", display_name(actor), task.title),
            actor_id: Some(actor.id),
            task_id: Some(task.id),
            conversation_id: None,
            event_id: None,
        })
    }

    /// Payload for task field edits: the assignee is told, unless they
    /// made the edit or were told about this task moments ago.
    pub async fn task_updated(&self, task: &Task, actor: &User) -> Vec<CreateNotification> {
        let Some(assignee_id) = task.assignee_id else {
            return Vec::new();
        };
        if assignee_id == actor.id {
            return Vec::new();
        }
        if self
            .recently_notified(assignee_id, NotificationKind::TaskUpdated, task.id)
            .await
        {
            return Vec::new();
        }
        vec![CreateNotification {
            user_id: assignee_id,
            kind: NotificationKind::TaskUpdated,
            title: "Task updated".to_string(),
            body: format!("{} updated \"{}\"", display_name(actor), task.title),
            actor_id: Some(actor.id),
            task_id: Some(task.id),
            conversation_id: None,
            event_id: None,
        }]
    }

    /// Payloads for a status transition. Completion notifies the creator
    /// and assignee with `task_completed`; other transitions fall back to
    /// `task_updated`. The actor is always skipped.
    pub async fn task_status_changed(&self, task: &Task, actor: &User) -> Vec<CreateNotification> {
        let completed = task.status == TaskStatus::Completed;
        let (kind, title) = if completed {
            (NotificationKind::TaskCompleted, "Task completed")
        } else {
            (NotificationKind::TaskUpdated, "Task updated")
        };

        let mut batch = Vec::new();
        for recipient in involved_except(task, actor.id) {
            if !completed && self.recently_notified(recipient, kind, task.id).await {
                continue;
            }
            batch.push(CreateNotification {
                user_id: recipient,
                kind,
                title: title.to_string(),
                body: format!(
                    "{} moved \"{}\" to {}",
                    display_name(actor),
                    task.title,
                    task.status
                ),
                actor_id: Some(actor.id),
                task_id: Some(task.id),
                conversation_id: None,
                event_id: None,
            });
        }
        batch
    }

    /// Payloads for a progress report: the other involved users are told
    /// the task moved forward.
    pub async fn report_added(&self, task: &Task, actor: &User) -> Vec<CreateNotification> {
        let mut batch = Vec::new();
        for recipient in involved_except(task, actor.id) {
            if self
                .recently_notified(recipient, NotificationKind::TaskUpdated, task.id)
                .await
            {
                continue;
            }
            batch.push(CreateNotification {
                user_id: recipient,
                kind: NotificationKind::TaskUpdated,
                title: "Progress report added".to_string(),
                body: format!(
                    "{} reported progress on \"{}\"",
                    display_name(actor),
                    task.title
                ),
                actor_id: Some(actor.id),
                task_id: Some(task.id),
                conversation_id: None,
                event_id: None,
            });
        }
        batch
    }

    /// Payload for a chat message delivered to one offline member.
    pub fn message_new(
        &self,
        recipient_id: Uuid,
        message: &ChatMessage,
        sender: &User,
    ) -> CreateNotification {
        let preview = if message.body.trim().is_empty() {
            message
                .attachment_name
                .as_deref()
                .map(|name| format!("Sent an attachment: {name}"))
                .unwrap_or_else(|| "Sent a message".to_string())
        } else {
            truncate_preview(&message.body)
        };

        CreateNotification {
            user_id: recipient_id,
            kind: NotificationKind::MessageNew,
            title: format!("New message from {}", display_name(sender)),
            body: preview,
            actor_id: Some(message.sender_id),
            task_id: None,
            conversation_id: Some(message.conversation_id),
            event_id: None,
        }
    }

    /// Payload for a deadline reminder to the task's assignee. The
    /// once-per-day guard is applied by the caller, which knows its own
    /// scan cadence.
    pub fn deadline_reminder(&self, task: &Task) -> Option<CreateNotification> {
        let assignee_id = task.assignee_id?;
        let due = task.due_date?;
        Some(CreateNotification {
            user_id: assignee_id,
            kind: NotificationKind::DeadlineReminder,
            title: "Deadline approaching".to_string(),
            body: format!(
                "\"{}\" is due {}",
                task.title,
                due.format("%Y-%m-%d %H:%M UTC")
            ),
            actor_id: None,
            task_id: Some(task.id),
            conversation_id: None,
            event_id: None,
        })
    }

    /// True when the recipient already has a notification of this kind
    /// for the task inside the suppression window. Lookup failures count
    /// as "not seen" so an outage cannot silence notifications.
    async fn recently_notified(&self, user_id: Uuid, kind: NotificationKind, task_id: Uuid) -> bool {
        let since = Utc::now() - Duration::minutes(DUPLICATE_WINDOW_MINUTES);
        match self
            .notifications
            .exists_for_task_since(task_id, user_id, kind, since)
            .await
        {
            Ok(exists) => exists,
            Err(e) => {
                warn!(error = %e, "Duplicate check failed, sending anyway");
                false
            }
        }
    }
}

/// The users involved in a task (creator and assignee), minus the actor.
fn involved_except(task: &Task, except: Uuid) -> Vec<Uuid> {
    let mut recipients = Vec::with_capacity(2);
    if task.creator_id != except {
        recipients.push(task.creator_id);
    }
    if let Some(assignee_id) = task.assignee_id {
        if assignee_id != except && !recipients.contains(&assignee_id) {
            recipients.push(assignee_id);
        }
    }
    recipients
}

/// The name a user is shown as in notification text.
fn display_name(user: &User) -> &str {
    user.display_name.as_deref().unwrap_or(&user.username)
}

/// Cuts a chat body down to a short preview on a character boundary.
fn truncate_preview(body: &str) -> String {
    if body.chars().count() <= MESSAGE_PREVIEW_CHARS {
        return body.to_string();
    }
    let cut: String = body.chars().take(MESSAGE_PREVIEW_CHARS).collect();
    format!("{cut}…")
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use sqlx::PgPool;
    use taskhub_entity::task::TaskPriority;
    use taskhub_entity::user::{UserRole, UserStatus};

    fn rules() -> NotificationRules {
        // connect_lazy never opens a connection; pure builders don't query.
        let pool = PgPool::connect_lazy("postgres://localhost/unused").unwrap();
        NotificationRules::new(Arc::new(NotificationRepository::new(pool)))
    }

    fn user(name: &str) -> User {
        let now = Utc::now();
        User {
            id: Uuid::new_v4(),
            username: name.to_string(),
            email: format!("{name}@example.com"),
            password_hash: "x".to_string(),
            display_name: None,
            avatar_path: None,
            role: UserRole::User,
            status: UserStatus::Active,
            created_at: now,
            updated_at: now,
            last_login_at: None,
        }
    }

    fn task(creator_id: Uuid, assignee_id: Option<Uuid>) -> Task {
        let now = Utc::now();
        Task {
            id: Uuid::new_v4(),
            project_id: None,
            title: "Ship the release".to_string(),
            description: None,
            status: TaskStatus::Pending,
            priority: TaskPriority::Medium,
            assignee_id,
            creator_id,
            due_date: None,
            completed_at: None,
            created_at: now,
            updated_at: now,
        }
    }

    #[tokio::test]
    async fn test_self_assignment_is_silent() {
        let rules = rules();
        let actor = user("alice");
        let task = task(actor.id, Some(actor.id));
        assert!(rules.task_assigned(&task, &actor).is_none());
    }

    #[tokio::test]
    async fn test_assignment_notifies_assignee() {
        let rules = rules();
        let actor = user("alice");
        let bob = user("bob");
        let task = task(actor.id, Some(bob.id));

        let payload = rules.task_assigned(&task, &actor).unwrap();
        assert_eq!(payload.user_id, bob.id);
        assert_eq!(payload.kind, NotificationKind::TaskAssigned);
        assert_eq!(payload.task_id, Some(task.id));
        assert!(payload.body.contains("alice"));
    }

    #[test]
    fn test_involved_except_dedupes_and_skips_actor() {
        let creator = Uuid::new_v4();
        let other = Uuid::new_v4();

        // Creator == assignee collapses to one recipient.
        let both = task(creator, Some(creator));
        assert_eq!(involved_except(&both, other), vec![creator]);

        // The actor is dropped even when involved.
        let assigned = task(creator, Some(other));
        assert_eq!(involved_except(&assigned, creator), vec![other]);
    }

    #[tokio::test]
    async fn test_message_preview_truncated() {
        let rules = rules();
        let sender = user("carol");
        let long_body = "x".repeat(500);
        let message = ChatMessage {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: sender.id,
            body: long_body,
            attachment_path: None,
            attachment_name: None,
            attachment_mime: None,
            created_at: Utc::now(),
        };

        let payload = rules.message_new(Uuid::new_v4(), &message, &sender);
        assert!(payload.body.chars().count() <= MESSAGE_PREVIEW_CHARS + 1);
        assert_eq!(payload.conversation_id, Some(message.conversation_id));
    }

    #[tokio::test]
    async fn test_attachment_only_message_preview() {
        let rules = rules();
        let sender = user("carol");
        let message = ChatMessage {
            id: Uuid::new_v4(),
            conversation_id: Uuid::new_v4(),
            sender_id: sender.id,
            body: String::new(),
            attachment_path: Some("chats/x/report.pdf".to_string()),
            attachment_name: Some("report.pdf".to_string()),
            attachment_mime: Some("application/pdf".to_string()),
            created_at: Utc::now(),
        };

        let payload = rules.message_new(Uuid::new_v4(), &message, &sender);
        assert!(payload.body.contains("report.pdf"));
    }

    #[tokio::test]
    async fn test_deadline_reminder_needs_assignee_and_due_date() {
        let rules = rules();
        let creator = Uuid::new_v4();

        let unassigned = task(creator, None);
        assert!(rules.deadline_reminder(&unassigned).is_none());

        let mut assigned = task(creator, Some(Uuid::new_v4()));
        assert!(rules.deadline_reminder(&assigned).is_none());

        assigned.due_date = Some(Utc::now());
        let payload = rules.deadline_reminder(&assigned).unwrap();
        assert_eq!(payload.kind, NotificationKind::DeadlineReminder);
        assert_eq!(payload.user_id, assigned.assignee_id.unwrap());
    }
}
