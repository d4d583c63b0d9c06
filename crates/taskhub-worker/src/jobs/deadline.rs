//! Deadline reminder scan.

use std::sync::Arc;

use chrono::{Duration, Utc};
use tracing::{debug, info};

use taskhub_core::result::AppResult;
use taskhub_database::repositories::{NotificationRepository, TaskRepository};
use taskhub_entity::notification::kind::NotificationKind;
use taskhub_realtime::NotificationDispatcher;
use taskhub_service::NotificationRules;

/// Scans for open, assigned tasks whose due date falls within the
/// reminder window and sends each assignee a `deadline_reminder`.
///
/// A task reminds its assignee at most once per day: before dispatching,
/// the job checks for an existing reminder row within the last 24 hours.
/// The scan itself runs far more often than that, so a restart or an
/// overlapping run never produces duplicates.
pub struct DeadlineReminderJob {
    /// Task repository.
    tasks: Arc<TaskRepository>,
    /// Notification repository, for the once-per-day dedup check.
    notifications: Arc<NotificationRepository>,
    /// Payload builder.
    rules: NotificationRules,
    /// Dispatcher that stores and pushes the notification.
    dispatcher: Arc<NotificationDispatcher>,
    /// How far ahead of the due date reminders fire, in hours.
    window_hours: i64,
}

impl DeadlineReminderJob {
    /// Creates a new deadline reminder job.
    pub fn new(
        tasks: Arc<TaskRepository>,
        notifications: Arc<NotificationRepository>,
        rules: NotificationRules,
        dispatcher: Arc<NotificationDispatcher>,
        window_hours: i64,
    ) -> Self {
        Self {
            tasks,
            notifications,
            rules,
            dispatcher,
            window_hours,
        }
    }

    /// Runs one scan. Returns the number of reminders sent.
    pub async fn run(&self) -> AppResult<u64> {
        let now = Utc::now();
        let window_end = now + Duration::hours(self.window_hours);
        let dedup_since = now - Duration::days(1);

        let due_tasks = self.tasks.find_due_between(now, window_end).await?;
        debug!(count = due_tasks.len(), "Deadline scan found due tasks");

        let mut sent = 0u64;
        for task in due_tasks {
            let Some(payload) = self.rules.deadline_reminder(&task) else {
                continue;
            };

            let already_reminded = self
                .notifications
                .exists_for_task_since(
                    task.id,
                    payload.user_id,
                    NotificationKind::DeadlineReminder,
                    dedup_since,
                )
                .await?;
            if already_reminded {
                continue;
            }

            self.dispatcher.dispatch(payload).await;
            sent += 1;
        }

        if sent > 0 {
            info!(sent, "Deadline reminders dispatched");
        }
        Ok(sent)
    }
}
