//! Aggregated counts for the dashboard view.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use taskhub_core::result::AppResult;
use taskhub_database::repositories::{
    NotificationRepository, ProjectRepository, TaskRepository, UserRepository,
};
use taskhub_entity::project::ProjectStatus;
use taskhub_entity::task::TaskStatus;

use crate::context::RequestContext;

/// Counters shown on the dashboard. Regular users see their own numbers;
/// admins see system-wide numbers plus the user count.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DashboardSummary {
    /// Tasks waiting to be started.
    pub pending_tasks: i64,
    /// Tasks being worked on.
    pub in_progress_tasks: i64,
    /// Finished tasks.
    pub completed_tasks: i64,
    /// Open tasks past their due date.
    pub overdue_tasks: i64,
    /// Projects in the active state.
    pub active_projects: i64,
    /// The requesting user's unread notifications.
    pub unread_notifications: i64,
    /// Total registered users; present for admins only.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub total_users: Option<i64>,
}

/// Builds dashboard summaries.
#[derive(Debug, Clone)]
pub struct DashboardService {
    /// Task repository.
    tasks: Arc<TaskRepository>,
    /// Project repository.
    projects: Arc<ProjectRepository>,
    /// Notification repository.
    notifications: Arc<NotificationRepository>,
    /// User repository.
    users: Arc<UserRepository>,
}

impl DashboardService {
    /// Creates a new dashboard service.
    pub fn new(
        tasks: Arc<TaskRepository>,
        projects: Arc<ProjectRepository>,
        notifications: Arc<NotificationRepository>,
        users: Arc<UserRepository>,
    ) -> Self {
        Self {
            tasks,
            projects,
            notifications,
            users,
        }
    }

    /// Builds the summary for the current user. Task and project counts
    /// are scoped to involvement for non-admins; the unread count is
    /// always personal.
    pub async fn summary(&self, ctx: &RequestContext) -> AppResult<DashboardSummary> {
        let involving = if ctx.is_admin() {
            None
        } else {
            Some(ctx.user_id())
        };

        let pending_tasks = self
            .tasks
            .count_by_status(TaskStatus::Pending, involving)
            .await?;
        let in_progress_tasks = self
            .tasks
            .count_by_status(TaskStatus::InProgress, involving)
            .await?;
        let completed_tasks = self
            .tasks
            .count_by_status(TaskStatus::Completed, involving)
            .await?;
        let overdue_tasks = self.tasks.count_overdue(involving).await?;

        let active_projects = self
            .projects
            .count_by_status(ProjectStatus::Active, involving)
            .await?;

        let unread_notifications = self.notifications.count_unread(ctx.user_id()).await?;

        let total_users = if ctx.is_admin() {
            Some(self.users.count_all().await?)
        } else {
            None
        };

        Ok(DashboardSummary {
            pending_tasks,
            in_progress_tasks,
            completed_tasks,
            overdue_tasks,
            active_projects,
            unread_notifications,
            total_users,
        })
    }
}
