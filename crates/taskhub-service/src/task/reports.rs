//! Progress reports submitted against tasks.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use taskhub_auth::AccessPolicy;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::{ReportRepository, TaskRepository};
use taskhub_entity::report::Report;
use taskhub_entity::task::Task;
use taskhub_realtime::NotificationDispatcher;

use crate::context::RequestContext;
use crate::notification::NotificationRules;

/// Handles progress reports on tasks.
#[derive(Debug, Clone)]
pub struct ReportService {
    /// Report repository.
    reports: Arc<ReportRepository>,
    /// Task repository, for access checks.
    tasks: Arc<TaskRepository>,
    /// Access policy.
    access: AccessPolicy,
    /// Notification emission rules.
    rules: NotificationRules,
    /// Realtime dispatcher.
    dispatcher: Arc<NotificationDispatcher>,
}

impl ReportService {
    /// Creates a new report service.
    pub fn new(
        reports: Arc<ReportRepository>,
        tasks: Arc<TaskRepository>,
        access: AccessPolicy,
        rules: NotificationRules,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            reports,
            tasks,
            access,
            rules,
            dispatcher,
        }
    }

    /// Submits a progress report. The other users involved in the task
    /// are told about it.
    pub async fn add(&self, ctx: &RequestContext, task_id: Uuid, content: &str) -> AppResult<Report> {
        if content.trim().is_empty() {
            return Err(AppError::validation("Report content cannot be empty"));
        }

        let task = self.require_visible_task(ctx, task_id).await?;

        let report = self
            .reports
            .create(task.id, ctx.user_id(), content.trim())
            .await?;

        info!(task_id = %task.id, report_id = %report.id, "Progress report added");

        let batch = self.rules.report_added(&task, &ctx.user).await;
        self.dispatcher.dispatch_all(batch).await;

        Ok(report)
    }

    /// Lists reports for a task, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Report>> {
        self.require_visible_task(ctx, task_id).await?;
        self.reports.find_by_task(task_id, page).await
    }

    async fn require_visible_task(&self, ctx: &RequestContext, task_id: Uuid) -> AppResult<Task> {
        let task = self
            .tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task not found"))?;
        self.access.require_task_view(&ctx.user, &task)?;
        Ok(task)
    }
}
