//! Task CRUD, listing, and lifecycle transitions.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::{info, warn};
use uuid::Uuid;

use taskhub_auth::AccessPolicy;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::storage::StorageProvider;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::task::TaskFilter;
use taskhub_database::repositories::{
    AttachmentRepository, ProjectRepository, TaskRepository, UserRepository,
};
use taskhub_entity::task::model::{CreateTask, UpdateTask};
use taskhub_entity::task::{Task, TaskPriority, TaskStatus};
use taskhub_realtime::NotificationDispatcher;

use crate::context::RequestContext;
use crate::notification::NotificationRules;

/// Handles task CRUD and status transitions.
#[derive(Debug, Clone)]
pub struct TaskService {
    /// Task repository.
    tasks: Arc<TaskRepository>,
    /// Project repository, for membership checks on project tasks.
    projects: Arc<ProjectRepository>,
    /// User repository, for assignee validation.
    users: Arc<UserRepository>,
    /// Attachment repository, for cleanup on delete.
    attachments: Arc<AttachmentRepository>,
    /// Storage provider, for cleanup on delete.
    storage: Arc<dyn StorageProvider>,
    /// Access policy.
    access: AccessPolicy,
    /// Notification emission rules.
    rules: NotificationRules,
    /// Realtime dispatcher.
    dispatcher: Arc<NotificationDispatcher>,
}

/// Request to create a new task. The creator is always the current user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateTaskRequest {
    /// Project to attach the task to (optional).
    pub project_id: Option<Uuid>,
    /// Task title.
    pub title: String,
    /// Longer description (optional).
    pub description: Option<String>,
    /// Priority level.
    pub priority: TaskPriority,
    /// Initial assignee (optional).
    pub assignee_id: Option<Uuid>,
    /// Due date (optional).
    pub due_date: Option<DateTime<Utc>>,
}

impl TaskService {
    /// Creates a new task service.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        tasks: Arc<TaskRepository>,
        projects: Arc<ProjectRepository>,
        users: Arc<UserRepository>,
        attachments: Arc<AttachmentRepository>,
        storage: Arc<dyn StorageProvider>,
        access: AccessPolicy,
        rules: NotificationRules,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            tasks,
            projects,
            users,
            attachments,
            storage,
            access,
            rules,
            dispatcher,
        }
    }

    /// Lists tasks matching the filter. Non-admins only ever see tasks
    /// they created or are assigned to, whatever the filter says.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        mut filter: TaskFilter,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Task>> {
        if !ctx.is_admin() {
            filter.involving = Some(ctx.user_id());
        }
        self.tasks.find_page(&filter, page).await
    }

    /// Gets a single task the current user may see.
    pub async fn get(&self, ctx: &RequestContext, task_id: Uuid) -> AppResult<Task> {
        let task = self.find_task(task_id).await?;
        self.access.require_task_view(&ctx.user, &task)?;
        Ok(task)
    }

    /// Creates a task. Assigning someone else notifies them.
    pub async fn create(&self, ctx: &RequestContext, req: CreateTaskRequest) -> AppResult<Task> {
        if req.title.trim().is_empty() {
            return Err(AppError::validation("Task title cannot be empty"));
        }

        if let Some(project_id) = req.project_id {
            self.require_project_member(ctx, project_id).await?;
        }
        if let Some(assignee_id) = req.assignee_id {
            self.require_user_exists(assignee_id).await?;
        }

        let task = self
            .tasks
            .create(&CreateTask {
                project_id: req.project_id,
                title: req.title.trim().to_string(),
                description: req.description,
                priority: req.priority,
                assignee_id: req.assignee_id,
                creator_id: ctx.user_id(),
                due_date: req.due_date,
            })
            .await?;

        info!(task_id = %task.id, creator = %ctx.user_id(), "Task created");

        if let Some(payload) = self.rules.task_assigned(&task, &ctx.user) {
            self.dispatcher.dispatch(payload).await;
        }

        Ok(task)
    }

    /// Updates a task's fields. A changed assignee gets `task_assigned`;
    /// any other change tells the assignee the task moved under them.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        data: UpdateTask,
    ) -> AppResult<Task> {
        let task = self.find_task(task_id).await?;
        self.access.require_task_manage(&ctx.user, &task)?;

        if let Some(ref title) = data.title {
            if title.trim().is_empty() {
                return Err(AppError::validation("Task title cannot be empty"));
            }
        }
        if let Some(Some(assignee_id)) = data.assignee_id {
            self.require_user_exists(assignee_id).await?;
        }
        if let Some(Some(project_id)) = data.project_id {
            self.require_project_member(ctx, project_id).await?;
        }

        let assignee_changed = match data.assignee_id {
            Some(new_assignee) => new_assignee != task.assignee_id,
            None => false,
        };

        let updated = self.tasks.update(task_id, &data).await?;
        info!(task_id = %task_id, actor = %ctx.user_id(), "Task updated");

        if assignee_changed {
            if let Some(payload) = self.rules.task_assigned(&updated, &ctx.user) {
                self.dispatcher.dispatch(payload).await;
            }
        } else {
            let batch = self.rules.task_updated(&updated, &ctx.user).await;
            self.dispatcher.dispatch_all(batch).await;
        }

        Ok(updated)
    }

    /// Transitions a task to a new status. The creator, assignee, or an
    /// admin may transition; repeating the current status is rejected.
    pub async fn set_status(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        status: TaskStatus,
    ) -> AppResult<Task> {
        let task = self.find_task(task_id).await?;
        self.access.require_task_transition(&ctx.user, &task)?;

        if task.status == status {
            return Err(AppError::conflict(format!("Task is already {status}")));
        }

        let updated = self.tasks.set_status(task_id, status).await?;
        info!(
            task_id = %task_id,
            from = %task.status,
            to = %status,
            actor = %ctx.user_id(),
            "Task status changed"
        );

        let batch = self.rules.task_status_changed(&updated, &ctx.user).await;
        self.dispatcher.dispatch_all(batch).await;

        Ok(updated)
    }

    /// Deletes a task along with its stored attachment files. Rows for
    /// attachments and reports go with the task via cascade.
    pub async fn delete(&self, ctx: &RequestContext, task_id: Uuid) -> AppResult<()> {
        let task = self.find_task(task_id).await?;
        self.access.require_task_manage(&ctx.user, &task)?;

        let attachments = self.attachments.find_by_task(task_id).await?;

        if !self.tasks.delete(task_id).await? {
            return Err(AppError::not_found("Task not found"));
        }

        for attachment in attachments {
            if let Err(e) = self.storage.delete(&attachment.storage_path).await {
                warn!(
                    path = %attachment.storage_path,
                    error = %e,
                    "Failed to remove attachment file for deleted task"
                );
            }
        }

        info!(task_id = %task_id, actor = %ctx.user_id(), "Task deleted");
        Ok(())
    }

    async fn find_task(&self, task_id: Uuid) -> AppResult<Task> {
        self.tasks
            .find_by_id(task_id)
            .await?
            .ok_or_else(|| AppError::not_found("Task not found"))
    }

    async fn require_user_exists(&self, user_id: Uuid) -> AppResult<()> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("Assignee not found"))?;
        Ok(())
    }

    /// A task may live in a project only when the actor belongs to it.
    async fn require_project_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
    ) -> AppResult<()> {
        let project = self
            .projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))?;

        if ctx.is_admin()
            || project.owner_id == ctx.user_id()
            || self.projects.is_member(project_id, ctx.user_id()).await?
        {
            Ok(())
        } else {
            Err(AppError::authorization(
                "You are not a member of this project",
            ))
        }
    }
}
