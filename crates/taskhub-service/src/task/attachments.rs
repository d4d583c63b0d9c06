//! Task attachment upload, listing, download, and removal.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use taskhub_auth::AccessPolicy;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::storage::{ByteStream, StorageProvider};
use taskhub_database::repositories::{AttachmentRepository, TaskRepository};
use taskhub_entity::task::attachment::{CreateTaskAttachment, TaskAttachment};
use taskhub_entity::task::Task;
use taskhub_storage::policy::MAX_ATTACHMENTS_PER_TASK;
use taskhub_storage::{paths, UploadPolicy};

use crate::context::RequestContext;

/// Handles files attached to tasks.
#[derive(Debug, Clone)]
pub struct TaskAttachmentService {
    /// Task repository, for access checks.
    tasks: Arc<TaskRepository>,
    /// Attachment repository.
    attachments: Arc<AttachmentRepository>,
    /// Storage provider for file bytes.
    storage: Arc<dyn StorageProvider>,
    /// Upload validation policy.
    policy: UploadPolicy,
    /// Access policy.
    access: AccessPolicy,
}

impl TaskAttachmentService {
    /// Creates a new task attachment service.
    pub fn new(
        tasks: Arc<TaskRepository>,
        attachments: Arc<AttachmentRepository>,
        storage: Arc<dyn StorageProvider>,
        policy: UploadPolicy,
        access: AccessPolicy,
    ) -> Self {
        Self {
            tasks,
            attachments,
            storage,
            policy,
            access,
        }
    }

    /// Uploads one attachment to a task. Anyone who can see the task may
    /// attach to it, up to the per-task limit.
    pub async fn upload(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        file_name: &str,
        data: Bytes,
    ) -> AppResult<TaskAttachment> {
        let task = self.require_visible_task(ctx, task_id).await?;

        let count = self.attachments.count_by_task(task.id).await?;
        if count >= MAX_ATTACHMENTS_PER_TASK {
            return Err(AppError::validation(format!(
                "A task can hold at most {MAX_ATTACHMENTS_PER_TASK} attachments"
            )));
        }

        let validated = self.policy.validate_task_attachment(file_name, &data)?;
        let storage_path = paths::task_attachment_path(task.id, &validated.file_name);

        self.storage.write(&storage_path, data).await?;

        let attachment = match self
            .attachments
            .create(&CreateTaskAttachment {
                task_id: task.id,
                file_name: validated.file_name,
                mime_type: validated.mime_type,
                size_bytes: validated.size_bytes as i64,
                storage_path: storage_path.clone(),
                uploaded_by: ctx.user_id(),
            })
            .await
        {
            Ok(attachment) => attachment,
            Err(e) => {
                // The row is the source of truth; drop the orphaned file.
                let _ = self.storage.delete(&storage_path).await;
                return Err(e);
            }
        };

        info!(
            task_id = %task.id,
            attachment_id = %attachment.id,
            size = attachment.size_bytes,
            "Attachment uploaded"
        );
        Ok(attachment)
    }

    /// Lists a task's attachments, oldest first.
    pub async fn list(&self, ctx: &RequestContext, task_id: Uuid) -> AppResult<Vec<TaskAttachment>> {
        self.require_visible_task(ctx, task_id).await?;
        self.attachments.find_by_task(task_id).await
    }

    /// Opens an attachment for download.
    pub async fn download(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<(TaskAttachment, ByteStream)> {
        self.require_visible_task(ctx, task_id).await?;
        let attachment = self.find_in_task(task_id, attachment_id).await?;
        let stream = self.storage.read(&attachment.storage_path).await?;
        Ok((attachment, stream))
    }

    /// Removes an attachment. The uploader may always remove their own
    /// file; otherwise task-manage rights are needed.
    pub async fn delete(
        &self,
        ctx: &RequestContext,
        task_id: Uuid,
        attachment_id: Uuid,
    ) -> AppResult<()> {
        let task = self.require_visible_task(ctx, task_id).await?;
        let attachment = self.find_in_task(task_id, attachment_id).await?;

        if attachment.uploaded_by != ctx.user_id() {
            self.access.require_task_manage(&ctx.user, &task)?;
        }

        let Some(deleted) = self.attachments.delete(attachment.id).await? else {
            return Err(AppError::not_found("Attachment not found"));
        };

        if let Err(e) = self.storage.delete(&deleted.storage_path).await {
            warn!(path = %deleted.storage_path, error = %e, "Failed to remove attachment file");
        }

        info!(attachment_id = %attachment_id, actor = %ctx.user_id(), "Attachment deleted");
        Ok(())
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

    /// Looks up an attachment and checks it belongs to the routed task.
    async fn find_in_task(&self, task_id: Uuid, attachment_id: Uuid) -> AppResult<TaskAttachment> {
        self.attachments
            .find_by_id(attachment_id)
            .await?
            .filter(|a| a.task_id == task_id)
            .ok_or_else(|| AppError::not_found("Attachment not found"))
    }
}
