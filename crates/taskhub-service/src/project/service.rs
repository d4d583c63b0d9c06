//! Project CRUD and membership management.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use taskhub_auth::AccessPolicy;
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::{ProjectRepository, UserRepository};
use taskhub_entity::project::model::{CreateProject, UpdateProject};
use taskhub_entity::project::Project;
use taskhub_entity::user::User;

use crate::context::RequestContext;

/// Handles projects and their membership.
#[derive(Debug, Clone)]
pub struct ProjectService {
    /// Project repository.
    projects: Arc<ProjectRepository>,
    /// User repository, for member validation and listing.
    users: Arc<UserRepository>,
    /// Access policy.
    access: AccessPolicy,
}

/// Request to create a new project. The owner is always the current user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateProjectRequest {
    /// Project name.
    pub name: String,
    /// Description (optional).
    pub description: Option<String>,
}

impl ProjectService {
    /// Creates a new project service.
    pub fn new(
        projects: Arc<ProjectRepository>,
        users: Arc<UserRepository>,
        access: AccessPolicy,
    ) -> Self {
        Self {
            projects,
            users,
            access,
        }
    }

    /// Lists projects. Admins see everything; others see projects they
    /// own or belong to.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Project>> {
        if ctx.is_admin() {
            self.projects.find_all(page).await
        } else {
            self.projects.find_for_member(ctx.user_id(), page).await
        }
    }

    /// Gets a single project the current user may see.
    pub async fn get(&self, ctx: &RequestContext, project_id: Uuid) -> AppResult<Project> {
        let project = self.find_project(project_id).await?;
        self.require_project_view(ctx, &project).await?;
        Ok(project)
    }

    /// Creates a project owned by the current user. The owner starts as
    /// a member.
    pub async fn create(&self, ctx: &RequestContext, req: CreateProjectRequest) -> AppResult<Project> {
        if req.name.trim().is_empty() {
            return Err(AppError::validation("Project name cannot be empty"));
        }

        let project = self
            .projects
            .create(&CreateProject {
                name: req.name.trim().to_string(),
                description: req.description,
                owner_id: ctx.user_id(),
            })
            .await?;

        info!(project_id = %project.id, owner = %ctx.user_id(), "Project created");
        Ok(project)
    }

    /// Updates a project's fields. Owner or admin only.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        data: UpdateProject,
    ) -> AppResult<Project> {
        let project = self.find_project(project_id).await?;
        self.access.require_project_manage(&ctx.user, &project)?;

        if let Some(ref name) = data.name {
            if name.trim().is_empty() {
                return Err(AppError::validation("Project name cannot be empty"));
            }
        }

        let updated = self.projects.update(project_id, &data).await?;
        info!(project_id = %project_id, actor = %ctx.user_id(), "Project updated");
        Ok(updated)
    }

    /// Deletes a project. Tasks keep existing but lose their project
    /// link; membership rows go with the project.
    pub async fn delete(&self, ctx: &RequestContext, project_id: Uuid) -> AppResult<()> {
        let project = self.find_project(project_id).await?;
        self.access.require_project_manage(&ctx.user, &project)?;

        if !self.projects.delete(project_id).await? {
            return Err(AppError::not_found("Project not found"));
        }

        info!(project_id = %project_id, actor = %ctx.user_id(), "Project deleted");
        Ok(())
    }

    /// Adds a member. Owner or admin only; adding twice is a no-op.
    pub async fn add_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let project = self.find_project(project_id).await?;
        self.access.require_project_manage(&ctx.user, &project)?;

        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        self.projects.add_member(project_id, user_id).await?;
        info!(project_id = %project_id, member = %user_id, "Project member added");
        Ok(())
    }

    /// Removes a member. The owner cannot be removed; transfer ownership
    /// by other means first.
    pub async fn remove_member(
        &self,
        ctx: &RequestContext,
        project_id: Uuid,
        user_id: Uuid,
    ) -> AppResult<()> {
        let project = self.find_project(project_id).await?;
        self.access.require_project_manage(&ctx.user, &project)?;

        if user_id == project.owner_id {
            return Err(AppError::validation(
                "The project owner cannot be removed from the project",
            ));
        }

        if !self.projects.remove_member(project_id, user_id).await? {
            return Err(AppError::not_found("User is not a member of this project"));
        }

        info!(project_id = %project_id, member = %user_id, "Project member removed");
        Ok(())
    }

    /// Lists a project's members as user rows.
    pub async fn members(&self, ctx: &RequestContext, project_id: Uuid) -> AppResult<Vec<User>> {
        let project = self.find_project(project_id).await?;
        self.require_project_view(ctx, &project).await?;

        let member_rows = self.projects.members(project_id).await?;
        let ids: Vec<Uuid> = member_rows.iter().map(|m| m.user_id).collect();
        self.users.find_by_ids(&ids).await
    }

    async fn find_project(&self, project_id: Uuid) -> AppResult<Project> {
        self.projects
            .find_by_id(project_id)
            .await?
            .ok_or_else(|| AppError::not_found("Project not found"))
    }

    /// Viewing needs membership (or ownership, or the admin role).
    async fn require_project_view(&self, ctx: &RequestContext, project: &Project) -> AppResult<()> {
        if ctx.is_admin()
            || project.owner_id == ctx.user_id()
            || self.projects.is_member(project.id, ctx.user_id()).await?
        {
            Ok(())
        } else {
            Err(AppError::authorization(
                "You do not have access to this project",
            ))
        }
    }
}
