//! Admin user management — CRUD, role and status changes, password resets.

use std::sync::Arc;

use tracing::{info, warn};
use uuid::Uuid;

use taskhub_auth::{AccessPolicy, PasswordHasher, PasswordValidator};
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::storage::StorageProvider;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::{SessionRepository, UserRepository};
use taskhub_entity::user::model::{CreateUser, UpdateUser};
use taskhub_entity::user::{User, UserRole, UserStatus};

use crate::context::RequestContext;

/// Handles administrative user management operations.
#[derive(Debug, Clone)]
pub struct AdminUserService {
    /// User repository.
    users: Arc<UserRepository>,
    /// Session repository, for revoking access on deactivation.
    sessions: Arc<SessionRepository>,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
    /// Storage provider, for avatar cleanup on delete.
    storage: Arc<dyn StorageProvider>,
    /// Access policy.
    access: AccessPolicy,
}

/// Request to create a new user.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct CreateUserRequest {
    /// Username (unique).
    pub username: String,
    /// Email (unique).
    pub email: String,
    /// Initial password.
    pub password: String,
    /// Display name (optional).
    pub display_name: Option<String>,
    /// Role assignment.
    pub role: UserRole,
}

/// Request to update a user as an admin.
#[derive(Debug, Clone, Default, serde::Serialize, serde::Deserialize)]
pub struct AdminUpdateUserRequest {
    /// New email.
    pub email: Option<String>,
    /// New display name.
    pub display_name: Option<String>,
    /// New role.
    pub role: Option<UserRole>,
    /// New account status.
    pub status: Option<UserStatus>,
}

impl AdminUserService {
    /// Creates a new admin user service.
    pub fn new(
        users: Arc<UserRepository>,
        sessions: Arc<SessionRepository>,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
        storage: Arc<dyn StorageProvider>,
        access: AccessPolicy,
    ) -> Self {
        Self {
            users,
            sessions,
            hasher,
            validator,
            storage,
            access,
        }
    }

    /// Lists all users with pagination.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<User>> {
        self.access.require_admin(&ctx.user)?;
        self.users.find_all(page).await
    }

    /// Gets a single user by ID.
    pub async fn get(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<User> {
        self.access.require_admin(&ctx.user)?;
        self.find_user(user_id).await
    }

    /// Creates a new user account.
    pub async fn create(&self, ctx: &RequestContext, req: CreateUserRequest) -> AppResult<User> {
        self.access.require_admin(&ctx.user)?;

        let username = req.username.trim();
        if username.len() < 3 {
            return Err(AppError::validation(
                "Username must be at least 3 characters",
            ));
        }
        if !req.email.contains('@') {
            return Err(AppError::validation("Invalid email address"));
        }

        if self.users.find_by_username(username).await?.is_some() {
            return Err(AppError::conflict("Username is already taken"));
        }
        if self.users.find_by_email(&req.email).await?.is_some() {
            return Err(AppError::conflict("Email is already in use"));
        }

        self.validator.validate(&req.password)?;
        let password_hash = self.hasher.hash_password(&req.password)?;

        let user = self
            .users
            .create(&CreateUser {
                username: username.to_string(),
                email: req.email,
                password_hash,
                display_name: req.display_name,
                role: req.role,
            })
            .await?;

        info!(user_id = %user.id, username = %user.username, role = %user.role, "User created");
        Ok(user)
    }

    /// Updates a user. Admins cannot change their own role or deactivate
    /// themselves; deactivating anyone else revokes their sessions.
    pub async fn update(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        req: AdminUpdateUserRequest,
    ) -> AppResult<User> {
        self.access.require_admin(&ctx.user)?;
        let target = self.find_user(user_id).await?;

        if let Some(role) = req.role {
            if user_id == ctx.user_id() && role != target.role {
                return Err(AppError::validation(
                    "Administrators cannot change their own role",
                ));
            }
        }
        if let Some(status) = req.status {
            if user_id == ctx.user_id() && !status.can_login() {
                return Err(AppError::validation(
                    "Administrators cannot deactivate their own account",
                ));
            }
        }

        if let Some(ref email) = req.email {
            if !email.contains('@') {
                return Err(AppError::validation("Invalid email address"));
            }
            if let Some(existing) = self.users.find_by_email(email).await? {
                if existing.id != user_id {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }
        }

        let mut user = self
            .users
            .update(&UpdateUser {
                id: user_id,
                email: req.email,
                display_name: req.display_name,
            })
            .await?;

        if let Some(role) = req.role {
            if role != user.role {
                user = self.users.update_role(user_id, role).await?;
                info!(user_id = %user_id, role = %role, "User role changed");
            }
        }

        if let Some(status) = req.status {
            if status != user.status {
                user = self.users.update_status(user_id, status).await?;
                info!(user_id = %user_id, status = %status, "User status changed");

                if !status.can_login() {
                    let revoked = self.sessions.revoke_all_for_user(user_id).await?;
                    info!(user_id = %user_id, revoked, "Sessions revoked for deactivated user");
                }
            }
        }

        Ok(user)
    }

    /// Deletes a user outright, along with their avatar file. Admins
    /// cannot delete themselves.
    pub async fn delete(&self, ctx: &RequestContext, user_id: Uuid) -> AppResult<()> {
        self.access.require_admin(&ctx.user)?;

        if user_id == ctx.user_id() {
            return Err(AppError::validation(
                "Administrators cannot delete their own account",
            ));
        }

        let target = self.find_user(user_id).await?;

        if !self.users.delete(user_id).await? {
            return Err(AppError::not_found("User not found"));
        }

        if let Some(avatar_path) = &target.avatar_path {
            if let Err(e) = self.storage.delete(avatar_path).await {
                warn!(path = %avatar_path, error = %e, "Failed to remove avatar of deleted user");
            }
        }

        info!(user_id = %user_id, actor = %ctx.user_id(), "User deleted");
        Ok(())
    }

    /// Sets a new password for a user and revokes their sessions; the
    /// next login must use the new password.
    pub async fn reset_password(
        &self,
        ctx: &RequestContext,
        user_id: Uuid,
        new_password: &str,
    ) -> AppResult<()> {
        self.access.require_admin(&ctx.user)?;
        self.find_user(user_id).await?;

        self.validator.validate(new_password)?;
        let password_hash = self.hasher.hash_password(new_password)?;
        self.users.update_password(user_id, &password_hash).await?;

        let revoked = self.sessions.revoke_all_for_user(user_id).await?;
        info!(user_id = %user_id, revoked, actor = %ctx.user_id(), "Password reset");
        Ok(())
    }

    async fn find_user(&self, user_id: Uuid) -> AppResult<User> {
        self.users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))
    }
}
