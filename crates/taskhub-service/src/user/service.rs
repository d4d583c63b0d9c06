//! User self-service operations — profile, password changes, avatars.

use std::sync::Arc;

use bytes::Bytes;
use tracing::{info, warn};
use uuid::Uuid;

use taskhub_auth::{PasswordHasher, PasswordValidator};
use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::traits::storage::{ByteStream, StorageProvider};
use taskhub_database::repositories::UserRepository;
use taskhub_entity::user::model::UpdateUser;
use taskhub_entity::user::User;
use taskhub_storage::{paths, UploadPolicy};

use crate::context::RequestContext;

/// Handles user self-service operations.
#[derive(Debug, Clone)]
pub struct UserService {
    /// User repository.
    users: Arc<UserRepository>,
    /// Storage provider for avatar images.
    storage: Arc<dyn StorageProvider>,
    /// Upload validation policy.
    policy: UploadPolicy,
    /// Password hasher.
    hasher: Arc<PasswordHasher>,
    /// Password validator.
    validator: Arc<PasswordValidator>,
}

/// Data for updating a user's own profile.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct UpdateProfileRequest {
    /// New display name (optional).
    pub display_name: Option<String>,
    /// New email (optional).
    pub email: Option<String>,
}

impl UserService {
    /// Creates a new user service.
    pub fn new(
        users: Arc<UserRepository>,
        storage: Arc<dyn StorageProvider>,
        policy: UploadPolicy,
        hasher: Arc<PasswordHasher>,
        validator: Arc<PasswordValidator>,
    ) -> Self {
        Self {
            users,
            storage,
            policy,
            hasher,
            validator,
        }
    }

    /// The current user's profile. The context row was loaded for this
    /// request, so no second query is needed.
    pub fn profile(&self, ctx: &RequestContext) -> User {
        ctx.user.clone()
    }

    /// Updates the current user's profile fields.
    pub async fn update_profile(
        &self,
        ctx: &RequestContext,
        req: UpdateProfileRequest,
    ) -> AppResult<User> {
        if let Some(ref display_name) = req.display_name {
            if display_name.trim().is_empty() {
                return Err(AppError::validation("Display name cannot be empty"));
            }
        }

        if let Some(ref email) = req.email {
            if !email.contains('@') {
                return Err(AppError::validation("Invalid email address"));
            }
            if let Some(existing) = self.users.find_by_email(email).await? {
                if existing.id != ctx.user_id() {
                    return Err(AppError::conflict("Email is already in use"));
                }
            }
        }

        let updated = self
            .users
            .update(&UpdateUser {
                id: ctx.user_id(),
                email: req.email,
                display_name: req.display_name,
            })
            .await?;

        info!(user_id = %ctx.user_id(), "Profile updated");
        Ok(updated)
    }

    /// Changes the current user's password. Existing sessions stay
    /// valid; the user proved they hold the current password.
    pub async fn change_password(
        &self,
        ctx: &RequestContext,
        current_password: &str,
        new_password: &str,
    ) -> AppResult<()> {
        let valid = self
            .hasher
            .verify_password(current_password, &ctx.user.password_hash)?;
        if !valid {
            return Err(AppError::authentication("Current password is incorrect"));
        }

        self.validator.validate(new_password)?;
        self.validator
            .validate_not_same(current_password, new_password)?;

        let new_hash = self.hasher.hash_password(new_password)?;
        self.users
            .update_password(ctx.user_id(), &new_hash)
            .await?;

        info!(user_id = %ctx.user_id(), "Password changed");
        Ok(())
    }

    /// Replaces the current user's avatar. The payload must be a real
    /// image; the previous file is removed when its path changes.
    pub async fn upload_avatar(
        &self,
        ctx: &RequestContext,
        file_name: &str,
        data: Bytes,
    ) -> AppResult<User> {
        let validated = self.policy.validate_avatar(file_name, &data)?;
        let path = paths::avatar_path(ctx.user_id(), &validated.extension);

        self.storage.write(&path, data).await?;
        let updated = self.users.update_avatar(ctx.user_id(), &path).await?;

        // A format change leaves the old file under another extension.
        if let Some(old_path) = &ctx.user.avatar_path {
            if old_path != &path {
                if let Err(e) = self.storage.delete(old_path).await {
                    warn!(path = %old_path, error = %e, "Failed to remove previous avatar");
                }
            }
        }

        info!(user_id = %ctx.user_id(), size = validated.size_bytes, "Avatar uploaded");
        Ok(updated)
    }

    /// Opens a user's avatar for download. Avatars are visible to every
    /// authenticated user.
    pub async fn avatar(&self, _ctx: &RequestContext, user_id: Uuid) -> AppResult<(User, ByteStream)> {
        let user = self
            .users
            .find_by_id(user_id)
            .await?
            .ok_or_else(|| AppError::not_found("User not found"))?;

        let path = user
            .avatar_path
            .clone()
            .ok_or_else(|| AppError::not_found("User has no avatar"))?;

        let stream = self.storage.read(&path).await?;
        Ok((user, stream))
    }
}
