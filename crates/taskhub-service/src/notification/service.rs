//! Notification queries and read-state changes for the current user.

use std::sync::Arc;

use tracing::info;
use uuid::Uuid;

use taskhub_core::error::AppError;
use taskhub_core::result::AppResult;
use taskhub_core::types::pagination::{PageRequest, PageResponse};
use taskhub_database::repositories::NotificationRepository;
use taskhub_entity::notification::model::Notification;
use taskhub_realtime::NotificationDispatcher;

use crate::context::RequestContext;

/// Serves a user's stored notifications.
///
/// Calendar pseudo-notifications never appear here; clients merge those
/// into their feed themselves.
#[derive(Debug, Clone)]
pub struct NotificationService {
    /// Notification repository.
    notifications: Arc<NotificationRepository>,
    /// Realtime dispatcher, used to push refreshed unread counts.
    dispatcher: Arc<NotificationDispatcher>,
}

impl NotificationService {
    /// Creates a new notification service.
    pub fn new(
        notifications: Arc<NotificationRepository>,
        dispatcher: Arc<NotificationDispatcher>,
    ) -> Self {
        Self {
            notifications,
            dispatcher,
        }
    }

    /// Lists the current user's notifications, newest first.
    pub async fn list(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notifications.find_by_user(ctx.user_id(), page).await
    }

    /// Lists only unread notifications, newest first.
    pub async fn list_unread(
        &self,
        ctx: &RequestContext,
        page: &PageRequest,
    ) -> AppResult<PageResponse<Notification>> {
        self.notifications
            .find_unread_by_user(ctx.user_id(), page)
            .await
    }

    /// Counts the current user's unread notifications.
    pub async fn unread_count(&self, ctx: &RequestContext) -> AppResult<i64> {
        self.notifications.count_unread(ctx.user_id()).await
    }

    /// Marks one notification as read. Re-marking an already-read
    /// notification succeeds without changing its read time.
    pub async fn mark_read(&self, ctx: &RequestContext, id: Uuid) -> AppResult<()> {
        let matched = self.notifications.mark_read(id, ctx.user_id()).await?;
        if !matched {
            return Err(AppError::not_found("Notification not found"));
        }

        // Other open connections see the updated badge immediately.
        self.dispatcher.push_unread_count(ctx.user_id()).await;
        Ok(())
    }

    /// Marks every unread notification as read. Returns how many were
    /// affected.
    pub async fn mark_all_read(&self, ctx: &RequestContext) -> AppResult<i64> {
        let count = self.notifications.mark_all_read(ctx.user_id()).await?;
        if count > 0 {
            info!(user_id = %ctx.user_id(), count, "Marked all notifications read");
            self.dispatcher.push_unread_count(ctx.user_id()).await;
        }
        Ok(count)
    }
}
