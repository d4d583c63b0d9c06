//! Notification dispatcher — persists notification rows and pushes them
//! to online users.

use std::sync::Arc;

use tracing::error;
use uuid::Uuid;

use taskhub_database::repositories::NotificationRepository;
use taskhub_entity::chat::message::ChatMessage;
use taskhub_entity::notification::model::CreateNotification;

use crate::connection::ConnectionPool;
use crate::message::OutboundMessage;

/// Routes notifications to storage and to live WebSocket connections.
///
/// Dispatch is fire-and-forget: callers have already committed their own
/// writes, so failures here are logged and swallowed rather than bubbled
/// up into the original request.
#[derive(Debug, Clone)]
pub struct NotificationDispatcher {
    pool: Arc<ConnectionPool>,
    notifications: Arc<NotificationRepository>,
}

impl NotificationDispatcher {
    /// Creates a new dispatcher.
    pub fn new(pool: Arc<ConnectionPool>, notifications: Arc<NotificationRepository>) -> Self {
        Self {
            pool,
            notifications,
        }
    }

    /// Whether the user currently has a live connection.
    pub fn is_online(&self, user_id: Uuid) -> bool {
        self.pool.is_online(&user_id)
    }

    /// Stores a notification row and, when the recipient is online,
    /// pushes it together with a fresh unread count.
    pub async fn dispatch(&self, data: CreateNotification) {
        let user_id = data.user_id;
        let notification = match self.notifications.create(&data).await {
            Ok(n) => n,
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to store notification");
                return;
            }
        };

        if self.pool.is_online(&user_id) {
            self.pool
                .send_to_user(&user_id, &OutboundMessage::Notification { notification });
            self.push_unread_count(user_id).await;
        }
    }

    /// Dispatches a batch of notifications.
    pub async fn dispatch_all(&self, batch: Vec<CreateNotification>) {
        for data in batch {
            self.dispatch(data).await;
        }
    }

    /// Stores a notification only when the recipient is offline. Used
    /// for chat: online members see the message arrive live, so a stored
    /// notification would only duplicate it.
    pub async fn dispatch_if_offline(&self, data: CreateNotification) {
        if !self.pool.is_online(&data.user_id) {
            self.dispatch(data).await;
        }
    }

    /// Pushes a chat message to every listed member who is online.
    pub fn push_chat_message(&self, member_ids: &[Uuid], message: &ChatMessage) {
        for member_id in member_ids {
            if self.pool.is_online(member_id) {
                self.pool.send_to_user(
                    member_id,
                    &OutboundMessage::ChatMessage {
                        message: message.clone(),
                    },
                );
            }
        }
    }

    /// Pushes the user's current unread count to their connections.
    pub async fn push_unread_count(&self, user_id: Uuid) {
        match self.notifications.count_unread(user_id).await {
            Ok(count) => {
                self.pool
                    .send_to_user(&user_id, &OutboundMessage::UnreadCount { count });
            }
            Err(e) => {
                error!(user_id = %user_id, error = %e, "Failed to count unread notifications");
            }
        }
    }
}
