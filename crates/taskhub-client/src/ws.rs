//! Live updates over the server's WebSocket endpoint.
//!
//! Frames mirror the server wire format: JSON objects tagged by a
//! `type` field. Notification and unread-count frames feed the local
//! aggregation; chat frames feed the optional conversation watch;
//! presence frames are surfaced in logs only. A frame that fails to
//! parse is logged and skipped, never fatal.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use futures::{SinkExt, StreamExt};
use serde::Deserialize;
use tokio::sync::watch;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use uuid::Uuid;

use taskhub_entity::chat::ChatMessage;
use taskhub_entity::notification::Notification;

use crate::conversations::ConversationWatch;
use crate::error::ClientResult;
use crate::feed::NotificationFeed;
use crate::http::ApiClient;

/// Server-to-client frames.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ServerEvent {
    /// Handshake confirmation.
    Connected {
        connection_id: Uuid,
        #[allow(dead_code)]
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client ping.
    Pong {
        #[allow(dead_code)]
        timestamp: i64,
    },
    /// A stored notification, pushed as it is created.
    Notification { notification: Notification },
    /// The user's current unread count.
    UnreadCount { count: i64 },
    /// A new chat message in one of the user's conversations.
    ChatMessage { message: ChatMessage },
    /// Another user went online or offline.
    PresenceChange {
        #[allow(dead_code)]
        user_id: Uuid,
        username: String,
        online: bool,
    },
}

/// Connects to the live endpoint and routes frames into the feed.
pub struct EventsListener {
    api: Arc<ApiClient>,
    feed: Arc<NotificationFeed>,
    conversations: Option<Arc<ConversationWatch>>,
}

impl EventsListener {
    /// Create a listener feeding `feed`.
    pub fn new(api: Arc<ApiClient>, feed: Arc<NotificationFeed>) -> Self {
        Self {
            api,
            feed,
            conversations: None,
        }
    }

    /// Also route chat frames into `watch`.
    pub fn with_conversations(mut self, watch: Arc<ConversationWatch>) -> Self {
        self.conversations = Some(watch);
        self
    }

    /// Connect and route frames until the server closes the connection
    /// or `shutdown` flips to `true`.
    ///
    /// Returns `Ok` on an orderly close; callers that want a persistent
    /// connection reconnect with their own backoff.
    pub async fn run(&self, mut shutdown: watch::Receiver<bool>) -> ClientResult<()> {
        let url = self.api.ws_url()?;
        let (stream, _) = connect_async(&url).await?;
        tracing::debug!("live connection opened");
        let (mut sink, mut source) = stream.split();

        loop {
            tokio::select! {
                frame = source.next() => {
                    match frame {
                        Some(Ok(Message::Text(text))) => self.route(text.as_str()),
                        Some(Ok(Message::Close(_))) | None => break,
                        Some(Ok(_)) => {}
                        Some(Err(err)) => return Err(err.into()),
                    }
                }
                changed = shutdown.changed() => {
                    if changed.is_err() || *shutdown.borrow() {
                        let _ = sink.send(Message::Close(None)).await;
                        break;
                    }
                }
            }
        }
        tracing::debug!("live connection closed");
        Ok(())
    }

    fn route(&self, raw: &str) {
        match serde_json::from_str::<ServerEvent>(raw) {
            Ok(ServerEvent::Notification { notification }) => {
                self.feed.apply_notification(notification);
            }
            Ok(ServerEvent::UnreadCount { count }) => {
                self.feed.apply_unread_count(count);
            }
            Ok(ServerEvent::Connected { connection_id, .. }) => {
                tracing::debug!(%connection_id, "registered with server");
            }
            Ok(ServerEvent::ChatMessage { message }) => {
                tracing::debug!(conversation_id = %message.conversation_id, "chat message received");
                if let Some(watch) = &self.conversations {
                    watch.apply_message(&message);
                }
            }
            Ok(ServerEvent::PresenceChange { username, online, .. }) => {
                tracing::trace!(%username, online, "presence change");
            }
            Ok(ServerEvent::Pong { .. }) => {}
            Err(err) => {
                tracing::warn!(error = %err, "skipping unparseable frame");
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::read_events::ReadEventSet;
    use crate::session::SessionStore;
    use crate::settings::NotificationSettings;
    use taskhub_entity::notification::NotificationKind;

    fn listener(dir: &std::path::Path) -> EventsListener {
        let session = Arc::new(SessionStore::open(dir).unwrap());
        let api = Arc::new(ApiClient::new("http://127.0.0.1:9", session));
        let read_events = ReadEventSet::open(dir, Uuid::new_v4()).unwrap();
        let feed = Arc::new(NotificationFeed::new(
            api.clone(),
            NotificationSettings::default(),
            false,
            read_events,
        ));
        EventsListener::new(api, feed)
    }

    #[test]
    fn test_notification_frame_enters_feed() {
        let dir = tempfile::tempdir().unwrap();
        let listener = listener(dir.path());

        let raw = serde_json::json!({
            "type": "notification",
            "notification": {
                "id": Uuid::new_v4(),
                "user_id": Uuid::new_v4(),
                "kind": "task_assigned",
                "title": "Task assigned to you",
                "body": "Prepare release notes",
                "is_read": false,
                "read_at": null,
                "actor_id": null,
                "task_id": null,
                "conversation_id": null,
                "event_id": null,
                "created_at": Utc::now(),
            }
        })
        .to_string();
        listener.route(&raw);

        let items = listener.feed.items();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].kind, NotificationKind::TaskAssigned);
    }

    #[test]
    fn test_unread_count_frame_updates_badge() {
        let dir = tempfile::tempdir().unwrap();
        let listener = listener(dir.path());

        listener.route(r#"{"type":"unread_count","count":9}"#);
        assert_eq!(listener.feed.badge_count(), 9);
    }

    #[test]
    fn test_chat_frame_bumps_conversation_watch() {
        let dir = tempfile::tempdir().unwrap();
        let watch = Arc::new(ConversationWatch::new(Uuid::new_v4()));
        let listener = listener(dir.path()).with_conversations(Arc::clone(&watch));

        let conversation_id = Uuid::new_v4();
        let raw = serde_json::json!({
            "type": "chat_message",
            "message": {
                "id": Uuid::new_v4(),
                "conversation_id": conversation_id,
                "sender_id": Uuid::new_v4(),
                "body": "ping",
                "attachment_path": null,
                "attachment_name": null,
                "attachment_mime": null,
                "created_at": Utc::now(),
            }
        })
        .to_string();
        listener.route(&raw);

        assert_eq!(watch.unread(conversation_id), 1);
        assert!(listener.feed.items().is_empty());
    }

    #[test]
    fn test_garbage_frame_is_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let listener = listener(dir.path());

        listener.route("not json at all");
        listener.route(r#"{"type":"mystery","payload":1}"#);
        assert!(listener.feed.items().is_empty());
        assert_eq!(listener.feed.badge_count(), 0);
    }
}
