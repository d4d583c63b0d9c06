//! Inbound and outbound WebSocket message type definitions.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use taskhub_entity::chat::message::ChatMessage;
use taskhub_entity::notification::model::Notification;

/// Messages sent by the client to the server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// Liveness probe. The server echoes the timestamp back in a
    /// [`OutboundMessage::Pong`] and records the connection as alive.
    Ping {
        /// Client timestamp, echoed back.
        timestamp: i64,
    },
}

/// Messages sent by the server to the client.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    /// Sent once right after the connection is registered.
    Connected {
        /// Connection ID assigned by the server.
        connection_id: Uuid,
        /// Server time.
        timestamp: DateTime<Utc>,
    },
    /// Reply to a client ping.
    Pong {
        /// Echoed client timestamp.
        timestamp: i64,
    },
    /// A stored notification, pushed as it is created.
    Notification {
        /// The notification row, in the same shape the REST API returns.
        notification: Notification,
    },
    /// The user's current unread notification count.
    UnreadCount {
        /// Unread stored notifications.
        count: i64,
    },
    /// A new chat message in one of the user's conversations.
    ChatMessage {
        /// The message row.
        message: ChatMessage,
    },
    /// Another user went online or offline.
    PresenceChange {
        /// The user whose presence changed.
        user_id: Uuid,
        /// Display username.
        username: String,
        /// Whether the user is now online.
        online: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_outbound_wire_format() {
        let msg = OutboundMessage::UnreadCount { count: 3 };
        let json = serde_json::to_value(&msg).unwrap();
        assert_eq!(json["type"], "unread_count");
        assert_eq!(json["count"], 3);
    }

    #[test]
    fn test_inbound_ping_parses() {
        let msg: InboundMessage =
            serde_json::from_str(r#"{"type":"ping","timestamp":1700000000}"#).unwrap();
        let InboundMessage::Ping { timestamp } = msg;
        assert_eq!(timestamp, 1_700_000_000);
    }
}
