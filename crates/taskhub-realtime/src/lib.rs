//! # taskhub-realtime
//!
//! Real-time push for TaskHub:
//!
//! - WebSocket connection pool indexed by user
//! - Notification dispatch (persist + push to online users)
//! - Live chat message and unread-count pushes
//! - Presence tracking and heartbeat pruning
//!
//! The crate is transport-agnostic: the HTTP layer owns the actual
//! WebSocket upgrade and pumps messages between the socket and a
//! registered [`connection::ConnectionHandle`].

pub mod connection;
pub mod dispatcher;
pub mod engine;
pub mod message;

pub use connection::{ConnectionHandle, ConnectionPool};
pub use dispatcher::NotificationDispatcher;
pub use engine::RealtimeEngine;
pub use message::{InboundMessage, OutboundMessage};
