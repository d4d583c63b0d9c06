//! # taskhub-client
//!
//! Headless client library for TaskHub: authenticated REST access,
//! on-disk session and preference state, and the local notification
//! feed that merges server notifications with calendar events.
//!
//! ## Modules
//!
//! - `http` — authenticated REST client with automatic token refresh
//! - `session` — persisted access/refresh token pair and user
//! - `settings` — per-user notification preferences on disk
//! - `read_events` — per-user client-local read-set for calendar events
//! - `feed` — the merged notification feed and its badge rules
//! - `conversations` — live per-conversation unread counters
//! - `poller` — fixed-interval unread-count polling
//! - `ws` — live updates over the server's WebSocket endpoint

pub mod conversations;
pub mod error;
pub mod feed;
pub mod http;
pub mod poller;
pub mod read_events;
pub mod session;
pub mod settings;
pub mod ws;

pub use conversations::ConversationWatch;
pub use error::{ClientError, ClientResult};
pub use feed::{FeedItem, NotificationFeed};
pub use http::{ApiClient, AuthTokens};
pub use poller::CountPoller;
pub use read_events::ReadEventSet;
pub use session::{SessionStore, StoredSession};
pub use settings::{AppSettings, NotificationSettings, SettingsStore};
pub use ws::EventsListener;

/// Default directory for client state files.
///
/// Falls back to the current directory when the platform reports no
/// data directory.
pub fn default_state_dir() -> std::path::PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("taskhub")
}
