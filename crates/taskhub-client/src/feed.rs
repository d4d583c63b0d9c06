//! The local notification feed.
//!
//! Merges two sources with disjoint read-state ownership: stored
//! notifications, whose read flag lives on the server, and calendar
//! events, whose read state exists only in the client's persisted
//! read-set. The numeric badge tracks the server's unread count;
//! calendar items appear in the list but are never counted, so an
//! event can not be double-counted once a reminder notification for
//! it arrives.
//!
//! Rules, in order:
//! - master toggle off: the list is empty and the badge reads zero,
//!   whatever the server says;
//! - per-kind toggles hide matching items from the list only; admins
//!   bypass them (but not the master toggle);
//! - the badge is the last server-reported unread count, decremented
//!   optimistically on local mark-read and overwritten by the next
//!   poll or push.

use std::sync::{Arc, Mutex, MutexGuard};

use chrono::{DateTime, Utc};
use serde::Serialize;
use tokio::sync::watch;
use uuid::Uuid;

use taskhub_entity::event::CalendarEvent;
use taskhub_entity::notification::{Notification, NotificationKind};

use crate::error::ClientResult;
use crate::http::ApiClient;
use crate::read_events::ReadEventSet;
use crate::settings::NotificationSettings;

/// Notifications fetched per feed page.
const FEED_PAGE_SIZE: u64 = 25;

/// A single feed entry, from either source.
#[derive(Debug, Clone, Serialize)]
pub struct FeedItem {
    /// Notification ID or calendar event ID.
    pub id: Uuid,
    /// Item kind; calendar items carry [`NotificationKind::CalendarEvent`].
    pub kind: NotificationKind,
    /// Title line.
    pub title: String,
    /// Body text.
    pub body: String,
    /// Creation time, used for feed ordering.
    pub created_at: DateTime<Utc>,
}

impl FeedItem {
    fn from_notification(notification: &Notification) -> Self {
        Self {
            id: notification.id,
            kind: notification.kind,
            title: notification.title.clone(),
            body: notification.body.clone(),
            created_at: notification.created_at,
        }
    }

    fn from_event(event: &CalendarEvent) -> Self {
        let body = event.description.clone().unwrap_or_else(|| {
            format!("Starts at {}", event.start_time.format("%Y-%m-%d %H:%M UTC"))
        });
        Self {
            id: event.id,
            kind: NotificationKind::CalendarEvent,
            title: event.title.clone(),
            body,
            created_at: event.created_at,
        }
    }
}

/// Merge, filter, and read-state rules, kept free of transport so they
/// are testable in isolation.
struct FeedState {
    settings: NotificationSettings,
    is_admin: bool,
    read_events: ReadEventSet,
    notifications: Vec<Notification>,
    events: Vec<CalendarEvent>,
    unread_count: i64,
    open: bool,
}

impl FeedState {
    fn new(settings: NotificationSettings, is_admin: bool, read_events: ReadEventSet) -> Self {
        Self {
            settings,
            is_admin,
            read_events,
            notifications: Vec::new(),
            events: Vec::new(),
            unread_count: 0,
            open: false,
        }
    }

    fn set_notifications(&mut self, notifications: Vec<Notification>) {
        self.notifications = notifications;
    }

    fn set_events(&mut self, events: Vec<CalendarEvent>) {
        self.events = events;
    }

    fn push_notification(&mut self, notification: Notification) {
        if self.notifications.iter().any(|n| n.id == notification.id) {
            return;
        }
        self.notifications.insert(0, notification);
    }

    fn kind_visible(&self, kind: NotificationKind) -> bool {
        self.is_admin || self.settings.kind_enabled(kind)
    }

    fn items(&self) -> Vec<FeedItem> {
        if !self.settings.enabled {
            return Vec::new();
        }
        let mut items: Vec<FeedItem> = self
            .notifications
            .iter()
            .filter(|n| self.kind_visible(n.kind))
            .map(FeedItem::from_notification)
            .collect();
        if self.kind_visible(NotificationKind::CalendarEvent) {
            items.extend(
                self.events
                    .iter()
                    .filter(|e| !self.read_events.contains(e.id))
                    .map(FeedItem::from_event),
            );
        }
        // Stable sort: items with equal timestamps keep their relative
        // order, which is unspecified and acceptable.
        items.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        items
    }

    fn badge_count(&self) -> i64 {
        if !self.settings.enabled {
            return 0;
        }
        self.unread_count.max(0)
    }

    /// Mark one item read. Returns the ID to confirm with the server
    /// when the item was a stored notification.
    fn mark_read(&mut self, id: Uuid) -> ClientResult<Option<Uuid>> {
        if let Some(pos) = self.notifications.iter().position(|n| n.id == id) {
            self.notifications.remove(pos);
            self.unread_count = (self.unread_count - 1).max(0);
            return Ok(Some(id));
        }
        if self.events.iter().any(|e| e.id == id) && self.read_events.insert(id) {
            self.read_events.save()?;
        }
        Ok(None)
    }

    /// Mark everything currently held read. Returns the notification
    /// IDs to confirm with the server; only the fetched page is
    /// touched, never the rest of the server's table.
    fn mark_all_read(&mut self) -> ClientResult<Vec<Uuid>> {
        let ids: Vec<Uuid> = self.notifications.drain(..).map(|n| n.id).collect();
        self.unread_count = (self.unread_count - ids.len() as i64).max(0);

        let mut dirty = false;
        for event in &self.events {
            dirty |= self.read_events.insert(event.id);
        }
        if dirty {
            self.read_events.save()?;
        }
        Ok(ids)
    }
}

/// Shared, live view of the user's notifications.
///
/// Wraps the merge rules with transport: polls feed the state, local
/// mutations apply immediately and confirm with the server in the
/// background. Server calls that fail are logged and left for the next
/// poll to reconcile. Background confirmation requires a running Tokio
/// runtime.
pub struct NotificationFeed {
    api: Arc<ApiClient>,
    state: Mutex<FeedState>,
    revision: watch::Sender<u64>,
}

impl NotificationFeed {
    /// Create an empty feed; call [`NotificationFeed::refresh`] to fill it.
    pub fn new(
        api: Arc<ApiClient>,
        settings: NotificationSettings,
        is_admin: bool,
        read_events: ReadEventSet,
    ) -> Self {
        let (revision, _) = watch::channel(0);
        Self {
            api,
            state: Mutex::new(FeedState::new(settings, is_admin, read_events)),
            revision,
        }
    }

    /// Subscribe to a counter that bumps whenever feed content changes.
    pub fn subscribe(&self) -> watch::Receiver<u64> {
        self.revision.subscribe()
    }

    /// Fetch the unread page, the event list, and the unread count.
    pub async fn refresh(&self) -> ClientResult<()> {
        let count = self.api.unread_count().await?;
        self.lock().unread_count = count;
        self.refresh_lists().await?;
        self.touch();
        Ok(())
    }

    /// Periodic tick: refresh the count, and the lists too while the
    /// feed is open.
    pub async fn poll(&self) -> ClientResult<()> {
        let count = self.api.unread_count().await?;
        self.lock().unread_count = count;
        if self.is_open() {
            self.refresh_lists().await?;
        }
        self.touch();
        Ok(())
    }

    /// Record whether the feed is being displayed.
    pub fn set_open(&self, open: bool) {
        self.lock().open = open;
    }

    /// Whether the feed is currently displayed.
    pub fn is_open(&self) -> bool {
        self.lock().open
    }

    /// The merged, filtered list, newest first.
    pub fn items(&self) -> Vec<FeedItem> {
        self.lock().items()
    }

    /// The badge number.
    pub fn badge_count(&self) -> i64 {
        self.lock().badge_count()
    }

    /// The live notification settings.
    pub fn settings(&self) -> NotificationSettings {
        self.lock().settings.clone()
    }

    /// Replace the live notification settings.
    pub fn update_settings(&self, settings: NotificationSettings) {
        self.lock().settings = settings;
        self.touch();
    }

    /// Mark one item read.
    ///
    /// Stored notifications leave the list at once and the badge drops
    /// by one; the server call runs in the background. Calendar events
    /// only join the persisted read-set.
    pub fn mark_read(&self, id: Uuid) -> ClientResult<()> {
        let confirm = self.lock().mark_read(id)?;
        if let Some(id) = confirm {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                if let Err(err) = api.mark_notification_read(id).await {
                    tracing::warn!(notification_id = %id, error = %err, "mark-read failed");
                }
            });
        }
        self.touch();
        Ok(())
    }

    /// Mark every held item read: empties the notification list and
    /// moves all known events into the read-set. Repeating the call
    /// changes nothing.
    pub fn mark_all_read(&self) -> ClientResult<()> {
        let ids = self.lock().mark_all_read()?;
        if !ids.is_empty() {
            let api = Arc::clone(&self.api);
            tokio::spawn(async move {
                for id in ids {
                    if let Err(err) = api.mark_notification_read(id).await {
                        tracing::warn!(notification_id = %id, error = %err, "mark-read failed");
                    }
                }
            });
        }
        self.touch();
        Ok(())
    }

    /// Take in a notification pushed over the live connection.
    pub fn apply_notification(&self, notification: Notification) {
        self.lock().push_notification(notification);
        self.touch();
    }

    /// Take in an unread count pushed over the live connection.
    pub fn apply_unread_count(&self, count: i64) {
        self.lock().unread_count = count;
        self.touch();
    }

    async fn refresh_lists(&self) -> ClientResult<()> {
        let page = self.api.unread_notifications(1, FEED_PAGE_SIZE).await?;
        let events = self.api.events(None, None).await?;
        let mut state = self.lock();
        state.set_notifications(page.items);
        state.set_events(events);
        Ok(())
    }

    fn lock(&self) -> MutexGuard<'_, FeedState> {
        self.state.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn touch(&self) {
        self.revision.send_modify(|r| *r += 1);
    }
}
