//! Periodic badge refresh.
//!
//! The unread count is polled on a fixed interval whether or not the
//! feed is displayed; the full lists are refetched only while it is.
//! Poll failures are logged and the next tick tries again.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tokio::time::MissedTickBehavior;

use crate::feed::NotificationFeed;

/// Default poll interval.
const DEFAULT_INTERVAL: Duration = Duration::from_secs(30);

/// Drives [`NotificationFeed::poll`] on a fixed interval.
pub struct CountPoller {
    feed: Arc<NotificationFeed>,
    interval: Duration,
}

impl CountPoller {
    /// Create a poller with the default 30 second interval.
    pub fn new(feed: Arc<NotificationFeed>) -> Self {
        Self {
            feed,
            interval: DEFAULT_INTERVAL,
        }
    }

    /// Override the poll interval.
    pub fn with_interval(mut self, interval: Duration) -> Self {
        self.interval = interval;
        self
    }

    /// Spawn the poll loop. The first tick fires immediately; the loop
    /// stops when `shutdown` flips to `true` or its sender drops.
    pub fn spawn(self, mut shutdown: watch::Receiver<bool>) -> JoinHandle<()> {
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(self.interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        if let Err(err) = self.feed.poll().await {
                            tracing::warn!(error = %err, "unread-count poll failed");
                        }
                    }
                    changed = shutdown.changed() => {
                        if changed.is_err() || *shutdown.borrow() {
                            break;
                        }
                    }
                }
            }
            tracing::debug!("count poller stopped");
        })
    }
}
