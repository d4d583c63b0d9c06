//! Realtime engine — connection registration, heartbeat, and presence.

use std::sync::Arc;

use tokio::sync::{mpsc, watch};
use tracing::{debug, info};
use uuid::Uuid;

use taskhub_core::config::RealtimeConfig;

use crate::connection::{ConnectionHandle, ConnectionId, ConnectionPool};
use crate::message::{InboundMessage, OutboundMessage};

/// Owns the connection pool and its lifecycle rules.
///
/// The HTTP layer performs the WebSocket upgrade and authentication,
/// then registers the connection here and pumps messages between the
/// socket and the handle's channel.
#[derive(Debug)]
pub struct RealtimeEngine {
    pool: Arc<ConnectionPool>,
    config: RealtimeConfig,
}

impl RealtimeEngine {
    /// Creates a new engine.
    pub fn new(config: RealtimeConfig) -> Self {
        Self {
            pool: Arc::new(ConnectionPool::new()),
            config,
        }
    }

    /// The shared connection pool.
    pub fn pool(&self) -> Arc<ConnectionPool> {
        self.pool.clone()
    }

    /// Registers a new authenticated connection and returns the handle
    /// together with the receiver half the socket task drains.
    ///
    /// When the user is already at the connection limit, the oldest
    /// connection is dropped to make room; a stale tab should never
    /// lock a user out.
    pub fn register(
        &self,
        user_id: Uuid,
        session_id: Uuid,
        username: String,
    ) -> (Arc<ConnectionHandle>, mpsc::Receiver<OutboundMessage>) {
        let existing = self.pool.user_connections(&user_id);
        if existing.len() >= self.config.max_connections_per_user {
            if let Some(oldest) = existing.iter().min_by_key(|c| c.connected_at) {
                debug!(user_id = %user_id, connection_id = %oldest.id, "Connection limit reached, dropping oldest");
                oldest.mark_dead();
                self.pool.remove(&oldest.id);
            }
        }

        let went_online = !self.pool.is_online(&user_id);

        let (tx, rx) = mpsc::channel(self.config.channel_buffer_size);
        let handle = Arc::new(ConnectionHandle::new(
            user_id,
            session_id,
            username.clone(),
            tx,
        ));
        self.pool.add(handle.clone());

        handle.send(OutboundMessage::Connected {
            connection_id: handle.id,
            timestamp: chrono::Utc::now(),
        });

        if went_online {
            self.pool.broadcast(&OutboundMessage::PresenceChange {
                user_id,
                username,
                online: true,
            });
        }

        info!(user_id = %user_id, connection_id = %handle.id, "WebSocket connected");
        (handle, rx)
    }

    /// Unregisters a connection, broadcasting a presence change when the
    /// user's last connection goes away.
    pub fn unregister(&self, conn_id: &ConnectionId) {
        if let Some(handle) = self.pool.remove(conn_id) {
            handle.mark_dead();
            info!(user_id = %handle.user_id, connection_id = %conn_id, "WebSocket disconnected");

            if !self.pool.is_online(&handle.user_id) {
                self.pool.broadcast(&OutboundMessage::PresenceChange {
                    user_id: handle.user_id,
                    username: handle.username.clone(),
                    online: false,
                });
            }
        }
    }

    /// Handles a parsed inbound message, returning an optional direct
    /// reply for the socket task to send.
    pub fn handle_inbound(
        &self,
        handle: &ConnectionHandle,
        msg: InboundMessage,
    ) -> Option<OutboundMessage> {
        match msg {
            InboundMessage::Ping { timestamp } => {
                handle.record_ping();
                Some(OutboundMessage::Pong { timestamp })
            }
        }
    }

    /// Spawns the heartbeat task that prunes connections which stopped
    /// pinging. Runs until the shutdown signal flips.
    pub fn spawn_heartbeat(
        self: &Arc<Self>,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        let engine = self.clone();
        let interval = std::time::Duration::from_secs(engine.config.ping_interval_seconds);
        let max_silence =
            (engine.config.ping_interval_seconds + engine.config.ping_timeout_seconds) as i64;

        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(interval);
            loop {
                tokio::select! {
                    _ = ticker.tick() => {
                        engine.prune_stale(max_silence);
                    }
                    _ = shutdown.changed() => {
                        if *shutdown.borrow() {
                            debug!("Heartbeat task stopping");
                            break;
                        }
                    }
                }
            }
        })
    }

    /// Drops connections that have been silent longer than `max_silence`
    /// seconds or whose socket task already died.
    fn prune_stale(&self, max_silence: i64) {
        let stale: Vec<ConnectionId> = self
            .pool
            .all_connections()
            .iter()
            .filter(|c| !c.is_alive() || c.seconds_since_ping() > max_silence)
            .map(|c| c.id)
            .collect();

        for conn_id in stale {
            debug!(connection_id = %conn_id, "Pruning stale connection");
            self.unregister(&conn_id);
        }
    }
}
