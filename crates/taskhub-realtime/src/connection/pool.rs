//! Connection pool — tracks all active connections indexed by user ID.

use std::sync::Arc;

use dashmap::DashMap;
use uuid::Uuid;

use crate::message::OutboundMessage;

use super::handle::{ConnectionHandle, ConnectionId};

/// Thread-safe pool of all active WebSocket connections.
#[derive(Debug, Default)]
pub struct ConnectionPool {
    /// User ID → connection handles (one user can have several tabs open).
    by_user: DashMap<Uuid, Vec<Arc<ConnectionHandle>>>,
    /// Connection ID → connection handle for direct lookup.
    by_id: DashMap<ConnectionId, Arc<ConnectionHandle>>,
}

impl ConnectionPool {
    /// Creates a new empty connection pool.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection to the pool.
    pub fn add(&self, handle: Arc<ConnectionHandle>) {
        self.by_id.insert(handle.id, handle.clone());
        self.by_user.entry(handle.user_id).or_default().push(handle);
    }

    /// Removes a connection from the pool.
    pub fn remove(&self, conn_id: &ConnectionId) -> Option<Arc<ConnectionHandle>> {
        let (_, handle) = self.by_id.remove(conn_id)?;
        if let Some(mut connections) = self.by_user.get_mut(&handle.user_id) {
            connections.retain(|c| c.id != *conn_id);
            if connections.is_empty() {
                drop(connections);
                self.by_user.remove(&handle.user_id);
            }
        }
        Some(handle)
    }

    /// Gets all connections for a user.
    pub fn user_connections(&self, user_id: &Uuid) -> Vec<Arc<ConnectionHandle>> {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().clone())
            .unwrap_or_default()
    }

    /// Whether the user has at least one live connection.
    pub fn is_online(&self, user_id: &Uuid) -> bool {
        self.by_user
            .get(user_id)
            .map(|entry| entry.value().iter().any(|c| c.is_alive()))
            .unwrap_or(false)
    }

    /// Sends a message to every live connection of a user.
    pub fn send_to_user(&self, user_id: &Uuid, msg: &OutboundMessage) {
        for handle in self.user_connections(user_id) {
            handle.send(msg.clone());
        }
    }

    /// Sends a message to every connected user.
    pub fn broadcast(&self, msg: &OutboundMessage) {
        for entry in self.by_id.iter() {
            entry.value().send(msg.clone());
        }
    }

    /// Returns all connection handles.
    pub fn all_connections(&self) -> Vec<Arc<ConnectionHandle>> {
        self.by_id.iter().map(|e| e.value().clone()).collect()
    }

    /// Returns total number of tracked connections.
    pub fn connection_count(&self) -> usize {
        self.by_id.len()
    }

    /// Returns number of unique connected users.
    pub fn user_count(&self) -> usize {
        self.by_user.len()
    }
}

#[cfg(test)]
mod tests {
    use tokio::sync::mpsc;

    use super::*;

    fn handle_for(user_id: Uuid) -> Arc<ConnectionHandle> {
        let (tx, rx) = mpsc::channel(4);
        // Receiver leaks in tests so sends stay open.
        std::mem::forget(rx);
        Arc::new(ConnectionHandle::new(
            user_id,
            Uuid::new_v4(),
            "user".into(),
            tx,
        ))
    }

    #[tokio::test]
    async fn test_add_remove_tracks_presence() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();

        assert!(!pool.is_online(&user));

        let first = handle_for(user);
        let second = handle_for(user);
        pool.add(first.clone());
        pool.add(second.clone());

        assert!(pool.is_online(&user));
        assert_eq!(pool.connection_count(), 2);
        assert_eq!(pool.user_count(), 1);

        pool.remove(&first.id);
        assert!(pool.is_online(&user));

        pool.remove(&second.id);
        assert!(!pool.is_online(&user));
        assert_eq!(pool.user_count(), 0);
    }

    #[tokio::test]
    async fn test_dead_connections_do_not_count_as_online() {
        let pool = ConnectionPool::new();
        let user = Uuid::new_v4();
        let handle = handle_for(user);
        pool.add(handle.clone());

        handle.mark_dead();
        assert!(!pool.is_online(&user));
    }
}
