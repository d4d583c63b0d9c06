//! WebSocket engine settings.

use serde::{Deserialize, Serialize};

/// Tunables for the real-time connection pool.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RealtimeConfig {
    /// Simultaneous sockets one user may hold before the oldest is dropped.
    #[serde(default = "default_max_connections_per_user")]
    pub max_connections_per_user: usize,
    /// Buffer size of each connection's outbound message channel.
    #[serde(default = "default_channel_buffer")]
    pub channel_buffer_size: usize,
    /// Seconds between server-initiated pings.
    #[serde(default = "default_ping_interval")]
    pub ping_interval_seconds: u64,
    /// Seconds to wait for a pong before the socket is considered dead.
    #[serde(default = "default_ping_timeout")]
    pub ping_timeout_seconds: u64,
}

fn default_max_connections_per_user() -> usize {
    5
}

fn default_channel_buffer() -> usize {
    256
}

fn default_ping_interval() -> u64 {
    30
}

fn default_ping_timeout() -> u64 {
    10
}
