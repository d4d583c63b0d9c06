//! Typed configuration for the server binary.
//!
//! Settings come from layered TOML files read through the `config` crate
//! and deserialize into the structs below. Each sub-module holds one
//! section of the tree.

pub mod app;
pub mod auth;
pub mod logging;
pub mod realtime;
pub mod storage;
pub mod worker;

use serde::{Deserialize, Serialize};

pub use self::app::{CorsConfig, ServerConfig};
pub use self::auth::AuthConfig;
pub use self::logging::LoggingConfig;
pub use self::realtime::RealtimeConfig;
pub use self::storage::StorageConfig;
pub use self::worker::WorkerConfig;

use crate::error::AppError;

/// Top of the configuration tree.
///
/// Deserialized from the merged sources assembled in [`AppConfig::load`].
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AppConfig {
    /// HTTP server settings.
    pub server: ServerConfig,
    /// Database connection settings.
    pub database: DatabaseConfig,
    /// Authentication and session settings.
    pub auth: AuthConfig,
    /// Upload storage settings.
    pub storage: StorageConfig,
    /// Background worker settings.
    pub worker: WorkerConfig,
    /// Real-time WebSocket settings.
    pub realtime: RealtimeConfig,
    /// Logging settings.
    pub logging: LoggingConfig,
}

/// PostgreSQL pool settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Connection URL for the PostgreSQL server.
    pub url: String,
    /// Upper bound on pooled connections.
    #[serde(default = "default_pool_max")]
    pub max_connections: u32,
    /// Connections the pool keeps open when idle.
    #[serde(default = "default_pool_min")]
    pub min_connections: u32,
    /// Seconds to wait when acquiring a connection.
    #[serde(default = "default_connect_secs")]
    pub connect_timeout_seconds: u64,
    /// Seconds before an idle connection is closed.
    #[serde(default = "default_idle_secs")]
    pub idle_timeout_seconds: u64,
}

impl AppConfig {
    /// Assemble the configuration for `env`.
    ///
    /// Later sources win: `config/default.toml`, then `config/{env}.toml`,
    /// then `TASKHUB__`-prefixed environment variables where `__` separates
    /// nesting levels.
    pub fn load(env: &str) -> Result<Self, AppError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name(&format!("config/{env}")).required(false))
            .add_source(
                config::Environment::with_prefix("TASKHUB")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()
            .map_err(|e| AppError::configuration(format!("Failed to read configuration: {e}")))?;

        config
            .try_deserialize()
            .map_err(|e| AppError::configuration(format!("Invalid configuration: {e}")))
    }
}

fn default_pool_max() -> u32 {
    20
}

fn default_pool_min() -> u32 {
    5
}

fn default_connect_secs() -> u64 {
    10
}

fn default_idle_secs() -> u64 {
    300
}
