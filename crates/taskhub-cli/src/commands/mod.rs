//! CLI command definitions and dispatch.

pub mod auth;
pub mod migrate;
pub mod notifications;
pub mod serve;
pub mod user;

use std::sync::Arc;

use clap::{Parser, Subcommand};

use taskhub_client::{ApiClient, ClientError, SessionStore};
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;

use crate::output::OutputFormat;

/// TaskHub — task management platform
#[derive(Debug, Parser)]
#[command(name = "taskhub", version, about, long_about = None)]
pub struct Cli {
    /// Configuration environment (layers config/default.toml, then config/<env>.toml)
    #[arg(short, long, default_value = "development")]
    pub env: String,

    /// Output format
    #[arg(short, long, value_enum, default_value = "table")]
    pub format: OutputFormat,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Top-level commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Start the TaskHub server
    Serve(serve::ServeArgs),
    /// Database migration management
    Migrate(migrate::MigrateArgs),
    /// User administration (direct database access)
    User(user::UserArgs),
    /// Log in to a server, log out, or inspect the stored session
    Auth(auth::AuthArgs),
    /// Notification feed access over the API
    Notifications(notifications::NotificationsArgs),
}

/// Errors surfaced by CLI commands.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    /// Server-side operation failed.
    #[error(transparent)]
    App(#[from] AppError),
    /// Client library call failed.
    #[error(transparent)]
    Client(#[from] ClientError),
    /// Interactive prompt failed.
    #[error(transparent)]
    Prompt(#[from] dialoguer::Error),
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(&self) -> Result<(), CliError> {
        match &self.command {
            Commands::Serve(args) => serve::execute(args, &self.env).await,
            Commands::Migrate(args) => migrate::execute(args, &self.env, self.format).await,
            Commands::User(args) => user::execute(args, &self.env, self.format).await,
            Commands::Auth(args) => auth::execute(args, self.format).await,
            Commands::Notifications(args) => notifications::execute(args, self.format).await,
        }
    }
}

/// Helper: load configuration for an environment
pub fn load_config(env: &str) -> Result<AppConfig, CliError> {
    Ok(AppConfig::load(env)?)
}

/// Helper: create database pool from config
pub async fn create_db_pool(config: &AppConfig) -> Result<sqlx::PgPool, CliError> {
    let pool = taskhub_database::connection::DatabasePool::connect(&config.database).await?;
    Ok(pool.into_pool())
}

/// Helper: API client bound to the stored session's server
pub fn open_client(session: &Arc<SessionStore>) -> Result<Arc<ApiClient>, CliError> {
    let server_url = session
        .server_url()
        .ok_or(ClientError::NotAuthenticated)?;
    Ok(Arc::new(ApiClient::new(server_url, Arc::clone(session))))
}
