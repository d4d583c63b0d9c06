//! User administration commands, run against the database directly.

use clap::{Args, Subcommand};
use serde::Serialize;
use std::str::FromStr;
use tabled::Tabled;

use taskhub_auth::{PasswordHasher, PasswordValidator};
use taskhub_core::error::AppError;
use taskhub_core::types::pagination::PageRequest;
use taskhub_database::repositories::user::UserRepository;
use taskhub_entity::user::model::CreateUser;
use taskhub_entity::user::{User, UserRole, UserStatus};

use super::CliError;
use crate::output::{self, OutputFormat};

/// Arguments for user commands
#[derive(Debug, Args)]
pub struct UserArgs {
    /// User subcommand
    #[command(subcommand)]
    pub command: UserCommand,
}

/// User subcommands
#[derive(Debug, Subcommand)]
pub enum UserCommand {
    /// List users
    List {
        /// Filter by role (admin or user)
        #[arg(short, long)]
        role: Option<String>,
        /// Page number
        #[arg(long, default_value = "1")]
        page: u64,
        /// Users per page
        #[arg(long, default_value = "50")]
        page_size: u64,
    },
    /// Create a new user
    Create {
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Email
        #[arg(short, long)]
        email: Option<String>,
        /// Display name
        #[arg(short, long)]
        display_name: Option<String>,
        /// Role (admin or user)
        #[arg(short, long, default_value = "user")]
        role: String,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Change a user's role
    SetRole {
        /// Username
        username: String,
        /// New role (admin or user)
        role: String,
    },
    /// Activate a user account
    Enable {
        /// Username
        username: String,
    },
    /// Deactivate a user account
    Disable {
        /// Username
        username: String,
    },
    /// Reset a user's password
    ResetPassword {
        /// Username
        username: String,
        /// New password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Delete a user and everything they own
    Delete {
        /// Username
        username: String,
        /// Skip confirmation prompt
        #[arg(long)]
        force: bool,
    },
}

/// User display row for table output
#[derive(Debug, Serialize, Tabled)]
struct UserRow {
    /// User ID
    id: String,
    /// Username
    username: String,
    /// Email
    email: String,
    /// Role
    role: String,
    /// Status
    status: String,
    /// Created at
    created_at: String,
}

impl From<&User> for UserRow {
    fn from(u: &User) -> Self {
        Self {
            id: u.id.to_string(),
            username: u.username.clone(),
            email: u.email.clone(),
            role: u.role.as_str().to_string(),
            status: u.status.as_str().to_string(),
            created_at: u.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Execute user commands
pub async fn execute(args: &UserArgs, env: &str, format: OutputFormat) -> Result<(), CliError> {
    let config = super::load_config(env)?;
    let pool = super::create_db_pool(&config).await?;
    let user_repo = UserRepository::new(pool.clone());
    let hasher = PasswordHasher::new();

    match &args.command {
        UserCommand::List {
            role,
            page,
            page_size,
        } => {
            let role_filter = role
                .as_deref()
                .map(UserRole::from_str)
                .transpose()?;
            let page = user_repo
                .find_all(&PageRequest::new(*page, *page_size))
                .await?;

            let rows: Vec<UserRow> = page
                .items
                .iter()
                .filter(|u| role_filter.is_none_or(|r| u.role == r))
                .map(UserRow::from)
                .collect();
            output::print_list(&rows, format);
        }
        UserCommand::Create {
            username,
            email,
            display_name,
            role,
            password,
        } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Username")
                    .interact_text()?,
            };
            let email = match email {
                Some(e) => e.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Email")
                    .interact_text()?,
            };
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?,
            };
            let role = UserRole::from_str(role)?;

            if user_repo.find_by_username(&username).await?.is_some() {
                return Err(AppError::conflict(format!("User '{}' already exists", username)).into());
            }
            PasswordValidator::new(&config.auth).validate(&password)?;

            let user = user_repo
                .create(&CreateUser {
                    username,
                    email,
                    password_hash: hasher.hash_password(&password)?,
                    display_name: display_name.clone(),
                    role,
                })
                .await?;

            output::print_success(&format!(
                "User '{}' created with role '{}'",
                user.username, user.role
            ));
        }
        UserCommand::SetRole { username, role } => {
            let user = require_user(&user_repo, username).await?;
            let role = UserRole::from_str(role)?;
            user_repo.update_role(user.id, role).await?;
            output::print_success(&format!("User '{}' is now a {}", username, role));
        }
        UserCommand::Enable { username } => {
            let user = require_user(&user_repo, username).await?;
            user_repo.update_status(user.id, UserStatus::Active).await?;
            output::print_success(&format!("User '{}' enabled", username));
        }
        UserCommand::Disable { username } => {
            let user = require_user(&user_repo, username).await?;
            user_repo
                .update_status(user.id, UserStatus::Inactive)
                .await?;
            output::print_success(&format!("User '{}' disabled", username));
        }
        UserCommand::ResetPassword { username, password } => {
            let user = require_user(&user_repo, username).await?;
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("New password")
                    .with_confirmation("Confirm password", "Passwords do not match")
                    .interact()?,
            };
            PasswordValidator::new(&config.auth).validate(&password)?;
            user_repo
                .update_password(user.id, &hasher.hash_password(&password)?)
                .await?;
            output::print_success(&format!("Password reset for '{}'", username));
        }
        UserCommand::Delete { username, force } => {
            let user = require_user(&user_repo, username).await?;
            if !force {
                let confirm = dialoguer::Confirm::new()
                    .with_prompt(format!(
                        "Delete user '{}' and all their tasks, events, and messages?",
                        username
                    ))
                    .default(false)
                    .interact()?;
                if !confirm {
                    println!("Cancelled.");
                    return Ok(());
                }
            }
            user_repo.delete(user.id).await?;
            output::print_success(&format!("User '{}' deleted", username));
        }
    }

    Ok(())
}

async fn require_user(repo: &UserRepository, username: &str) -> Result<User, CliError> {
    let user = repo
        .find_by_username(username)
        .await?
        .ok_or_else(|| AppError::not_found(format!("User '{}' not found", username)))?;
    Ok(user)
}
