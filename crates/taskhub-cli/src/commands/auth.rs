//! Session commands for the headless client.

use std::sync::Arc;

use clap::{Args, Subcommand};

use taskhub_client::{ApiClient, SessionStore};

use super::CliError;
use crate::output::{self, OutputFormat};

/// Arguments for auth commands
#[derive(Debug, Args)]
pub struct AuthArgs {
    /// Auth subcommand
    #[command(subcommand)]
    pub command: AuthCommand,
}

/// Auth subcommands
#[derive(Debug, Subcommand)]
pub enum AuthCommand {
    /// Log in to a TaskHub server and store the session
    Login {
        /// Server base URL
        #[arg(short, long, default_value = "http://localhost:8080")]
        server: String,
        /// Username
        #[arg(short, long)]
        username: Option<String>,
        /// Password (will prompt if not provided)
        #[arg(short, long)]
        password: Option<String>,
    },
    /// Log out and clear the stored session
    Logout,
    /// Show the logged-in user
    Whoami,
}

/// Execute auth commands
pub async fn execute(args: &AuthArgs, format: OutputFormat) -> Result<(), CliError> {
    let state_dir = taskhub_client::default_state_dir();
    let session = Arc::new(SessionStore::open(&state_dir)?);

    match &args.command {
        AuthCommand::Login {
            server,
            username,
            password,
        } => {
            let username = match username {
                Some(u) => u.clone(),
                None => dialoguer::Input::new()
                    .with_prompt("Username")
                    .interact_text()?,
            };
            let password = match password {
                Some(p) => p.clone(),
                None => dialoguer::Password::new()
                    .with_prompt("Password")
                    .interact()?,
            };

            let api = ApiClient::new(server.clone(), Arc::clone(&session));
            let user = api.login(&username, &password).await?;
            output::print_success(&format!(
                "Logged in to {} as '{}' ({})",
                server, user.username, user.role
            ));
        }
        AuthCommand::Logout => {
            match super::open_client(&session) {
                Ok(api) => api.logout().await?,
                // Nothing stored; clearing is still safe.
                Err(_) => session.clear()?,
            }
            output::print_success("Logged out");
        }
        AuthCommand::Whoami => match session.user() {
            Some(user) => match format {
                OutputFormat::Json => output::print_json(&user),
                OutputFormat::Table => {
                    output::print_kv("Username", &user.username);
                    output::print_kv("Email", &user.email);
                    output::print_kv("Role", user.role.as_str());
                    if let Some(server) = session.server_url() {
                        output::print_kv("Server", &server);
                    }
                }
            },
            None => println!("Not logged in."),
        },
    }

    Ok(())
}
