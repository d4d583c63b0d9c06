//! Notification feed commands, driven through the client library.
//!
//! `watch` keeps a live feed: a WebSocket listener for pushes, the
//! count poller as fallback, and a re-render whenever feed content
//! changes. The one-shot commands await their server calls before
//! exiting instead of using the feed's background confirmation.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use clap::{Args, Subcommand};
use serde::Serialize;
use std::str::FromStr;
use tabled::Tabled;
use tokio::sync::watch;
use uuid::Uuid;

use taskhub_client::{
    ApiClient, CountPoller, EventsListener, FeedItem, NotificationFeed, ReadEventSet,
    SessionStore, SettingsStore,
};
use taskhub_entity::notification::NotificationKind;
use taskhub_entity::user::User;

use super::CliError;
use crate::output::{self, OutputFormat};

/// Arguments for notification commands
#[derive(Debug, Args)]
pub struct NotificationsArgs {
    /// Notification subcommand
    #[command(subcommand)]
    pub command: NotificationsCommand,
}

/// Notification subcommands
#[derive(Debug, Subcommand)]
pub enum NotificationsCommand {
    /// Show the merged feed once
    List,
    /// Show the unread badge count
    Count,
    /// Follow the feed live
    Watch {
        /// Poll interval in seconds
        #[arg(long, default_value = "30")]
        poll_seconds: u64,
    },
    /// Mark one feed item read
    MarkRead {
        /// Notification or calendar event ID
        id: Uuid,
    },
    /// Mark the fetched notifications and all known events read
    MarkAllRead,
    /// Show or change notification settings
    Settings(SettingsArgs),
}

/// Arguments for settings subcommands
#[derive(Debug, Args)]
pub struct SettingsArgs {
    /// Settings subcommand
    #[command(subcommand)]
    pub command: SettingsCommand,
}

/// Settings subcommands
#[derive(Debug, Subcommand)]
pub enum SettingsCommand {
    /// Show the current notification settings
    Show,
    /// Turn the master switch or one kind on or off
    Set {
        /// `all`, or one of: task_assigned, task_updated, task_completed,
        /// deadline_reminder, message_new, calendar_event
        target: String,
        /// on or off
        #[arg(value_parser = parse_on_off)]
        enabled: bool,
    },
}

fn parse_on_off(raw: &str) -> Result<bool, String> {
    match raw {
        "on" | "true" | "1" => Ok(true),
        "off" | "false" | "0" => Ok(false),
        _ => Err(format!("expected 'on' or 'off', got '{raw}'")),
    }
}

/// Feed display row for table output
#[derive(Debug, Serialize, Tabled)]
struct FeedRow {
    /// Item ID
    id: String,
    /// Item kind
    kind: String,
    /// Title
    title: String,
    /// Created at
    created_at: String,
}

impl From<&FeedItem> for FeedRow {
    fn from(item: &FeedItem) -> Self {
        Self {
            id: item.id.to_string(),
            kind: item.kind.to_string(),
            title: item.title.clone(),
            created_at: item.created_at.format("%Y-%m-%d %H:%M").to_string(),
        }
    }
}

/// Stored session plus the client bound to its server.
struct ClientContext {
    state_dir: PathBuf,
    api: Arc<ApiClient>,
    user: User,
}

fn open_context() -> Result<ClientContext, CliError> {
    let state_dir = taskhub_client::default_state_dir();
    let session = Arc::new(SessionStore::open(&state_dir)?);
    let user = session
        .user()
        .ok_or(taskhub_client::ClientError::NotAuthenticated)?;
    let api = super::open_client(&session)?;
    Ok(ClientContext {
        state_dir,
        api,
        user,
    })
}

fn build_feed(ctx: &ClientContext) -> Result<Arc<NotificationFeed>, CliError> {
    let settings = SettingsStore::new(&ctx.state_dir).load(ctx.user.id);
    let read_events = ReadEventSet::open(&ctx.state_dir, ctx.user.id)?;
    Ok(Arc::new(NotificationFeed::new(
        Arc::clone(&ctx.api),
        settings.notifications,
        ctx.user.is_admin(),
        read_events,
    )))
}

/// Execute notification commands
pub async fn execute(args: &NotificationsArgs, format: OutputFormat) -> Result<(), CliError> {
    match &args.command {
        NotificationsCommand::List => {
            let ctx = open_context()?;
            let feed = build_feed(&ctx)?;
            feed.set_open(true);
            feed.refresh().await?;

            let items = feed.items();
            let rows: Vec<FeedRow> = items.iter().map(FeedRow::from).collect();
            output::print_list(&rows, format);
            if format == OutputFormat::Table {
                println!("Unread: {}", feed.badge_count());
            }
        }
        NotificationsCommand::Count => {
            let ctx = open_context()?;
            let feed = build_feed(&ctx)?;
            feed.poll().await?;
            match format {
                OutputFormat::Table => output::print_kv("Unread", &feed.badge_count().to_string()),
                OutputFormat::Json => {
                    println!("{}", serde_json::json!({ "unread": feed.badge_count() }));
                }
            }
        }
        NotificationsCommand::Watch { poll_seconds } => {
            watch_feed(*poll_seconds).await?;
        }
        NotificationsCommand::MarkRead { id } => {
            let ctx = open_context()?;
            // Calendar events are read locally; anything else is a
            // stored notification the server must confirm.
            let events = ctx.api.events(None, None).await?;
            if events.iter().any(|e| e.id == *id) {
                let mut read_events = ReadEventSet::open(&ctx.state_dir, ctx.user.id)?;
                if read_events.insert(*id) {
                    read_events.save()?;
                }
                output::print_success("Calendar event marked read");
            } else {
                ctx.api.mark_notification_read(*id).await?;
                output::print_success("Notification marked read");
            }
        }
        NotificationsCommand::MarkAllRead => {
            let ctx = open_context()?;
            let page = ctx.api.unread_notifications(1, 25).await?;
            for n in &page.items {
                ctx.api.mark_notification_read(n.id).await?;
            }

            let events = ctx.api.events(None, None).await?;
            let mut read_events = ReadEventSet::open(&ctx.state_dir, ctx.user.id)?;
            read_events.extend(events.iter().map(|e| e.id));
            read_events.save()?;

            output::print_success(&format!(
                "Marked {} notifications and {} events read",
                page.items.len(),
                events.len()
            ));
        }
        NotificationsCommand::Settings(settings_args) => {
            let ctx = open_context()?;
            let store = SettingsStore::new(&ctx.state_dir);

            match &settings_args.command {
                SettingsCommand::Show => {
                    let settings = store.load(ctx.user.id);
                    match format {
                        OutputFormat::Json => output::print_json(&settings),
                        OutputFormat::Table => {
                            let n = &settings.notifications;
                            output::print_kv("notifications", on_off(n.enabled));
                            for kind in NotificationKind::ALL {
                                output::print_kv(kind.as_str(), on_off(n.kind_enabled(kind)));
                            }
                        }
                    }
                }
                SettingsCommand::Set { target, enabled } => {
                    let mut settings = store.load(ctx.user.id);
                    if target == "all" {
                        settings.notifications.enabled = *enabled;
                    } else {
                        let kind = NotificationKind::from_str(target)?;
                        settings.notifications.set_kind(kind, *enabled);
                    }
                    store.save(ctx.user.id, &settings)?;
                    output::print_success(&format!("Set '{}' {}", target, on_off(*enabled)));
                }
            }
        }
    }

    Ok(())
}

fn on_off(enabled: bool) -> &'static str {
    if enabled { "on" } else { "off" }
}

async fn watch_feed(poll_seconds: u64) -> Result<(), CliError> {
    let ctx = open_context()?;
    let feed = build_feed(&ctx)?;
    feed.set_open(true);
    feed.refresh().await?;

    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let poller = CountPoller::new(Arc::clone(&feed))
        .with_interval(Duration::from_secs(poll_seconds.max(1)))
        .spawn(shutdown_rx.clone());

    let listener_api = Arc::clone(&ctx.api);
    let listener_feed = Arc::clone(&feed);
    let ws_shutdown = shutdown_rx.clone();
    let listener = tokio::spawn(async move {
        let listener = EventsListener::new(listener_api, listener_feed);
        loop {
            match listener.run(ws_shutdown.clone()).await {
                Ok(()) if *ws_shutdown.borrow() => break,
                Ok(()) => output::print_warning("Live connection closed, reconnecting in 5s"),
                Err(err) => {
                    tracing::warn!(error = %err, "live connection failed");
                    output::print_warning("Live connection failed, reconnecting in 5s");
                }
            }
            let mut rx = ws_shutdown.clone();
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(5)) => {}
                _ = rx.changed() => {
                    if *rx.borrow() {
                        break;
                    }
                }
            }
        }
    });

    println!("Watching notifications (Ctrl-C to stop)...");
    let mut revision = feed.subscribe();
    let mut last = render(&feed, None);
    loop {
        tokio::select! {
            _ = tokio::signal::ctrl_c() => break,
            changed = revision.changed() => {
                if changed.is_err() {
                    break;
                }
                last = render(&feed, Some(last));
            }
        }
    }

    let _ = shutdown_tx.send(true);
    let _ = poller.await;
    let _ = listener.await;
    println!("Stopped.");
    Ok(())
}

/// Print the feed when its content changed. Returns the rendered
/// snapshot so unchanged polls stay quiet.
fn render(feed: &NotificationFeed, last: Option<(i64, Vec<Uuid>)>) -> (i64, Vec<Uuid>) {
    let items = feed.items();
    let snapshot = (
        feed.badge_count(),
        items.iter().map(|i| i.id).collect::<Vec<_>>(),
    );
    if last.as_ref() == Some(&snapshot) {
        return snapshot;
    }

    println!();
    println!("── {} unread ──", snapshot.0);
    if items.is_empty() {
        println!("  (feed empty)");
    }
    for item in &items {
        println!(
            "  {}  [{}] {}",
            item.created_at.format("%Y-%m-%d %H:%M"),
            item.kind,
            item.title
        );
    }
    snapshot
}
