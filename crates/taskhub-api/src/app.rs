//! Application builder — wires repositories, auth, services, realtime,
//! and the background worker into a running Axum server.

use std::sync::Arc;

use axum::Router;
use chrono::Utc;
use sqlx::PgPool;
use tokio::sync::watch;
use tracing::info;

use taskhub_auth::{
    AccessPolicy, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, SessionManager,
};
use taskhub_core::config::AppConfig;
use taskhub_core::error::AppError;
use taskhub_core::traits::storage::StorageProvider;
use taskhub_database::repositories::{
    AttachmentRepository, ChatRepository, EventRepository, NotificationRepository,
    ProjectRepository, ReportRepository, SessionRepository, TaskRepository, UserRepository,
};
use taskhub_realtime::{NotificationDispatcher, RealtimeEngine};
use taskhub_service::{
    AdminUserService, ChatService, DashboardService, EventService, NotificationRules,
    NotificationService, ProjectService, ReportService, TaskAttachmentService, TaskService,
    UserService,
};
use taskhub_storage::{LocalStorageProvider, UploadPolicy};
use taskhub_worker::{
    CronScheduler, DeadlineReminderJob, NotificationCleanupJob, SessionCleanupJob,
};

use crate::router::build_router;
use crate::state::AppState;

/// Builds the complete Axum application from a fully-constructed state.
///
/// Separated from [`run_server`] so integration tests can drive the
/// router without binding a socket.
pub fn build_app(state: AppState) -> Router {
    build_router(state)
}

/// Runs the TaskHub server with the given configuration and database
/// pool until a shutdown signal arrives.
pub async fn run_server(config: AppConfig, db_pool: PgPool) -> Result<(), AppError> {
    // ── Step 1: Upload storage ───────────────────────────────────
    let storage: Arc<dyn StorageProvider> =
        Arc::new(LocalStorageProvider::new(&config.storage.data_root).await?);

    // ── Step 2: Repositories ─────────────────────────────────────
    let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
    let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));
    let task_repo = Arc::new(TaskRepository::new(db_pool.clone()));
    let attachment_repo = Arc::new(AttachmentRepository::new(db_pool.clone()));
    let report_repo = Arc::new(ReportRepository::new(db_pool.clone()));
    let project_repo = Arc::new(ProjectRepository::new(db_pool.clone()));
    let event_repo = Arc::new(EventRepository::new(db_pool.clone()));
    let chat_repo = Arc::new(ChatRepository::new(db_pool.clone()));
    let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));

    // ── Step 3: Auth ─────────────────────────────────────────────
    let password_hasher = Arc::new(PasswordHasher::new());
    let password_validator = Arc::new(PasswordValidator::new(&config.auth));
    let session_manager = Arc::new(SessionManager::new(
        JwtEncoder::new(&config.auth),
        JwtDecoder::new(&config.auth),
        SessionRepository::new(db_pool.clone()),
        UserRepository::new(db_pool.clone()),
        PasswordHasher::new(),
    ));
    let access = AccessPolicy::new();

    // ── Step 4: Realtime engine + dispatcher ─────────────────────
    let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
    let dispatcher = Arc::new(NotificationDispatcher::new(
        realtime.pool(),
        Arc::clone(&notification_repo),
    ));

    // ── Step 5: Services ─────────────────────────────────────────
    let rules = NotificationRules::new(Arc::clone(&notification_repo));

    let user_service = Arc::new(UserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&storage),
        UploadPolicy::new(),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
    ));
    let admin_user_service = Arc::new(AdminUserService::new(
        Arc::clone(&user_repo),
        Arc::clone(&session_repo),
        Arc::clone(&password_hasher),
        Arc::clone(&password_validator),
        Arc::clone(&storage),
        access.clone(),
    ));
    let task_service = Arc::new(TaskService::new(
        Arc::clone(&task_repo),
        Arc::clone(&project_repo),
        Arc::clone(&user_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&storage),
        access.clone(),
        rules.clone(),
        Arc::clone(&dispatcher),
    ));
    let attachment_service = Arc::new(TaskAttachmentService::new(
        Arc::clone(&task_repo),
        Arc::clone(&attachment_repo),
        Arc::clone(&storage),
        UploadPolicy::new(),
        access.clone(),
    ));
    let report_service = Arc::new(ReportService::new(
        Arc::clone(&report_repo),
        Arc::clone(&task_repo),
        access.clone(),
        rules.clone(),
        Arc::clone(&dispatcher),
    ));
    let project_service = Arc::new(ProjectService::new(
        Arc::clone(&project_repo),
        Arc::clone(&user_repo),
        access.clone(),
    ));
    let event_service = Arc::new(EventService::new(
        Arc::clone(&event_repo),
        Arc::clone(&task_repo),
        access.clone(),
    ));
    let chat_service = Arc::new(ChatService::new(
        Arc::clone(&chat_repo),
        Arc::clone(&user_repo),
        Arc::clone(&storage),
        UploadPolicy::new(),
        rules.clone(),
        Arc::clone(&dispatcher),
    ));
    let notification_service = Arc::new(NotificationService::new(
        Arc::clone(&notification_repo),
        Arc::clone(&dispatcher),
    ));
    let dashboard_service = Arc::new(DashboardService::new(
        Arc::clone(&task_repo),
        Arc::clone(&project_repo),
        Arc::clone(&notification_repo),
        Arc::clone(&user_repo),
    ));

    // ── Step 6: Shutdown channel, heartbeat, worker ──────────────
    let (shutdown_tx, shutdown_rx) = watch::channel(false);
    let _heartbeat = realtime.spawn_heartbeat(shutdown_rx.clone());

    let worker_handle = if config.worker.enabled {
        let deadline_job = Arc::new(DeadlineReminderJob::new(
            Arc::clone(&task_repo),
            Arc::clone(&notification_repo),
            rules.clone(),
            Arc::clone(&dispatcher),
            config.worker.deadline_reminder_window_hours,
        ));
        let notification_cleanup = Arc::new(NotificationCleanupJob::new(
            Arc::clone(&notification_repo),
            i64::from(config.worker.notification_retention_days),
            config.worker.max_stored_per_user,
        ));
        let session_cleanup = Arc::new(SessionCleanupJob::new(Arc::clone(&session_repo)));

        let scheduler = CronScheduler::new().await?;
        scheduler.register_deadline_reminders(deadline_job).await?;
        scheduler
            .register_notification_cleanup(notification_cleanup)
            .await?;
        scheduler.register_session_cleanup(session_cleanup).await?;
        scheduler.start().await?;

        Some(scheduler.spawn_shutdown_listener(shutdown_rx.clone()))
    } else {
        info!("Background worker disabled");
        None
    };

    // ── Step 7: State, router, serve ─────────────────────────────
    let state = AppState {
        config: Arc::new(config.clone()),
        started_at: Utc::now(),
        db: db_pool.clone(),
        session_manager,
        realtime,
        user_service,
        admin_user_service,
        task_service,
        attachment_service,
        report_service,
        project_service,
        event_service,
        chat_service,
        notification_service,
        dashboard_service,
    };

    let app = build_app(state);
    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .map_err(|e| AppError::internal(format!("Failed to bind {addr}: {e}")))?;

    info!("TaskHub server listening on {addr}");

    axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            shutdown_signal().await;
            info!("Shutdown signal received, starting graceful shutdown...");
            let _ = shutdown_tx.send(true);
        })
        .await
        .map_err(|e| AppError::internal(format!("Server error: {e}")))?;

    // Give the worker its grace window to finish an in-flight job.
    if let Some(handle) = worker_handle {
        let grace = std::time::Duration::from_secs(config.server.shutdown_grace_seconds);
        let _ = tokio::time::timeout(grace, handle).await;
    }

    info!("TaskHub server shut down gracefully");
    Ok(())
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
