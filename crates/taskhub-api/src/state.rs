//! Shared application state passed to every Axum handler.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use sqlx::PgPool;

use taskhub_auth::SessionManager;
use taskhub_core::config::AppConfig;
use taskhub_realtime::RealtimeEngine;
use taskhub_service::{
    AdminUserService, ChatService, DashboardService, EventService, NotificationService,
    ProjectService, ReportService, TaskAttachmentService, TaskService, UserService,
};

/// Everything handlers need, threaded through `State<AppState>`.
///
/// Cloning is cheap: every field is an `Arc` or a pooled handle.
#[derive(Clone)]
pub struct AppState {
    // ── Configuration ────────────────────────────────────────────
    pub config: Arc<AppConfig>,
    /// When the server process started, for the health endpoint.
    pub started_at: DateTime<Utc>,

    // ── Infrastructure ───────────────────────────────────────────
    pub db: PgPool,

    // ── Auth ─────────────────────────────────────────────────────
    pub session_manager: Arc<SessionManager>,

    // ── Realtime ─────────────────────────────────────────────────
    pub realtime: Arc<RealtimeEngine>,

    // ── Services ─────────────────────────────────────────────────
    pub user_service: Arc<UserService>,
    pub admin_user_service: Arc<AdminUserService>,
    pub task_service: Arc<TaskService>,
    pub attachment_service: Arc<TaskAttachmentService>,
    pub report_service: Arc<ReportService>,
    pub project_service: Arc<ProjectService>,
    pub event_service: Arc<EventService>,
    pub chat_service: Arc<ChatService>,
    pub notification_service: Arc<NotificationService>,
    pub dashboard_service: Arc<DashboardService>,
}
