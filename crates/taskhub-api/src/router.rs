//! Route definitions for the TaskHub HTTP API.
//!
//! All routes are organized by domain and mounted under `/api`, except
//! the WebSocket upgrade which lives at `/ws`. The router receives
//! `AppState` and passes it to all handlers via Axum's `State`
//! extractor.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

use taskhub_storage::policy::MAX_TASK_ATTACHMENT_BYTES;

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Extra headroom for multipart framing on upload endpoints.
const MULTIPART_OVERHEAD_BYTES: usize = 64 * 1024;

/// Build the complete Axum router with all routes and middleware.
///
/// Receives the fully-constructed `AppState` and threads it through
/// every route via `.with_state(state)`. Upload endpoints get a body
/// limit sized for the largest attachment category; everything else
/// uses the configured default.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;
    let upload_limit = MAX_TASK_ATTACHMENT_BYTES + MULTIPART_OVERHEAD_BYTES;

    let api_routes = Router::new()
        .merge(auth_routes())
        .merge(user_routes())
        .merge(task_routes())
        .merge(project_routes())
        .merge(event_routes())
        .merge(notification_routes())
        .merge(chat_routes())
        .merge(dashboard_routes())
        .merge(admin_routes())
        .merge(health_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .merge(upload_routes().layer(DefaultBodyLimit::max(upload_limit)));

    let ws_routes = Router::new().route("/ws", get(handlers::ws::ws_handler));

    let cors = middleware::cors::build_cors_layer(&state.config.server.cors);

    Router::new()
        .nest("/api", api_routes)
        .merge(ws_routes)
        .layer(middleware::compression::compression())
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .layer(axum_middleware::from_fn(
            middleware::logging::request_logging,
        ))
        .with_state(state)
}

/// Auth endpoints: login, logout, refresh, me
fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/login", post(handlers::auth::login))
        .route("/auth/logout", post(handlers::auth::logout))
        .route("/auth/refresh", post(handlers::auth::refresh))
        .route("/auth/me", get(handlers::auth::me))
}

/// User self-service endpoints
fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users/me", get(handlers::user::get_profile))
        .route("/users/me", put(handlers::user::update_profile))
        .route("/users/me/password", put(handlers::user::change_password))
        .route("/users/{id}/avatar", get(handlers::user::download_avatar))
}

/// Task CRUD, status transitions, attachment listing, reports
fn task_routes() -> Router<AppState> {
    Router::new()
        .route("/tasks", get(handlers::task::list_tasks))
        .route("/tasks", post(handlers::task::create_task))
        .route("/tasks/{id}", get(handlers::task::get_task))
        .route("/tasks/{id}", put(handlers::task::update_task))
        .route("/tasks/{id}", delete(handlers::task::delete_task))
        .route("/tasks/{id}/status", put(handlers::task::set_task_status))
        .route(
            "/tasks/{id}/attachments",
            get(handlers::task::list_attachments),
        )
        .route(
            "/tasks/{id}/attachments/{attachment_id}/download",
            get(handlers::task::download_attachment),
        )
        .route(
            "/tasks/{id}/attachments/{attachment_id}",
            delete(handlers::task::delete_attachment),
        )
        .route("/tasks/{id}/reports", post(handlers::task::add_report))
        .route("/tasks/{id}/reports", get(handlers::task::list_reports))
}

/// Project CRUD and membership
fn project_routes() -> Router<AppState> {
    Router::new()
        .route("/projects", get(handlers::project::list_projects))
        .route("/projects", post(handlers::project::create_project))
        .route("/projects/{id}", get(handlers::project::get_project))
        .route("/projects/{id}", put(handlers::project::update_project))
        .route("/projects/{id}", delete(handlers::project::delete_project))
        .route(
            "/projects/{id}/members",
            get(handlers::project::list_members),
        )
        .route(
            "/projects/{id}/members",
            post(handlers::project::add_member),
        )
        .route(
            "/projects/{id}/members/{user_id}",
            delete(handlers::project::remove_member),
        )
}

/// Calendar event CRUD
fn event_routes() -> Router<AppState> {
    Router::new()
        .route("/events", get(handlers::event::list_events))
        .route("/events", post(handlers::event::create_event))
        .route("/events/{id}", get(handlers::event::get_event))
        .route("/events/{id}", put(handlers::event::update_event))
        .route("/events/{id}", delete(handlers::event::delete_event))
}

/// Notification endpoints
fn notification_routes() -> Router<AppState> {
    Router::new()
        .route(
            "/notifications",
            get(handlers::notification::list_notifications),
        )
        .route(
            "/notifications/unread",
            get(handlers::notification::list_unread),
        )
        .route(
            "/notifications/unread-count",
            get(handlers::notification::unread_count),
        )
        .route(
            "/notifications/{id}/read",
            put(handlers::notification::mark_read),
        )
        .route(
            "/notifications/read-all",
            put(handlers::notification::mark_all_read),
        )
}

/// Chat conversations and messages
fn chat_routes() -> Router<AppState> {
    Router::new()
        .route("/conversations", get(handlers::chat::list_conversations))
        .route("/conversations", post(handlers::chat::create_conversation))
        .route(
            "/conversations/{id}/messages",
            get(handlers::chat::list_messages),
        )
        .route(
            "/conversations/{id}/read",
            put(handlers::chat::mark_conversation_read),
        )
        .route(
            "/conversations/{id}/messages/{message_id}/attachment",
            get(handlers::chat::download_attachment),
        )
}

/// Role-aware dashboard summary
fn dashboard_routes() -> Router<AppState> {
    Router::new().route("/dashboard", get(handlers::dashboard::summary))
}

/// Admin-only endpoints
fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/admin/users", get(handlers::admin::users::list_users))
        .route("/admin/users", post(handlers::admin::users::create_user))
        .route("/admin/users/{id}", get(handlers::admin::users::get_user))
        .route("/admin/users/{id}", put(handlers::admin::users::update_user))
        .route(
            "/admin/users/{id}",
            delete(handlers::admin::users::delete_user),
        )
        .route(
            "/admin/users/{id}/password",
            put(handlers::admin::users::reset_password),
        )
}

/// Health check endpoints (no auth required)
fn health_routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(handlers::health::health))
        .route("/health/detailed", get(handlers::health::health_detailed))
}

/// Multipart upload endpoints, split out for their larger body limit
fn upload_routes() -> Router<AppState> {
    Router::new()
        .route("/users/avatar", post(handlers::user::upload_avatar))
        .route(
            "/tasks/{id}/attachments",
            post(handlers::task::upload_attachment),
        )
        .route(
            "/conversations/{id}/messages",
            post(handlers::chat::send_message),
        )
}
