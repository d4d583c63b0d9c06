//! Shared test harness: a fully wired application on a clean database,
//! plus request and seeding helpers.

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use chrono::Utc;
use serde_json::Value;
use sqlx::PgPool;
use tower::ServiceExt;
use uuid::Uuid;

use taskhub_api::{AppState, build_app};
use taskhub_auth::{
    AccessPolicy, JwtDecoder, JwtEncoder, PasswordHasher, PasswordValidator, SessionManager,
};
use taskhub_core::config::AppConfig;
use taskhub_core::traits::storage::StorageProvider;
use taskhub_database::connection::DatabasePool;
use taskhub_database::migration::run_migrations;
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

/// A fully wired application instance for integration testing.
pub struct TestApp {
    /// The Axum router, ready to receive requests.
    pub router: Router,
    /// The database pool, for direct seeding and assertions.
    pub db_pool: PgPool,
    /// The configuration the app was built with.
    pub config: AppConfig,
    /// Scratch upload root; removed when the app is dropped.
    _storage_dir: tempfile::TempDir,
}

impl TestApp {
    /// Builds the application against the test database, running
    /// migrations and wiping any rows left by a previous run.
    pub async fn new() -> Self {
        let mut config = AppConfig::load("test").expect("Failed to load test config");

        let storage_dir = tempfile::tempdir().expect("Failed to create scratch upload dir");
        config.storage.data_root = storage_dir.path().display().to_string();

        let db = DatabasePool::connect(&config.database)
            .await
            .expect("Failed to connect to test database");
        let db_pool = db.into_pool();

        run_migrations(&db_pool)
            .await
            .expect("Failed to run migrations");
        Self::clean_database(&db_pool).await;

        let storage: Arc<dyn StorageProvider> = Arc::new(
            LocalStorageProvider::new(&config.storage.data_root)
                .await
                .expect("Failed to create storage provider"),
        );

        let user_repo = Arc::new(UserRepository::new(db_pool.clone()));
        let session_repo = Arc::new(SessionRepository::new(db_pool.clone()));
        let task_repo = Arc::new(TaskRepository::new(db_pool.clone()));
        let attachment_repo = Arc::new(AttachmentRepository::new(db_pool.clone()));
        let report_repo = Arc::new(ReportRepository::new(db_pool.clone()));
        let project_repo = Arc::new(ProjectRepository::new(db_pool.clone()));
        let event_repo = Arc::new(EventRepository::new(db_pool.clone()));
        let chat_repo = Arc::new(ChatRepository::new(db_pool.clone()));
        let notification_repo = Arc::new(NotificationRepository::new(db_pool.clone()));

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

        let realtime = Arc::new(RealtimeEngine::new(config.realtime.clone()));
        let dispatcher = Arc::new(NotificationDispatcher::new(
            realtime.pool(),
            Arc::clone(&notification_repo),
        ));

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

        let router = build_app(state);

        Self {
            router,
            db_pool,
            config,
            _storage_dir: storage_dir,
        }
    }

    /// Removes all rows, children before parents.
    async fn clean_database(pool: &PgPool) {
        let tables = [
            "notifications",
            "chat_messages",
            "conversation_members",
            "conversations",
            "calendar_events",
            "reports",
            "task_attachments",
            "tasks",
            "project_members",
            "projects",
            "sessions",
            "users",
        ];

        for table in &tables {
            let query = format!("DELETE FROM {}", table);
            let _ = sqlx::query(&query).execute(pool).await;
        }
    }

    /// Creates a test user directly in the database and returns their ID.
    pub async fn create_test_user(&self, username: &str, password: &str, role: &str) -> Uuid {
        let hasher = PasswordHasher::new();
        let hash = hasher
            .hash_password(password)
            .expect("Failed to hash password");
        let id = Uuid::new_v4();

        sqlx::query(
            r#"INSERT INTO users (id, username, email, password_hash, display_name, role, status, created_at, updated_at)
               VALUES ($1, $2, $3, $4, $5, $6::user_role, 'active'::user_status, NOW(), NOW())"#,
        )
        .bind(id)
        .bind(username)
        .bind(format!("{}@test.com", username))
        .bind(&hash)
        .bind(username)
        .bind(role)
        .execute(&self.db_pool)
        .await
        .expect("Failed to create test user");

        id
    }

    /// Logs in and returns the JWT access token.
    pub async fn login(&self, username: &str, password: &str) -> String {
        let body = serde_json::json!({
            "username": username,
            "password": password,
        });

        let response = self
            .request("POST", "/api/auth/login", Some(body), None)
            .await;

        assert_eq!(
            response.status,
            StatusCode::OK,
            "Login failed: {:?}",
            response.body
        );

        response.body["data"]["access_token"]
            .as_str()
            .expect("No access_token in login response")
            .to_string()
    }

    /// Makes an HTTP request against the router without binding a socket.
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        token: Option<&str>,
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        if let Some(token) = token {
            req = req.header("Authorization", format!("Bearer {}", token));
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }

    /// Serves the router on an ephemeral local port, for tests that need
    /// a real TCP endpoint. The server task lives until the test's
    /// runtime shuts down.
    pub async fn serve(&self) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0")
            .await
            .expect("Failed to bind test listener");
        let addr = listener.local_addr().expect("Listener has no local addr");
        let app = self.router.clone();

        tokio::spawn(async move {
            if let Err(e) = axum::serve(listener, app).await {
                eprintln!("Test server exited: {e}");
            }
        });

        format!("http://{}", addr)
    }
}

/// Response from a test request.
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code.
    pub status: StatusCode,
    /// Parsed JSON body.
    pub body: Value,
}
