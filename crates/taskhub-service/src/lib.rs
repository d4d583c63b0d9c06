//! # taskhub-service
//!
//! Business logic service layer for TaskHub. Each service orchestrates
//! repositories, storage, authentication, and realtime dispatch to
//! implement application-level use cases.
//!
//! Services follow constructor injection — all dependencies are provided
//! at construction time via `Arc` references.

pub mod chat;
pub mod context;
pub mod dashboard;
pub mod event;
pub mod notification;
pub mod project;
pub mod task;
pub mod user;

pub use chat::ChatService;
pub use context::RequestContext;
pub use dashboard::{DashboardService, DashboardSummary};
pub use event::EventService;
pub use notification::{NotificationRules, NotificationService};
pub use project::ProjectService;
pub use task::{ReportService, TaskAttachmentService, TaskService};
pub use user::{AdminUserService, UserService};
