//! Repository implementations for all TaskHub entities.

pub mod attachment;
pub mod chat;
pub mod event;
pub mod notification;
pub mod project;
pub mod report;
pub mod session;
pub mod task;
pub mod user;

pub use attachment::AttachmentRepository;
pub use chat::ChatRepository;
pub use event::EventRepository;
pub use notification::NotificationRepository;
pub use project::ProjectRepository;
pub use report::ReportRepository;
pub use session::SessionRepository;
pub use task::TaskRepository;
pub use user::UserRepository;
