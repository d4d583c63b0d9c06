//! Task services — CRUD and status transitions, attachments, progress reports.

pub mod attachments;
pub mod reports;
pub mod service;

pub use attachments::TaskAttachmentService;
pub use reports::ReportService;
pub use service::TaskService;
