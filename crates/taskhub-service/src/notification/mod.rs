//! Notification services — user-facing queries and emission rules.

pub mod rules;
pub mod service;

pub use rules::NotificationRules;
pub use service::NotificationService;
