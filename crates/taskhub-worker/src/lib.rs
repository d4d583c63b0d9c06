//! # taskhub-worker
//!
//! Scheduled background jobs for TaskHub: deadline reminder scans,
//! notification retention cleanup, and session expiry cleanup.
//!
//! Jobs are plain structs with an async `run` method, invoked directly
//! by the cron scheduler. There is no persistent job queue — every job
//! here is an idempotent maintenance sweep that can simply run again on
//! the next tick if a run fails.

pub mod jobs;
pub mod scheduler;

pub use jobs::cleanup::{NotificationCleanupJob, SessionCleanupJob};
pub use jobs::deadline::DeadlineReminderJob;
pub use scheduler::CronScheduler;
