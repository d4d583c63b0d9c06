//! Cron scheduler for periodic maintenance tasks.

use std::sync::Arc;

use tokio::sync::watch;
use tokio_cron_scheduler::{Job as CronJob, JobScheduler};
use tracing::{error, info, warn};

use taskhub_core::error::AppError;

use crate::jobs::cleanup::{NotificationCleanupJob, SessionCleanupJob};
use crate::jobs::deadline::DeadlineReminderJob;

/// Cron-based scheduler for periodic background tasks.
pub struct CronScheduler {
    /// The underlying job scheduler.
    scheduler: JobScheduler,
}

impl std::fmt::Debug for CronScheduler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CronScheduler").finish()
    }
}

impl CronScheduler {
    /// Creates a new cron scheduler.
    pub async fn new() -> Result<Self, AppError> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|e| AppError::internal(format!("Failed to create scheduler: {e}")))?;

        Ok(Self { scheduler })
    }

    /// Deadline reminder scan — every 30 minutes.
    pub async fn register_deadline_reminders(
        &self,
        job: Arc<DeadlineReminderJob>,
    ) -> Result<(), AppError> {
        let cron_job = CronJob::new_async("0 */30 * * * *", move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                if let Err(e) = job.run().await {
                    error!(error = %e, "Deadline reminder scan failed");
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create deadline_reminder schedule: {e}"))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add deadline_reminder schedule: {e}"))
        })?;

        info!("Registered: deadline_reminder (every 30min)");
        Ok(())
    }

    /// Notification cleanup — daily at 2 AM.
    pub async fn register_notification_cleanup(
        &self,
        job: Arc<NotificationCleanupJob>,
    ) -> Result<(), AppError> {
        let cron_job = CronJob::new_async("0 0 2 * * *", move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                if let Err(e) = job.run().await {
                    error!(error = %e, "Notification cleanup failed");
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!(
                "Failed to create notification_cleanup schedule: {e}"
            ))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add notification_cleanup schedule: {e}"))
        })?;

        info!("Registered: notification_cleanup (daily at 2AM)");
        Ok(())
    }

    /// Session cleanup — every hour.
    pub async fn register_session_cleanup(
        &self,
        job: Arc<SessionCleanupJob>,
    ) -> Result<(), AppError> {
        let cron_job = CronJob::new_async("0 0 * * * *", move |_uuid, _lock| {
            let job = Arc::clone(&job);
            Box::pin(async move {
                if let Err(e) = job.run().await {
                    error!(error = %e, "Session cleanup failed");
                }
            })
        })
        .map_err(|e| {
            AppError::internal(format!("Failed to create session_cleanup schedule: {e}"))
        })?;

        self.scheduler.add(cron_job).await.map_err(|e| {
            AppError::internal(format!("Failed to add session_cleanup schedule: {e}"))
        })?;

        info!("Registered: session_cleanup (every hour)");
        Ok(())
    }

    /// Starts the scheduler.
    pub async fn start(&self) -> Result<(), AppError> {
        self.scheduler
            .start()
            .await
            .map_err(|e| AppError::internal(format!("Failed to start scheduler: {e}")))?;

        info!("Cron scheduler started");
        Ok(())
    }

    /// Consumes the scheduler and shuts it down.
    pub async fn shutdown(mut self) -> Result<(), AppError> {
        self.scheduler
            .shutdown()
            .await
            .map_err(|e| AppError::internal(format!("Failed to shutdown scheduler: {e}")))?;

        info!("Cron scheduler shut down");
        Ok(())
    }

    /// Spawns a task that shuts the scheduler down once the shutdown
    /// channel flips to `true`. Consumes the scheduler.
    pub fn spawn_shutdown_listener(
        self,
        mut shutdown: watch::Receiver<bool>,
    ) -> tokio::task::JoinHandle<()> {
        tokio::spawn(async move {
            loop {
                if shutdown.changed().await.is_err() {
                    break;
                }
                if *shutdown.borrow() {
                    break;
                }
            }
            if let Err(e) = self.shutdown().await {
                warn!(error = %e, "Scheduler shutdown failed");
            }
        })
    }
}
