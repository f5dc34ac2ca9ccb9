//! Recurring reminder job with explicit lifecycle management.
//!
//! Wraps a `tokio_cron_scheduler::JobScheduler` around the core
//! `ReminderService`: one fixed-interval job pulls due reminders, dispatches
//! them, and records the outcome. Join handles are tracked, cancellation is
//! explicit, and every asynchronous operation is wrapped in a timeout.
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use agenda_core::ReminderService;
//! use agenda_infra::scheduling::{ReminderScheduler, ReminderSchedulerConfig, SchedulerResult};
//!
//! # async fn example(service: Arc<ReminderService>) -> SchedulerResult<()> {
//! let mut scheduler = ReminderScheduler::with_config(
//!     ReminderSchedulerConfig::default(), // one tick per minute
//!     service,
//! );
//!
//! scheduler.start().await?;
//! // ... application runs ...
//! scheduler.stop().await?;
//! # Ok(())
//! # }
//! ```

use std::sync::Arc;
use std::time::Duration;

use agenda_core::ReminderService;
use agenda_domain::ReminderConfig;
use tokio::task::JoinHandle;
use tokio_cron_scheduler::{Job, JobScheduler};
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use crate::scheduling::error::{SchedulerError, SchedulerResult};

/// Configuration for the reminder scheduler.
#[derive(Debug, Clone)]
pub struct ReminderSchedulerConfig {
    /// Tick period of the recurring job.
    pub tick: Duration,
    /// Timeout applied to a single tick execution.
    pub job_timeout: Duration,
    /// Timeout for starting the underlying scheduler.
    pub start_timeout: Duration,
    /// Timeout for stopping the scheduler.
    pub stop_timeout: Duration,
    /// Timeout for awaiting the monitor task join handle.
    pub join_timeout: Duration,
}

impl Default for ReminderSchedulerConfig {
    fn default() -> Self {
        Self {
            tick: Duration::from_secs(60),
            job_timeout: Duration::from_secs(30),
            start_timeout: Duration::from_secs(5),
            stop_timeout: Duration::from_secs(5),
            join_timeout: Duration::from_secs(5),
        }
    }
}

impl From<&ReminderConfig> for ReminderSchedulerConfig {
    fn from(config: &ReminderConfig) -> Self {
        Self {
            tick: Duration::from_secs(config.tick_seconds),
            job_timeout: Duration::from_secs(config.job_timeout_seconds),
            ..Self::default()
        }
    }
}

/// Reminder scheduler with explicit lifecycle management.
///
/// At most one job is ever registered: a second `start()` without an
/// intervening `stop()` is rejected with `AlreadyRunning` instead of
/// silently doubling the tick.
pub struct ReminderScheduler {
    scheduler: Option<JobScheduler>,
    config: ReminderSchedulerConfig,
    monitor_handle: Option<JoinHandle<()>>,
    cancellation: CancellationToken,
    service: Arc<ReminderService>,
}

impl ReminderScheduler {
    /// Create a scheduler with the default configuration.
    pub fn new(service: Arc<ReminderService>) -> Self {
        Self::with_config(ReminderSchedulerConfig::default(), service)
    }

    /// Create a scheduler with a custom configuration.
    pub fn with_config(config: ReminderSchedulerConfig, service: Arc<ReminderService>) -> Self {
        Self {
            scheduler: None,
            config,
            monitor_handle: None,
            cancellation: CancellationToken::new(),
            service,
        }
    }

    /// Start the scheduler, spawning the monitoring task.
    pub async fn start(&mut self) -> SchedulerResult<()> {
        if self.is_running() {
            return Err(SchedulerError::AlreadyRunning);
        }

        self.cancellation = CancellationToken::new();

        let scheduler_instance = self.build_scheduler().await?;
        let start_timeout = self.config.start_timeout;

        let start_result = tokio::time::timeout(start_timeout, scheduler_instance.start())
            .await
            .map_err(|_| SchedulerError::Timeout { seconds: start_timeout.as_secs() })?;

        start_result.map_err(|source| SchedulerError::StartFailed(source.to_string()))?;

        self.scheduler = Some(scheduler_instance);

        let cancel = self.cancellation.clone();
        let handle = tokio::spawn(async move {
            Self::monitor_task(cancel).await;
        });

        self.monitor_handle = Some(handle);
        info!(tick_secs = self.config.tick.as_secs(), "Reminder scheduler started");
        Ok(())
    }

    /// Stop the scheduler and wait for the monitor task to finish.
    pub async fn stop(&mut self) -> SchedulerResult<()> {
        if !self.is_running() {
            return Err(SchedulerError::NotRunning);
        }

        self.cancellation.cancel();

        let mut scheduler = match self.scheduler.take() {
            Some(scheduler) => scheduler,
            None => return Err(SchedulerError::NotRunning),
        };

        let stop_timeout = self.config.stop_timeout;
        let stop_result =
            tokio::time::timeout(stop_timeout, async move { scheduler.shutdown().await })
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: stop_timeout.as_secs() })?;

        stop_result.map_err(|source| SchedulerError::StopFailed(source.to_string()))?;

        if let Some(handle) = self.monitor_handle.take() {
            let join_timeout = self.config.join_timeout;
            tokio::time::timeout(join_timeout, handle)
                .await
                .map_err(|_| SchedulerError::Timeout { seconds: join_timeout.as_secs() })?
                .map_err(|err| SchedulerError::TaskJoinFailed(err.to_string()))?;
        }

        info!("Reminder scheduler stopped");
        self.cancellation = CancellationToken::new();
        Ok(())
    }

    /// Returns true when a scheduler instance is active.
    pub fn is_running(&self) -> bool {
        self.scheduler.is_some()
    }

    async fn build_scheduler(&self) -> SchedulerResult<JobScheduler> {
        let scheduler = JobScheduler::new()
            .await
            .map_err(|source| SchedulerError::CreationFailed(source.to_string()))?;

        let service = Arc::clone(&self.service);
        let job_timeout = self.config.job_timeout;

        let job_definition = Job::new_repeated_async(self.config.tick, move |_id, _lock| {
            let service = Arc::clone(&service);

            Box::pin(async move {
                match tokio::time::timeout(job_timeout, service.run_tick()).await {
                    Ok(Ok(report)) if report.due > 0 => {
                        info!(
                            due = report.due,
                            dispatched = report.dispatched,
                            failures = report.dispatch_failures,
                            "reminder tick dispatched notifications"
                        );
                    }
                    Ok(Ok(_)) => {
                        debug!("reminder tick found nothing due");
                    }
                    // A failed tick is logged; the next tick still runs.
                    Ok(Err(err)) => {
                        error!(error = %err, "reminder tick failed");
                    }
                    Err(_) => {
                        warn!(timeout_secs = job_timeout.as_secs(), "reminder tick timed out");
                    }
                }
            })
        })
        .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        let job_id = job_definition.guid();
        scheduler
            .add(job_definition)
            .await
            .map_err(|source| SchedulerError::JobRegistrationFailed(source.to_string()))?;

        debug!(tick_secs = self.config.tick.as_secs(), job_id = %job_id, "Registered reminder job");
        Ok(scheduler)
    }

    async fn monitor_task(cancel: CancellationToken) {
        cancel.cancelled().await;
        debug!("Reminder scheduler monitor cancelled");
    }
}

impl Drop for ReminderScheduler {
    fn drop(&mut self) {
        if self.is_running() {
            warn!("ReminderScheduler dropped while running; cancelling tasks");
            self.cancellation.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use async_trait::async_trait;
    use chrono::NaiveDateTime;

    use agenda_core::{Clock, Notifier};
    use agenda_domain::{OwnerId, Result as DomainResult};

    use super::*;
    use crate::database::{DbManager, SqliteEventRepository};
    use tempfile::TempDir;

    struct NullNotifier;

    #[async_trait]
    impl Notifier for NullNotifier {
        async fn notify(&self, _owner: OwnerId, _text: &str) -> DomainResult<()> {
            Ok(())
        }
    }

    struct EpochClock;

    impl Clock for EpochClock {
        fn now(&self) -> NaiveDateTime {
            chrono::NaiveDate::from_ymd_opt(2000, 1, 1)
                .and_then(|d| d.and_hms_opt(0, 0, 0))
                .unwrap()
        }
    }

    fn build_service(temp_dir: &TempDir) -> Arc<ReminderService> {
        let db_path = temp_dir.path().join("scheduler.db");
        let manager = Arc::new(DbManager::new(&db_path, 2).expect("db manager"));
        manager.run_migrations().expect("migrations");

        Arc::new(ReminderService::new(
            Arc::new(SqliteEventRepository::new(manager)),
            Arc::new(NullNotifier),
            Arc::new(EpochClock),
            1,
        ))
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn lifecycle_runs_successfully() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut scheduler = ReminderScheduler::new(build_service(&temp_dir));

        scheduler.start().await.expect("start succeeds");
        assert!(scheduler.is_running());
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn double_start_is_rejected() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut scheduler = ReminderScheduler::new(build_service(&temp_dir));

        scheduler.start().await.expect("first start");
        let err = scheduler.start().await.expect_err("second start fails");
        assert!(matches!(err, SchedulerError::AlreadyRunning));
        scheduler.stop().await.expect("stop succeeds");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn restart_after_stop_succeeds() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut scheduler = ReminderScheduler::new(build_service(&temp_dir));

        scheduler.start().await.expect("start succeeds");
        scheduler.stop().await.expect("stop succeeds");
        assert!(!scheduler.is_running());

        scheduler.start().await.expect("start again");
        scheduler.stop().await.expect("stop again");
    }

    #[tokio::test(flavor = "multi_thread")]
    async fn stop_without_start_is_rejected() {
        let temp_dir = TempDir::new().expect("temp dir");
        let mut scheduler = ReminderScheduler::new(build_service(&temp_dir));

        let err = scheduler.stop().await.expect_err("stop without start fails");
        assert!(matches!(err, SchedulerError::NotRunning));
    }
}
