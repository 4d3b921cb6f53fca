//! Cron scheduling of report jobs on top of tokio-cron-scheduler.
//!
//! Expressions use the six-field form with seconds first
//! (`sec min hour day-of-month month day-of-week`) and fire in UTC.

use anyhow::{Context, Result};
use std::collections::HashMap;
use std::future::Future;
use tokio::sync::{Mutex, RwLock};
use tokio_cron_scheduler::{Job, JobScheduler};
use tracing::{debug, info, warn};
use uuid::Uuid;

/// Identifier of a scheduled job.
pub type JobId = Uuid;

/// What the service knows about a scheduled job.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledJob {
    /// Job identifier.
    pub id: JobId,
    /// Short name used in logs.
    pub name: String,
    /// Cron expression the job fires on.
    pub cron: String,
    /// What the job does.
    pub description: Option<String>,
}

/// Owns the cron scheduler and the list of jobs added to it.
pub struct SchedulerService {
    scheduler: Mutex<JobScheduler>,
    jobs: RwLock<HashMap<JobId, ScheduledJob>>,
    running: RwLock<bool>,
}

impl std::fmt::Debug for SchedulerService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SchedulerService").finish_non_exhaustive()
    }
}

impl SchedulerService {
    /// Creates a stopped scheduler with no jobs.
    pub async fn new() -> Result<Self> {
        let scheduler = JobScheduler::new()
            .await
            .context("Failed to create job scheduler")?;
        debug!("Job scheduler created");

        Ok(Self {
            scheduler: Mutex::new(scheduler),
            jobs: RwLock::new(HashMap::new()),
            running: RwLock::new(false),
        })
    }

    /// Starts firing jobs. Starting twice is a no-op.
    pub async fn start(&self) -> Result<()> {
        let mut running = self.running.write().await;
        if *running {
            warn!("Scheduler is already running");
            return Ok(());
        }

        self.scheduler
            .lock()
            .await
            .start()
            .await
            .context("Failed to start scheduler")?;
        *running = true;
        info!(jobs = self.jobs.read().await.len(), "Scheduler started");
        Ok(())
    }

    /// Stops the scheduler. Jobs already running are not interrupted.
    pub async fn stop(&self) -> Result<()> {
        let mut running = self.running.write().await;
        if !*running {
            debug!("Scheduler is not running");
            return Ok(());
        }

        self.scheduler
            .lock()
            .await
            .shutdown()
            .await
            .context("Failed to shut down scheduler")?;
        *running = false;
        info!("Scheduler stopped");
        Ok(())
    }

    /// Whether the scheduler is firing jobs.
    pub async fn is_running(&self) -> bool {
        *self.running.read().await
    }

    /// Adds a job running `job_fn` whenever `cron` fires.
    ///
    /// # Errors
    ///
    /// Returns an error if `cron` does not parse.
    pub async fn add_job<F, Fut>(
        &self,
        name: impl Into<String>,
        cron: impl Into<String>,
        description: Option<String>,
        job_fn: F,
    ) -> Result<JobId>
    where
        F: Fn() -> Fut + Send + Sync + 'static,
        Fut: Future<Output = ()> + Send + 'static,
    {
        let name = name.into();
        let cron = cron.into();

        let job = Job::new_async(cron.as_str(), move |_id, _scheduler| {
            let run = job_fn();
            Box::pin(run)
        })
        .with_context(|| format!("Invalid cron expression {cron:?} for job {name}"))?;

        let id = self
            .scheduler
            .lock()
            .await
            .add(job)
            .await
            .with_context(|| format!("Failed to add job {name}"))?;

        info!(job = %name, cron = %cron, %id, "Job scheduled");
        self.jobs.write().await.insert(
            id,
            ScheduledJob {
                id,
                name,
                cron,
                description,
            },
        );
        Ok(id)
    }

    /// Scheduled jobs, sorted by name.
    pub async fn list_jobs(&self) -> Vec<ScheduledJob> {
        let mut jobs: Vec<ScheduledJob> = self.jobs.read().await.values().cloned().collect();
        jobs.sort_by(|a, b| a.name.cmp(&b.name));
        jobs
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use alertstat_config::defaults::{DEFAULT_MONTHLY_CRON, DEFAULT_WEEKLY_CRON};

    #[tokio::test]
    async fn test_start_stop() {
        let scheduler = SchedulerService::new().await.unwrap();
        assert!(!scheduler.is_running().await);

        scheduler.start().await.unwrap();
        scheduler.start().await.unwrap();
        assert!(scheduler.is_running().await);

        scheduler.stop().await.unwrap();
        assert!(!scheduler.is_running().await);
    }

    #[tokio::test]
    async fn test_add_and_list() {
        let scheduler = SchedulerService::new().await.unwrap();

        scheduler
            .add_job("weekly", DEFAULT_WEEKLY_CRON, Some("7-day report".to_string()), || async {})
            .await
            .unwrap();
        scheduler
            .add_job("monthly", DEFAULT_MONTHLY_CRON, None, || async {})
            .await
            .unwrap();

        let jobs = scheduler.list_jobs().await;
        let names: Vec<&str> = jobs.iter().map(|job| job.name.as_str()).collect();
        assert_eq!(names, vec!["monthly", "weekly"]);
        assert_eq!(jobs[1].cron, DEFAULT_WEEKLY_CRON);
        assert_eq!(jobs[1].description.as_deref(), Some("7-day report"));
    }

    #[tokio::test]
    async fn test_invalid_cron_is_rejected() {
        let scheduler = SchedulerService::new().await.unwrap();
        let result = scheduler
            .add_job("broken", "every monday", None, || async {})
            .await;
        assert!(result.is_err());
        assert!(scheduler.list_jobs().await.is_empty());
    }
}
