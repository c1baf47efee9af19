/// Periodic sync scheduler
///
/// Runs every registered job, one after another, on each tick of a fixed
/// interval. The first round starts immediately. A failing job is logged and
/// the round moves on; only cancellation stops the loop.
///
/// ```text
/// SyncScheduler::run()
///   loop {
///     select! { tick => run jobs in order, cancelled => break }
///   }
/// ```
///
/// # Example
///
/// ```no_run
/// use wizelabs_worker::scheduler::SyncScheduler;
/// use std::time::Duration;
///
/// # async fn example() {
/// let scheduler = SyncScheduler::new(Duration::from_secs(3600));
/// let token = scheduler.shutdown_token();
///
/// tokio::spawn(async move {
///     tokio::signal::ctrl_c().await.ok();
///     token.cancel();
/// });
///
/// scheduler.run().await;
/// # }
/// ```

use async_trait::async_trait;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;

#[derive(Debug, thiserror::Error)]
pub enum SyncError {
    #[error(transparent)]
    GitHub(#[from] crate::github::GitHubError),

    #[error(transparent)]
    Warehouse(#[from] crate::consolidation::WarehouseError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{0}")]
    Other(String),
}

/// A unit of work the scheduler runs every round
#[async_trait]
pub trait SyncJob: Send + Sync {
    fn name(&self) -> &str;

    /// Runs one pass; the returned string is a one-line summary for the log
    async fn run(&self) -> Result<String, SyncError>;
}

pub struct SyncScheduler {
    interval: Duration,
    jobs: Vec<Arc<dyn SyncJob>>,
    shutdown_token: CancellationToken,
}

impl SyncScheduler {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            jobs: Vec::new(),
            shutdown_token: CancellationToken::new(),
        }
    }

    pub fn register(&mut self, job: Arc<dyn SyncJob>) {
        tracing::info!(job = job.name(), "Registering sync job");
        self.jobs.push(job);
    }

    pub fn job_count(&self) -> usize {
        self.jobs.len()
    }

    pub fn shutdown_token(&self) -> CancellationToken {
        self.shutdown_token.clone()
    }

    /// Runs all jobs once, in registration order
    pub async fn run_once(&self) {
        for job in &self.jobs {
            if self.shutdown_token.is_cancelled() {
                break;
            }

            let started = Instant::now();
            match job.run().await {
                Ok(summary) => tracing::info!(
                    job = job.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "{}",
                    summary
                ),
                Err(e) => tracing::error!(
                    job = job.name(),
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    error = %e,
                    "Sync job failed"
                ),
            }
        }
    }

    /// Runs until the shutdown token is cancelled
    pub async fn run(&self) {
        tracing::info!(
            jobs = self.jobs.len(),
            interval_secs = self.interval.as_secs(),
            "Sync scheduler starting"
        );

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        loop {
            tokio::select! {
                biased;
                _ = self.shutdown_token.cancelled() => break,
                _ = ticker.tick() => {
                    tokio::select! {
                        biased;
                        _ = self.shutdown_token.cancelled() => break,
                        _ = self.run_once() => {}
                    }
                }
            }
        }

        tracing::info!("Sync scheduler stopped");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingJob {
        name: &'static str,
        runs: AtomicUsize,
        fail: bool,
    }

    impl CountingJob {
        fn new(name: &'static str, fail: bool) -> Arc<Self> {
            Arc::new(Self {
                name,
                runs: AtomicUsize::new(0),
                fail,
            })
        }

        fn runs(&self) -> usize {
            self.runs.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl SyncJob for CountingJob {
        fn name(&self) -> &str {
            self.name
        }

        async fn run(&self) -> Result<String, SyncError> {
            let n = self.runs.fetch_add(1, Ordering::SeqCst) + 1;
            if self.fail {
                Err(SyncError::Other(format!("run {} failed", n)))
            } else {
                Ok(format!("run {} ok", n))
            }
        }
    }

    #[tokio::test]
    async fn test_run_once_runs_every_job() {
        let first = CountingJob::new("first", false);
        let second = CountingJob::new("second", false);

        let mut scheduler = SyncScheduler::new(Duration::from_secs(60));
        scheduler.register(first.clone());
        scheduler.register(second.clone());
        assert_eq!(scheduler.job_count(), 2);

        scheduler.run_once().await;

        assert_eq!(first.runs(), 1);
        assert_eq!(second.runs(), 1);
    }

    #[tokio::test]
    async fn test_failing_job_does_not_stop_round() {
        let failing = CountingJob::new("failing", true);
        let healthy = CountingJob::new("healthy", false);

        let mut scheduler = SyncScheduler::new(Duration::from_secs(60));
        scheduler.register(failing.clone());
        scheduler.register(healthy.clone());

        scheduler.run_once().await;
        scheduler.run_once().await;

        assert_eq!(failing.runs(), 2);
        assert_eq!(healthy.runs(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_runs_each_tick_until_cancelled() {
        let job = CountingJob::new("ticker", false);

        let mut scheduler = SyncScheduler::new(Duration::from_secs(10));
        scheduler.register(job.clone());
        let token = scheduler.shutdown_token();

        let handle = tokio::spawn(async move { scheduler.run().await });

        // Immediate first round, then one per interval
        tokio::time::sleep(Duration::from_secs(25)).await;
        assert_eq!(job.runs(), 3);

        token.cancel();
        handle.await.unwrap();

        tokio::time::sleep(Duration::from_secs(30)).await;
        assert_eq!(job.runs(), 3);
    }

    #[tokio::test]
    async fn test_cancelled_before_start() {
        let job = CountingJob::new("never", false);

        let mut scheduler = SyncScheduler::new(Duration::from_secs(10));
        scheduler.register(job.clone());
        scheduler.shutdown_token().cancel();

        scheduler.run().await;
        assert_eq!(job.runs(), 0);
    }
}
