//! Recompute Scheduler
//!
//! Host-side service that coalesces snapshot updates and publishes the
//! latest report. The engine itself stays synchronous; each recompute runs
//! on the blocking pool.
//!
//! # Flow
//!
//! ```text
//! mpsc<Snapshot> ──> debounce window ──> RecomputePortfolioUseCase ──> watch<report>
//! ```
//!
//! Updates arriving within the debounce window replace the pending snapshot;
//! the window is not extended, so a steady stream still produces a report
//! per window.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{broadcast, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};

use crate::application::dto::{PortfolioReport, Snapshot};
use crate::application::use_cases::RecomputePortfolioUseCase;
use crate::config::SchedulerConfig;

/// Latest published report; `None` until the first recompute.
pub type LatestReport = Option<Arc<PortfolioReport>>;

/// Configuration for the recompute scheduler.
#[derive(Debug, Clone)]
pub struct RecomputeSchedulerConfig {
    /// Coalescing window.
    pub debounce: Duration,
}

impl Default for RecomputeSchedulerConfig {
    fn default() -> Self {
        Self {
            debounce: Duration::from_secs(2),
        }
    }
}

impl From<&SchedulerConfig> for RecomputeSchedulerConfig {
    fn from(config: &SchedulerConfig) -> Self {
        Self {
            debounce: config.debounce(),
        }
    }
}

/// Handle to a running scheduler.
#[derive(Debug)]
pub struct SchedulerHandle {
    /// Receives each published report.
    pub reports: watch::Receiver<LatestReport>,
    /// Scheduler task; completes after shutdown or when the input closes.
    pub task: JoinHandle<()>,
}

/// Debouncing scheduler over the recompute use case.
#[derive(Debug, Clone)]
pub struct RecomputeScheduler {
    use_case: Arc<RecomputePortfolioUseCase>,
    config: RecomputeSchedulerConfig,
}

impl RecomputeScheduler {
    /// Create a new scheduler.
    #[must_use]
    pub const fn new(use_case: Arc<RecomputePortfolioUseCase>, config: RecomputeSchedulerConfig) -> Self {
        Self { use_case, config }
    }

    /// Start the scheduler task.
    ///
    /// The task stops when `shutdown` fires or `updates` closes. On close,
    /// a pending snapshot is still computed and published.
    pub fn spawn(
        self,
        mut updates: mpsc::Receiver<Snapshot>,
        mut shutdown: broadcast::Receiver<()>,
    ) -> SchedulerHandle {
        let (report_tx, report_rx) = watch::channel::<LatestReport>(None);
        let debounce = self.config.debounce;

        let task = tokio::spawn(async move {
            let mut pending: Option<Snapshot> = None;
            let mut deadline = Instant::now();

            loop {
                tokio::select! {
                    update = updates.recv() => {
                        match update {
                            Some(snapshot) => {
                                if pending.is_none() {
                                    deadline = Instant::now() + debounce;
                                }
                                tracing::debug!(
                                    as_of = %snapshot.as_of,
                                    coalesced = pending.is_some(),
                                    "Snapshot queued"
                                );
                                pending = Some(snapshot);
                            }
                            None => {
                                if let Some(snapshot) = pending.take() {
                                    self.publish(snapshot, &report_tx).await;
                                }
                                tracing::info!("Snapshot channel closed");
                                break;
                            }
                        }
                    }
                    () = sleep_until(deadline), if pending.is_some() => {
                        if let Some(snapshot) = pending.take() {
                            self.publish(snapshot, &report_tx).await;
                        }
                    }
                    _ = shutdown.recv() => {
                        tracing::info!("Recompute scheduler shutting down");
                        break;
                    }
                }
            }
        });

        SchedulerHandle {
            reports: report_rx,
            task,
        }
    }

    async fn publish(&self, snapshot: Snapshot, report_tx: &watch::Sender<LatestReport>) {
        let use_case = Arc::clone(&self.use_case);
        match tokio::task::spawn_blocking(move || use_case.execute(&snapshot)).await {
            Ok(report) => {
                report_tx.send_replace(Some(Arc::new(report)));
            }
            Err(e) => {
                tracing::error!(error = %e, "Recompute task failed");
            }
        }
    }
}
