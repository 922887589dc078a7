//! Analytics Engine Binary
//!
//! Computes a portfolio report from a snapshot file.
//!
//! # Usage
//!
//! ```bash
//! analytics-engine positions.json          # print the report as JSON
//! analytics-engine --watch positions.json  # recompute on every file change
//! ```
//!
//! # Environment Variables
//!
//! - `ANALYTICS_CONFIG`: Config file path (default: config.yaml; missing file uses defaults)
//! - `RUST_LOG`: Log filter (overrides `observability.logging.level`)

use std::sync::Arc;
use std::time::{Duration, SystemTime};

use anyhow::{Context, bail};
use analytics_engine::config::{Config, load_config_or_default};
use analytics_engine::observability::{init_metrics, init_tracing};
use analytics_engine::{
    EngineError, PortfolioReport, RecomputePortfolioUseCase, RecomputeScheduler,
    RecomputeSchedulerConfig, Snapshot,
};
use tokio::signal;
use tokio::sync::{broadcast, mpsc};

/// Config path environment variable.
const CONFIG_ENV: &str = "ANALYTICS_CONFIG";

const USAGE: &str = "usage: analytics-engine [--watch] <snapshot.json>";

/// How the binary runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    /// Compute once and print.
    Once,
    /// Poll the snapshot file and log each report.
    Watch,
}

#[derive(Debug)]
struct Args {
    mode: Mode,
    snapshot_path: String,
}

fn parse_args(args: impl IntoIterator<Item = String>) -> anyhow::Result<Args> {
    let mut mode = Mode::Once;
    let mut snapshot_path = None;

    for arg in args {
        if arg == "--watch" || arg == "-w" {
            mode = Mode::Watch;
        } else if arg == "--help" || arg == "-h" {
            bail!(USAGE);
        } else if arg.starts_with('-') {
            bail!("unknown option '{arg}'\n{USAGE}");
        } else if snapshot_path.is_some() {
            bail!("unexpected argument '{arg}'\n{USAGE}");
        } else {
            snapshot_path = Some(arg);
        }
    }

    let Some(snapshot_path) = snapshot_path else {
        bail!(USAGE);
    };
    Ok(Args {
        mode,
        snapshot_path,
    })
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = parse_args(std::env::args().skip(1))?;

    let config_path = std::env::var(CONFIG_ENV).ok();
    let config = load_config_or_default(config_path.as_deref())
        .map_err(EngineError::from)
        .context("loading configuration")?;

    init_tracing(&config.observability.logging).map_err(EngineError::from)?;
    if config.observability.metrics.enabled {
        init_metrics(&config.observability.metrics).map_err(EngineError::from)?;
    }

    let use_case = RecomputePortfolioUseCase::from_config(&config).map_err(EngineError::from)?;

    match args.mode {
        Mode::Once => {
            let snapshot = read_snapshot(&args.snapshot_path).await?;
            let report = use_case.execute(&snapshot);
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
        Mode::Watch => {
            tracing::info!(path = %args.snapshot_path, "Starting analytics engine in watch mode");
            run_watch(&config, use_case, args.snapshot_path).await?;
            tracing::info!("Analytics engine stopped");
        }
    }

    Ok(())
}

async fn read_snapshot(path: &str) -> Result<Snapshot, EngineError> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|e| EngineError::io(path, e))?;
    Snapshot::from_json(&contents).map_err(|e| EngineError::snapshot(path, e))
}

/// Feed file changes into the scheduler and log reports until shutdown.
async fn run_watch(config: &Config, use_case: RecomputePortfolioUseCase, path: String) -> anyhow::Result<()> {
    let (update_tx, update_rx) = mpsc::channel(16);
    let (shutdown_tx, _) = broadcast::channel::<()>(1);

    let scheduler = RecomputeScheduler::new(
        Arc::new(use_case),
        RecomputeSchedulerConfig::from(&config.scheduler),
    );
    let mut handle = scheduler.spawn(update_rx, shutdown_tx.subscribe());
    let poller = tokio::spawn(poll_snapshot(
        path,
        config.scheduler.poll_interval(),
        update_tx,
        shutdown_tx.subscribe(),
    ));

    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            changed = handle.reports.changed() => {
                if changed.is_err() {
                    tracing::warn!("Recompute scheduler stopped");
                    break;
                }
                let latest = handle.reports.borrow_and_update().clone();
                if let Some(report) = latest {
                    log_report(&report);
                }
            }
            () = &mut shutdown => break,
        }
    }

    let _ = shutdown_tx.send(());
    handle.task.await.context("scheduler task")?;
    poller.await.context("snapshot poller task")?;
    Ok(())
}

/// Send the snapshot whenever the file's modification time changes.
async fn poll_snapshot(
    path: String,
    interval: Duration,
    updates: mpsc::Sender<Snapshot>,
    mut shutdown: broadcast::Receiver<()>,
) {
    let mut ticker = tokio::time::interval(interval);
    let mut last_modified: Option<SystemTime> = None;

    loop {
        tokio::select! {
            _ = ticker.tick() => {
                let modified = match tokio::fs::metadata(&path).await.and_then(|m| m.modified()) {
                    Ok(modified) => modified,
                    Err(e) => {
                        tracing::warn!(path = %path, error = %e, "Cannot stat snapshot");
                        continue;
                    }
                };
                if last_modified == Some(modified) {
                    continue;
                }

                match read_snapshot(&path).await {
                    Ok(snapshot) => {
                        last_modified = Some(modified);
                        tracing::debug!(path = %path, as_of = %snapshot.as_of, "Snapshot changed");
                        if updates.send(snapshot).await.is_err() {
                            break;
                        }
                    }
                    // retried on the next tick; the file may be mid-write
                    Err(e) => tracing::warn!(error = %e, "Failed to load snapshot"),
                }
            }
            _ = shutdown.recv() => break,
        }
    }
}

fn log_report(report: &PortfolioReport) {
    let totals = &report.portfolio.totals;
    tracing::info!(
        as_of = %report.as_of,
        groups = report.groups.len(),
        rejected_legs = report.rejected_legs.len(),
        net_delta = totals.net_delta,
        net_theta = totals.net_theta,
        delta_dollars = totals.delta_dollars,
        max_risk = %totals.max_risk,
        unrealized_pnl = %totals.unrealized_pnl,
        "Portfolio report"
    );

    for group in report.alerts() {
        if let Some(roll) = &group.roll {
            for badge in &roll.badges {
                tracing::warn!(
                    group_id = %group.group_id,
                    strategy = %roll.strategy,
                    badge = ?badge.kind,
                    "{}",
                    badge.message
                );
            }
        }
    }
}

/// Wait for Ctrl+C or SIGTERM.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to listen for Ctrl+C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("Received Ctrl+C, initiating shutdown");
        }
        () = terminate => {
            tracing::info!("Received SIGTERM, initiating shutdown");
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> anyhow::Result<Args> {
        parse_args(list.iter().map(|s| (*s).to_string()))
    }

    #[test]
    fn parses_one_shot_and_watch() {
        let parsed = args(&["positions.json"]).unwrap();
        assert_eq!(parsed.mode, Mode::Once);
        assert_eq!(parsed.snapshot_path, "positions.json");

        let parsed = args(&["--watch", "positions.json"]).unwrap();
        assert_eq!(parsed.mode, Mode::Watch);
    }

    #[test]
    fn rejects_missing_or_extra_arguments() {
        assert!(args(&[]).is_err());
        assert!(args(&["a.json", "b.json"]).is_err());
        assert!(args(&["--verbose", "a.json"]).is_err());
    }
}
