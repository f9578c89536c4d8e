//! Bandwidth Monitor
//!
//! Periodically downloads a few fixed-size files and appends the measured
//! throughput to a tab-separated log.

mod config;
mod output;
mod probe;
mod scheduler;

use config::MonitorConfig;
use output::FileSink;
use scheduler::{ProbeCycle, Scheduler};

use std::future::Future;
use std::sync::Arc;
use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Initialize logging
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("bandwidth_monitor=info".parse()?))
        .init();

    let cfg = MonitorConfig::load();
    tracing::info!(
        "Starting bandwidth monitor: {} targets every {:?}, log at {}",
        cfg.targets.len(),
        cfg.interval,
        cfg.log_path.display()
    );

    // Nothing useful can happen without a writable log.
    if let Err(e) = output::ensure_header(&cfg.log_path, cfg.timing_mode) {
        tracing::error!("Cannot prepare log file: {}", e);
        return Err(e.into());
    }

    let client = probe::build_client(cfg.timeout, cfg.max_idle_connections)?;
    let cycle = Arc::new(ProbeCycle::new(
        cfg.targets,
        client,
        Arc::new(FileSink::new(&cfg.log_path)),
        cfg.timing_mode,
    ));
    let scheduler = Scheduler::new(cfg.first_delay, cfg.interval);

    let (stop_tx, stop_rx) = broadcast::channel(1);

    let worker = tokio::spawn(async move {
        scheduler
            .run(
                move || {
                    let cycle = cycle.clone();
                    async move { cycle.run_cycle().await }
                },
                stop_rx,
            )
            .await;
    });

    supervise(worker, shutdown_signal(), stop_tx).await
}

/// Wait for a shutdown request or for the loop task to end on its own.
///
/// The loop only returns after a stop, so a loop that ends first has died
/// and is reported as an error.
async fn supervise<S>(
    mut worker: JoinHandle<()>,
    shutdown: S,
    stop_tx: broadcast::Sender<()>,
) -> Result<(), Box<dyn std::error::Error + Send + Sync>>
where
    S: Future<Output = ()>,
{
    tokio::select! {
        _ = shutdown => {
            tracing::info!("Shutdown requested, waiting for the current cycle to finish");
            let _ = stop_tx.send(());
            worker.await?;
            Ok(())
        }
        res = &mut worker => {
            if let Err(e) = res {
                tracing::error!("Probe loop failed: {}", e);
                return Err(e.into());
            }
            tracing::error!("Probe loop exited unexpectedly");
            Err("probe loop exited unexpectedly".into())
        }
    }
}

/// Resolve on Ctrl-C, or SIGTERM on Unix.
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            tracing::error!("Failed to listen for Ctrl-C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {}
        _ = terminate => {}
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_supervise_reports_panicked_loop() {
        let (stop_tx, _stop_rx) = broadcast::channel(1);
        let worker = tokio::spawn(async { panic!("cycle blew up") });

        let result = supervise(worker, std::future::pending(), stop_tx).await;
        assert!(result.is_err());
    }

    #[tokio::test]
    async fn test_supervise_reports_loop_that_returned() {
        let (stop_tx, _stop_rx) = broadcast::channel(1);
        let worker = tokio::spawn(async {});

        let result = supervise(worker, std::future::pending(), stop_tx).await;
        assert!(result.is_err());
    }

    #[tokio::test(start_paused = true)]
    async fn test_supervise_stops_loop_on_shutdown() {
        let (stop_tx, stop_rx) = broadcast::channel(1);
        let scheduler = Scheduler::new(Duration::from_secs(1), Duration::from_secs(60));
        let worker = tokio::spawn(async move {
            scheduler.run(|| std::future::ready(()), stop_rx).await;
        });

        let shutdown = tokio::time::sleep(Duration::from_secs(90));
        let result = supervise(worker, shutdown, stop_tx).await;
        assert!(result.is_ok());
    }
}
