//! Scheduler module for running probe cycles.

mod cycle;

pub use cycle::*;

use std::future::Future;
use std::time::Duration;
use tokio::sync::broadcast;
use tokio::time::{Instant, Interval, MissedTickBehavior};

/// Where the scheduler is in its two-phase timer.
enum Phase {
    /// Waiting out the short startup delay.
    AwaitingFirstTick,
    /// Ticking at the configured interval.
    SteadyState(Interval),
}

/// Runs a job once shortly after startup, then at a fixed interval.
pub struct Scheduler {
    first_delay: Duration,
    interval: Duration,
}

impl Scheduler {
    /// `interval` must be non-zero.
    pub fn new(first_delay: Duration, interval: Duration) -> Self {
        Self {
            first_delay,
            interval,
        }
    }

    /// Run `job` on every tick until a stop message arrives or the stop
    /// channel closes.
    ///
    /// A job that is already running is awaited to completion; the stop is
    /// only observed between jobs.
    pub async fn run<J, F>(&self, mut job: J, mut stop_rx: broadcast::Receiver<()>)
    where
        J: FnMut() -> F,
        F: Future<Output = ()>,
    {
        let mut phase = Phase::AwaitingFirstTick;

        loop {
            phase = match phase {
                Phase::AwaitingFirstTick => {
                    tokio::select! {
                        biased;
                        _ = stop_rx.recv() => break,
                        _ = tokio::time::sleep(self.first_delay) => {}
                    }

                    tracing::debug!("First tick, switching to {:?} interval", self.interval);
                    let mut interval =
                        tokio::time::interval_at(Instant::now() + self.interval, self.interval);
                    interval.set_missed_tick_behavior(MissedTickBehavior::Skip);

                    job().await;
                    Phase::SteadyState(interval)
                }
                Phase::SteadyState(mut interval) => {
                    tokio::select! {
                        biased;
                        _ = stop_rx.recv() => break,
                        _ = interval.tick() => {}
                    }

                    job().await;
                    Phase::SteadyState(interval)
                }
            };
        }

        tracing::info!("Scheduler stopped");
    }
}
