//! One pass over all targets.

use crate::output::{LogSink, TimingMode};
use crate::probe::{describe_error, fetch, ProbeClient, ProbeRecord, Target};

use chrono::Local;
use std::sync::Arc;

/// Probes every target in order and logs one line per target.
pub struct ProbeCycle {
    targets: Vec<Target>,
    client: ProbeClient,
    sink: Arc<dyn LogSink>,
    mode: TimingMode,
}

impl ProbeCycle {
    pub fn new(
        targets: Vec<Target>,
        client: ProbeClient,
        sink: Arc<dyn LogSink>,
        mode: TimingMode,
    ) -> Self {
        Self {
            targets,
            client,
            sink,
            mode,
        }
    }

    /// Probe all targets sequentially.
    ///
    /// Failures of a single target, including failures to write its line,
    /// never stop the remaining targets.
    pub async fn run_cycle(&self) {
        let mut succeeded = 0;

        for target in &self.targets {
            let record = self.probe_target(target).await;
            if record.is_success() {
                succeeded += 1;
            }
            self.record(&record);
        }

        tracing::info!(
            "Probe cycle done: {}/{} targets succeeded",
            succeeded,
            self.targets.len()
        );
    }

    async fn probe_target(&self, target: &Target) -> ProbeRecord {
        let started = Local::now();
        let outcome = fetch(&self.client, target).await;
        let record = ProbeRecord::new(started, target.expected_size, outcome);

        match record.outcome.error() {
            None => tracing::debug!(
                "{}: {:.1} Mb/s",
                target.url,
                record.throughput_mbps(self.mode)
            ),
            Some(error) => tracing::warn!("{}: {}", target.url, describe_error(error)),
        }

        record
    }

    fn record(&self, record: &ProbeRecord) {
        if let Err(e) = self.sink.append(&record.to_line(self.mode)) {
            tracing::warn!("Failed to write log line: {}", e);
        }
    }
}
