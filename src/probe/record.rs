//! Probe records and their log line format.

use chrono::{DateTime, Local};
use std::time::Duration;

use super::{describe_error, FetchOutcome};
use crate::output::TimingMode;

/// Megabits per second for `bytes` transferred in `elapsed`.
///
/// A zero duration yields 0.0 rather than infinity.
pub fn throughput_mbps(bytes: u64, elapsed: Duration) -> f64 {
    let secs = elapsed.as_secs_f64();
    if secs <= 0.0 {
        return 0.0;
    }
    8.0 * bytes as f64 / secs / 1_000_000.0
}

/// One probe attempt, ready to be written as a log line.
#[derive(Debug)]
pub struct ProbeRecord {
    pub started: DateTime<Local>,
    pub expected_size: u64,
    pub outcome: FetchOutcome,
}

impl ProbeRecord {
    pub fn new(started: DateTime<Local>, expected_size: u64, outcome: FetchOutcome) -> Self {
        Self {
            started,
            expected_size,
            outcome,
        }
    }

    pub fn is_success(&self) -> bool {
        matches!(self.outcome, FetchOutcome::Completed { .. })
    }

    /// Throughput as logged for `mode`; 0.0 for failed attempts.
    pub fn throughput_mbps(&self, mode: TimingMode) -> f64 {
        match &self.outcome {
            FetchOutcome::Completed {
                bytes,
                get_elapsed,
                read_elapsed,
            } => match mode {
                TimingMode::Split => throughput_mbps(*bytes, *read_elapsed),
                TimingMode::Merged => throughput_mbps(*bytes, *get_elapsed + *read_elapsed),
            },
            _ => 0.0,
        }
    }

    /// Format as a tab-separated line matching `mode.header()`, plus a
    /// trailing error column for failures.
    pub fn to_line(&self, mode: TimingMode) -> String {
        let date = self.started.format("%Y-%m-%d");
        let time = self.started.format("%H:%M:%S");

        match (&self.outcome, mode) {
            (
                FetchOutcome::Completed {
                    bytes,
                    get_elapsed,
                    read_elapsed,
                },
                TimingMode::Split,
            ) => format!(
                "{}\t{}\t{}\t{:6.4}\t{:6.4}\t{:3.1}",
                date,
                time,
                bytes,
                get_elapsed.as_secs_f64(),
                read_elapsed.as_secs_f64(),
                self.throughput_mbps(mode)
            ),
            (
                FetchOutcome::Completed {
                    bytes,
                    get_elapsed,
                    read_elapsed,
                },
                TimingMode::Merged,
            ) => format!(
                "{}\t{}\t{}\t{:6.4}\t{:3.1}",
                date,
                time,
                bytes,
                (*get_elapsed + *read_elapsed).as_secs_f64(),
                self.throughput_mbps(mode)
            ),
            (FetchOutcome::GetFailed { error }, TimingMode::Split) => format!(
                "{}\t{}\t{}\t\t\t0.0\tget failed with error {}",
                date,
                time,
                self.expected_size,
                describe_error(error)
            ),
            (FetchOutcome::GetFailed { error }, TimingMode::Merged) => format!(
                "{}\t{}\t{}\t\t0.0\tget failed with error {}",
                date,
                time,
                self.expected_size,
                describe_error(error)
            ),
            (FetchOutcome::ReadFailed { get_elapsed, error }, TimingMode::Split) => format!(
                "{}\t{}\t{}\t{:6.4}\t\t0.0\treading contents failed with: {}",
                date,
                time,
                self.expected_size,
                get_elapsed.as_secs_f64(),
                describe_error(error)
            ),
            (FetchOutcome::ReadFailed { get_elapsed, error }, TimingMode::Merged) => format!(
                "{}\t{}\t{}\t{:6.4}\t0.0\treading contents failed with: {}",
                date,
                time,
                self.expected_size,
                get_elapsed.as_secs_f64(),
                describe_error(error)
            ),
        }
    }
}
