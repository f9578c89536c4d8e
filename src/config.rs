//! Configuration module for the bandwidth monitor.
//!
//! Compiled-in defaults, optionally overridden by environment variables.

use crate::output::TimingMode;
use crate::probe::Target;

use std::env;
use std::path::PathBuf;
use std::time::Duration;

/// Monitor configuration.
#[derive(Debug, Clone)]
pub struct MonitorConfig {
    /// Tab-separated log file (default: "bandwidth_monitor_log.txt")
    pub log_path: PathBuf,
    /// Delay before the first probe cycle (default: 1s)
    pub first_delay: Duration,
    /// Interval between steady-state probe cycles (default: 2 minutes)
    pub interval: Duration,
    /// Whole-request timeout, body included (default: 45s)
    pub timeout: Duration,
    /// Idle connections kept per host between cycles (default: 10)
    pub max_idle_connections: usize,
    /// Whether GET and body-read times are logged separately (default: split)
    pub timing_mode: TimingMode,
    /// Targets probed each cycle, in order
    pub targets: Vec<Target>,
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            log_path: PathBuf::from("bandwidth_monitor_log.txt"),
            first_delay: Duration::from_secs(1),
            interval: Duration::from_secs(2 * 60),
            timeout: Duration::from_secs(45),
            max_idle_connections: 10,
            timing_mode: TimingMode::Split,
            targets: default_targets(),
        }
    }
}

/// The compiled-in target list.
pub fn default_targets() -> Vec<Target> {
    vec![
        Target::new("http://simonshome.org/tenk_random.txt", 10_240),
        Target::new("http://simonshome.org/megabyte_random.txt", 1_000_000),
        Target::new("http://simonshome.org/two_meg_random.txt", 2_000_000),
    ]
}

/// Parse a JSON array of `{"url": ..., "expected_size": ...}` objects.
pub fn parse_targets(json: &str) -> Result<Vec<Target>, String> {
    let targets: Vec<Target> = serde_json::from_str(json).map_err(|e| e.to_string())?;
    if targets.is_empty() {
        return Err("target list is empty".to_string());
    }
    Ok(targets)
}

impl MonitorConfig {
    /// Load configuration from environment variables.
    ///
    /// Environment variables:
    /// - `BANDWIDTH_LOG_PATH`: log file path
    /// - `BANDWIDTH_FIRST_DELAY_SECONDS`: delay before the first cycle
    /// - `BANDWIDTH_INTERVAL_MINUTES`: minutes between cycles
    /// - `BANDWIDTH_TIMEOUT_SECONDS`: request timeout
    /// - `BANDWIDTH_MAX_IDLE_CONNECTIONS`: idle pool size per host
    /// - `BANDWIDTH_TIMING_MODE`: `split` or `merged`
    /// - `BANDWIDTH_TARGETS`: JSON target list
    pub fn load() -> Self {
        Self::default().apply(|key| env::var(key).ok())
    }

    /// Apply overrides from `lookup`. Values that fail to parse are ignored.
    pub fn apply<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(path) = lookup("BANDWIDTH_LOG_PATH") {
            if !path.trim().is_empty() {
                self.log_path = PathBuf::from(path);
            }
        }

        if let Some(secs) = parse_var::<u64>(&lookup, "BANDWIDTH_FIRST_DELAY_SECONDS") {
            self.first_delay = Duration::from_secs(secs);
        }

        match parse_var::<u64>(&lookup, "BANDWIDTH_INTERVAL_MINUTES") {
            Some(0) => tracing::warn!("Ignoring BANDWIDTH_INTERVAL_MINUTES=0"),
            Some(mins) => self.interval = Duration::from_secs(mins * 60),
            None => {}
        }

        match parse_var::<u64>(&lookup, "BANDWIDTH_TIMEOUT_SECONDS") {
            Some(0) => tracing::warn!("Ignoring BANDWIDTH_TIMEOUT_SECONDS=0"),
            Some(secs) => self.timeout = Duration::from_secs(secs),
            None => {}
        }

        if let Some(n) = parse_var::<usize>(&lookup, "BANDWIDTH_MAX_IDLE_CONNECTIONS") {
            self.max_idle_connections = n;
        }

        if let Some(mode) = parse_var::<TimingMode>(&lookup, "BANDWIDTH_TIMING_MODE") {
            self.timing_mode = mode;
        }

        if let Some(json) = lookup("BANDWIDTH_TARGETS") {
            match parse_targets(&json) {
                Ok(targets) => self.targets = targets,
                Err(e) => tracing::warn!("Ignoring BANDWIDTH_TARGETS: {}", e),
            }
        }

        self
    }
}

fn parse_var<T: std::str::FromStr>(lookup: &impl Fn(&str) -> Option<String>, key: &str) -> Option<T> {
    let raw = lookup(key)?;
    match raw.trim().parse() {
        Ok(v) => Some(v),
        Err(_) => {
            tracing::warn!("Ignoring unparsable {}={:?}", key, raw);
            None
        }
    }
}
