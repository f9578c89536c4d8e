//! Output module for the tab-separated bandwidth log.
//!
//! Provides the header initializer and line sinks.

mod file;
#[cfg(test)]
mod memory;

pub use file::*;
#[cfg(test)]
pub use memory::*;

use std::str::FromStr;
use thiserror::Error;

/// Output error types.
#[derive(Error, Debug)]
pub enum OutputError {
    #[error("I/O error on {path}: {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

/// Destination for formatted log lines.
pub trait LogSink: Send + Sync {
    /// Append one line. The sink adds the trailing newline.
    fn append(&self, line: &str) -> Result<(), OutputError>;
}

/// Column layout of the log.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TimingMode {
    /// GET time and body read time in separate columns.
    #[default]
    Split,
    /// A single elapsed column covering both.
    Merged,
}

impl TimingMode {
    /// Header line, without the trailing newline.
    pub fn header(&self) -> &'static str {
        match self {
            TimingMode::Split => {
                "Date\tTime\tSize (Bytes)\tGet Elapsed Sec\tRead Elapsed Sec\tMb/s"
            }
            TimingMode::Merged => "Date\tTime\tSize (Bytes)\tElapsed Sec\tMb/s",
        }
    }
}

impl FromStr for TimingMode {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "split" => Ok(TimingMode::Split),
            "merged" => Ok(TimingMode::Merged),
            other => Err(format!("unknown timing mode: {}", other)),
        }
    }
}
