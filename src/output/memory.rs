//! In-memory sink for tests.

use std::sync::Mutex;

use super::{LogSink, OutputError};

#[derive(Debug, Default)]
pub struct MemorySink {
    lines: Mutex<Vec<String>>,
    fail: bool,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// A sink whose every append fails.
    pub fn failing() -> Self {
        Self {
            lines: Mutex::new(Vec::new()),
            fail: true,
        }
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().unwrap().clone()
    }
}

impl LogSink for MemorySink {
    fn append(&self, line: &str) -> Result<(), OutputError> {
        if self.fail {
            return Err(OutputError::Io {
                path: "<memory>".to_string(),
                source: std::io::Error::new(std::io::ErrorKind::Other, "sink unavailable"),
            });
        }
        self.lines.lock().unwrap().push(line.to_string());
        Ok(())
    }
}
