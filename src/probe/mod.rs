//! Probe module for bandwidth measurement.
//!
//! Downloads a target over HTTP and times the request and the body read.

mod http;
mod record;
#[cfg(test)]
pub(crate) mod testing;

pub use http::*;
pub use record::*;

use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Probe error types.
#[derive(Error, Debug)]
pub enum ProbeError {
    #[error("probe timed out after {0:?}")]
    Timeout(Duration),
    #[error("network error: {0}")]
    Network(String),
    #[error("invalid configuration: {0}")]
    Config(String),
}

/// A URL to download each cycle, with the size it is expected to have.
///
/// The expected size is only reported when a fetch fails before any body
/// bytes were counted.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Target {
    pub url: String,
    pub expected_size: u64,
}

impl Target {
    pub fn new(url: &str, expected_size: u64) -> Self {
        Self {
            url: url.to_string(),
            expected_size,
        }
    }
}

/// Render an error and its whole `source()` chain on a single line.
pub fn describe_error(err: &(dyn std::error::Error + 'static)) -> String {
    let mut s = err.to_string();
    let mut current = err.source();
    while let Some(src) = current {
        let text = src.to_string();
        if !s.contains(&text) {
            s.push_str(": ");
            s.push_str(&text);
        }
        current = src.source();
    }
    s.replace(['\t', '\r', '\n'], " ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Error, Debug)]
    #[error("outer")]
    struct Outer(#[source] std::io::Error);

    #[test]
    fn test_describe_error_walks_chain() {
        let inner = std::io::Error::new(std::io::ErrorKind::Other, "inner\tdetail");
        let err = Outer(inner);
        assert_eq!(describe_error(&err), "outer: inner detail");
    }

    #[test]
    fn test_target_deserialize() {
        let t: Target =
            serde_json::from_str(r#"{"url": "http://example.com/f", "expected_size": 10240}"#)
                .unwrap();
        assert_eq!(t, Target::new("http://example.com/f", 10240));
    }
}
