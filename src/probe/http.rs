//! HTTP download probe.

use std::time::{Duration, Instant};

use super::{describe_error, ProbeError, Target};

/// Result of one download attempt.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The request never produced a response.
    GetFailed { error: ProbeError },
    /// Headers arrived but the body could not be read to the end.
    ReadFailed {
        get_elapsed: Duration,
        error: ProbeError,
    },
    /// The whole body was read.
    Completed {
        bytes: u64,
        get_elapsed: Duration,
        read_elapsed: Duration,
    },
}

impl FetchOutcome {
    /// The failure, if the attempt did not complete.
    pub fn error(&self) -> Option<&ProbeError> {
        match self {
            FetchOutcome::GetFailed { error } | FetchOutcome::ReadFailed { error, .. } => Some(error),
            FetchOutcome::Completed { .. } => None,
        }
    }
}

/// Shared probe client together with the timeout it was built with.
#[derive(Debug, Clone)]
pub struct ProbeClient {
    inner: reqwest::Client,
    timeout: Duration,
}

impl ProbeClient {
    fn classify(&self, err: reqwest::Error) -> ProbeError {
        if err.is_timeout() {
            ProbeError::Timeout(self.timeout)
        } else {
            ProbeError::Network(describe_error(&err))
        }
    }
}

/// Build the shared probe client.
///
/// Compression is turned off so the byte count reflects the payload as sent.
pub fn build_client(timeout: Duration, max_idle_per_host: usize) -> Result<ProbeClient, ProbeError> {
    let inner = reqwest::Client::builder()
        .timeout(timeout)
        .pool_max_idle_per_host(max_idle_per_host)
        .pool_idle_timeout(timeout)
        .no_gzip()
        .no_brotli()
        .no_deflate()
        .build()
        .map_err(|e| ProbeError::Config(describe_error(&e)))?;

    Ok(ProbeClient { inner, timeout })
}

/// Download `target` once, timing the request and the body read separately.
pub async fn fetch(client: &ProbeClient, target: &Target) -> FetchOutcome {
    let start = Instant::now();

    let response = match client.inner.get(&target.url).send().await {
        Ok(resp) => resp,
        Err(e) => {
            return FetchOutcome::GetFailed {
                error: client.classify(e),
            }
        }
    };
    let get_elapsed = start.elapsed();

    if !response.status().is_success() {
        tracing::debug!("{} answered {}, measuring body anyway", target.url, response.status());
    }

    // `bytes()` consumes the response, so the connection goes back to the
    // pool (or is closed) whichever way the read ends.
    let read_start = Instant::now();
    let body = response.bytes().await;
    let read_elapsed = read_start.elapsed();

    match body {
        Ok(body) => FetchOutcome::Completed {
            bytes: body.len() as u64,
            get_elapsed,
            read_elapsed,
        },
        Err(e) => FetchOutcome::ReadFailed {
            get_elapsed,
            error: client.classify(e),
        },
    }
}
