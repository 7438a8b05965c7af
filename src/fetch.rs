// src/fetch.rs
// ETag-based conditional GET client.
//
// Every response from a Statuspage-style API includes an ETag header. We
// store it and send it back as If-None-Match on the next request; when
// nothing changed the server answers 304 Not Modified with no body: zero
// JSON parsing, zero diffing, zero alerts, near-zero bandwidth. This is
// the steady-state cost mechanism for HTTP sources without webhooks.

use std::collections::HashMap;
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

use metrics::counter;
use reqwest::header::{ETAG, IF_NONE_MATCH};
use reqwest::{Client, StatusCode};
use serde_json::Value;
use tokio::sync::Semaphore;

/// Result of a conditional GET that completed at the HTTP level.
#[derive(Debug)]
pub enum FetchOutcome {
    /// 200 with a decoded JSON body; the resource changed.
    Changed(Value),
    /// 304: nothing changed, skip all downstream processing.
    Unchanged,
}

/// Failure kinds for a single fetch. All of them are treated as transient
/// by the watch loop; the split exists so logs and tests can tell a slow
/// provider from a broken one.
#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("request timed out")]
    Timeout,
    #[error("unexpected HTTP status {0}")]
    Status(StatusCode),
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),
}

/// Conditional GET client shared by every watcher.
///
/// One instance process-wide: the ETag cache is keyed by full URL, so
/// repeated polls of the same URL benefit from the cache regardless of
/// which watcher (or retry) issues them. The semaphore bounds in-flight
/// requests across all watchers.
#[derive(Debug)]
pub struct ConditionalFetcher {
    client: Client,
    request_timeout: Duration,
    permits: Semaphore,
    etags: Mutex<HashMap<String, String>>,
}

impl ConditionalFetcher {
    pub fn new(client: Client, request_timeout: Duration, pool_limit: usize) -> Self {
        Self {
            client,
            request_timeout,
            permits: Semaphore::new(pool_limit),
            etags: Mutex::new(HashMap::new()),
        }
    }

    /// Perform a conditional GET against `url`.
    ///
    /// The ETag cache is only written on a 2xx response that carries an
    /// ETag header; errors and 304s leave it untouched.
    pub async fn fetch(&self, url: &str) -> Result<FetchOutcome, FetchError> {
        // Never closed, so acquire can only fail after a close we never issue.
        let _permit = self
            .permits
            .acquire()
            .await
            .expect("connection limiter closed");

        let mut request = self.client.get(url).timeout(self.request_timeout);
        if let Some(etag) = self.cached_etag(url) {
            request = request.header(IF_NONE_MATCH, etag);
        }

        let resp = request.send().await.map_err(classify)?;

        if resp.status() == StatusCode::NOT_MODIFIED {
            tracing::debug!(url, "304 Not Modified");
            counter!("statuswatch_not_modified_total").increment(1);
            return Ok(FetchOutcome::Unchanged);
        }

        if !resp.status().is_success() {
            tracing::warn!(url, status = %resp.status(), "HTTP error fetching incidents");
            counter!("statuswatch_fetch_errors_total").increment(1);
            return Err(FetchError::Status(resp.status()));
        }

        if let Some(etag) = resp
            .headers()
            .get(ETAG)
            .and_then(|v| v.to_str().ok())
            .map(str::to_owned)
        {
            self.etags
                .lock()
                .unwrap_or_else(PoisonError::into_inner)
                .insert(url.to_string(), etag);
        }

        let data = resp.json::<Value>().await.map_err(classify)?;
        Ok(FetchOutcome::Changed(data))
    }

    fn cached_etag(&self, url: &str) -> Option<String> {
        self.etags
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .get(url)
            .cloned()
    }
}

fn classify(e: reqwest::Error) -> FetchError {
    if e.is_timeout() {
        tracing::warn!(error = %e, "timeout fetching incidents");
        counter!("statuswatch_fetch_errors_total").increment(1);
        FetchError::Timeout
    } else {
        tracing::warn!(error = %e, "transport error fetching incidents");
        counter!("statuswatch_fetch_errors_total").increment(1);
        FetchError::Transport(e)
    }
}
