// src/monitor.rs
// Top-level orchestrator: one shared HTTP client + conditional fetcher,
// one watcher task per configured provider, all multiplexed on the tokio
// runtime. 100 status pages means 100 tasks sharing one connection pool,
// not 100 threads.

use std::sync::Arc;

use anyhow::{Context, Result};
use metrics::{describe_counter, describe_gauge};
use once_cell::sync::OnceCell;
use tokio_util::sync::CancellationToken;

use crate::config::MonitorConfig;
use crate::differ::UpdateDiffer;
use crate::fetch::ConditionalFetcher;
use crate::notify::{Notifier, NotifierMux};
use crate::watcher::ProviderWatcher;

/// One-time metrics registration (so series show up in exporters).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("statuswatch_polls_total", "Poll cycles started.");
        describe_counter!(
            "statuswatch_not_modified_total",
            "Conditional GETs answered 304."
        );
        describe_counter!(
            "statuswatch_fetch_errors_total",
            "Fetch failures (timeout, status, transport)."
        );
        describe_counter!(
            "statuswatch_updates_emitted_total",
            "Novel incident updates delivered to notifiers."
        );
        describe_gauge!(
            "statuswatch_watchers",
            "Number of provider watchers running."
        );
    });
}

pub struct Monitor {
    cfg: Arc<MonitorConfig>,
    cancel: CancellationToken,
}

impl Monitor {
    pub fn new(cfg: MonitorConfig) -> Self {
        Self {
            cfg: Arc::new(cfg),
            cancel: CancellationToken::new(),
        }
    }

    /// Run all watchers until every one of them has terminated, which,
    /// in normal operation, happens only after `stop()`.
    ///
    /// Failing to build the shared HTTP client is the one fatal setup
    /// error; everything after that is per-provider and isolated.
    pub async fn run(&self) -> Result<()> {
        ensure_metrics_described();

        let client = reqwest::Client::builder()
            .user_agent(concat!("statuswatch/", env!("CARGO_PKG_VERSION")))
            .build()
            .context("building shared HTTP client")?;
        let fetcher = Arc::new(ConditionalFetcher::new(
            client,
            self.cfg.request_timeout(),
            self.cfg.pool_limit,
        ));
        let notifier: Arc<dyn Notifier> = Arc::new(NotifierMux::from_env());

        let mut handles = Vec::with_capacity(self.cfg.providers.len());
        for page in &self.cfg.providers {
            // One differ per provider: update ids are only unique within
            // a provider, and seen-state must stay isolated.
            let watcher = ProviderWatcher::new(
                page,
                Arc::clone(&self.cfg),
                Arc::clone(&fetcher),
                UpdateDiffer::new(),
                Arc::clone(&notifier),
            );
            handles.push(tokio::spawn(watcher.run(self.cancel.child_token())));
        }

        metrics::gauge!("statuswatch_watchers").set(handles.len() as f64);
        tracing::info!(pages = handles.len(), "statuswatch running");

        // Block until every watcher task has actually terminated, so a
        // caller returning from run() knows nothing is still in flight.
        for handle in handles {
            if let Err(e) = handle.await {
                if e.is_panic() {
                    tracing::error!(error = %e, "watcher task panicked");
                }
            }
        }

        tracing::info!("all watchers stopped");
        Ok(())
    }

    /// Request cooperative cancellation of every watcher. Idempotent,
    /// non-blocking, safe to call from any task or thread.
    pub fn stop(&self) {
        self.cancel.cancel();
    }
}
