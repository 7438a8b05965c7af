// src/watcher.rs
// Poll loop for a single status page provider.
//
// Each cycle: conditional fetch → parse → diff → hand novel updates to
// the notifier, in chronological order, one at a time. Transient network
// failures back off exponentially; anything else is logged and the loop
// carries on at the normal cadence. Only cancellation stops a watcher.

use std::sync::Arc;
use std::time::Duration;

use metrics::counter;
use tokio_util::sync::CancellationToken;

use crate::config::{MonitorConfig, ProviderConfig};
use crate::differ::UpdateDiffer;
use crate::fetch::{ConditionalFetcher, FetchOutcome};
use crate::notify::Notifier;
use crate::parser::parse_incidents;

/// Backoff formula: base * 2^retry_count, capped at `max_secs`.
/// Callers cap `retry_count` before applying the formula so the shift
/// can't overflow in very long-running processes.
pub fn backoff_delay(base_secs: u64, max_secs: u64, retry_count: u32) -> Duration {
    let raw = base_secs.saturating_mul(2u64.saturating_pow(retry_count));
    Duration::from_secs(raw.min(max_secs))
}

pub struct ProviderWatcher {
    provider: String,
    url: String,
    cfg: Arc<MonitorConfig>,
    fetcher: Arc<ConditionalFetcher>,
    differ: UpdateDiffer,
    notifier: Arc<dyn Notifier>,
}

impl ProviderWatcher {
    pub fn new(
        page: &ProviderConfig,
        cfg: Arc<MonitorConfig>,
        fetcher: Arc<ConditionalFetcher>,
        differ: UpdateDiffer,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider: page.name.clone(),
            url: page.incidents_url(),
            cfg,
            fetcher,
            differ,
            notifier,
        }
    }

    /// Run the poll loop until `cancel` fires.
    ///
    /// Cancellation is cooperative and observed at every suspension point:
    /// the in-flight cycle (fetch and sink calls included) and the sleeps
    /// are all raced against the token.
    pub async fn run(mut self, cancel: CancellationToken) {
        let mut retry_count: u32 = 0;
        tracing::info!(provider = %self.provider, url = %self.url, "started watching");

        loop {
            let delay = tokio::select! {
                _ = cancel.cancelled() => break,
                delay = self.cycle(&mut retry_count) => delay,
            };
            tokio::select! {
                _ = cancel.cancelled() => break,
                _ = tokio::time::sleep(delay) => {}
            }
        }

        tracing::info!(provider = %self.provider, "watcher cancelled");
    }

    /// One poll cycle. Returns how long to sleep before the next one:
    /// the poll interval normally, the backoff delay after a transient
    /// network failure.
    async fn cycle(&mut self, retry_count: &mut u32) -> Duration {
        counter!("statuswatch_polls_total").increment(1);

        match self.fetcher.fetch(&self.url).await {
            Ok(FetchOutcome::Unchanged) => {
                tracing::debug!(provider = %self.provider, "304 Not Modified, no new updates");
                *retry_count = 0;
                self.cfg.poll_interval()
            }
            Ok(FetchOutcome::Changed(payload)) => {
                let updates = parse_incidents(&self.provider, &payload);
                let novel = self.differ.diff(updates);

                if novel.is_empty() {
                    tracing::debug!(provider = %self.provider, "data changed but all updates already seen");
                } else {
                    tracing::info!(
                        provider = %self.provider,
                        count = novel.len(),
                        "new update(s) detected"
                    );
                }

                for update in &novel {
                    // Sink calls are awaited one at a time so a later
                    // transition is never observed before an earlier one.
                    if let Err(e) = self.notifier.handle(update).await {
                        tracing::error!(
                            provider = %self.provider,
                            update_id = %update.update_id,
                            error = ?e,
                            "unexpected error delivering update; skipping rest of cycle"
                        );
                        return self.cfg.poll_interval();
                    }
                    counter!("statuswatch_updates_emitted_total").increment(1);
                }

                *retry_count = 0;
                self.cfg.poll_interval()
            }
            Err(e) => {
                // Cap before the formula.
                *retry_count = (*retry_count + 1).min(self.cfg.max_retries);
                let delay = backoff_delay(
                    self.cfg.retry_base_delay_secs,
                    self.cfg.max_retry_delay_secs,
                    *retry_count,
                );
                tracing::warn!(
                    provider = %self.provider,
                    error = %e,
                    retry = *retry_count,
                    max_retries = self.cfg.max_retries,
                    delay_secs = delay.as_secs(),
                    "transient error; backing off"
                );
                delay
            }
        }
    }
}
