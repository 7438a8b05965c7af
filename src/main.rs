//! statuswatch binary entrypoint.
//! Loads configuration, boots the monitor, and wires shutdown signals to
//! cooperative cancellation.

use std::sync::Arc;

use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use statuswatch::config;
use statuswatch::Monitor;

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("statuswatch=info,warn"));

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().compact())
        .init();
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env in local/dev; no-op in prod environments.
    let _ = dotenvy::dotenv();

    init_tracing();

    let cfg = config::load_default()?;
    if cfg.providers.is_empty() {
        tracing::warn!(
            "no providers configured; set STATUSWATCH_CONFIG or create config/statuswatch.toml"
        );
    }

    let monitor = Arc::new(Monitor::new(cfg));

    // SIGINT/SIGTERM request cooperative shutdown; the monitor returns
    // once every watcher has observed the cancellation and unwound.
    {
        let monitor = Arc::clone(&monitor);
        tokio::spawn(async move {
            shutdown_signal().await;
            tracing::info!("shutdown signal received, stopping watchers");
            monitor.stop();
        });
    }

    monitor.run().await?;
    tracing::info!("monitor stopped");
    Ok(())
}

#[cfg(unix)]
async fn shutdown_signal() {
    use tokio::signal::unix::{signal, SignalKind};

    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(s) => s,
        Err(e) => {
            tracing::error!(error = %e, "failed to install SIGTERM handler");
            let _ = tokio::signal::ctrl_c().await;
            return;
        }
    };

    tokio::select! {
        _ = tokio::signal::ctrl_c() => {}
        _ = sigterm.recv() => {}
    }
}

#[cfg(not(unix))]
async fn shutdown_signal() {
    let _ = tokio::signal::ctrl_c().await;
}
