// src/config.rs
use anyhow::{anyhow, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

const ENV_PATH: &str = "STATUSWATCH_CONFIG";

/// One status page to watch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ProviderConfig {
    /// Display name, e.g. "OpenAI".
    pub name: String,
    /// API base without trailing slash, e.g. "https://status.openai.com/api/v2".
    pub api_base: String,
}

impl ProviderConfig {
    /// Fully-qualified incidents endpoint for this provider.
    pub fn incidents_url(&self) -> String {
        format!("{}/incidents.json", self.api_base)
    }
}

/// Full configuration surface. Every scalar has a serde default so a
/// config file only needs to list providers.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct MonitorConfig {
    #[serde(default = "default_poll_interval")]
    pub poll_interval_secs: u64,
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,
    /// Backoff formula: base * 2^retry_count, capped at max_retry_delay_secs.
    #[serde(default = "default_retry_base_delay")]
    pub retry_base_delay_secs: u64,
    #[serde(default = "default_max_retry_delay")]
    pub max_retry_delay_secs: u64,
    #[serde(default = "default_pool_limit")]
    pub pool_limit: usize,
    #[serde(default)]
    pub providers: Vec<ProviderConfig>,
}

fn default_poll_interval() -> u64 {
    30
}
fn default_request_timeout() -> u64 {
    10
}
fn default_max_retries() -> u32 {
    5
}
fn default_retry_base_delay() -> u64 {
    2
}
fn default_max_retry_delay() -> u64 {
    300 // 5 minutes
}
fn default_pool_limit() -> usize {
    50
}

impl Default for MonitorConfig {
    fn default() -> Self {
        Self {
            poll_interval_secs: default_poll_interval(),
            request_timeout_secs: default_request_timeout(),
            max_retries: default_max_retries(),
            retry_base_delay_secs: default_retry_base_delay(),
            max_retry_delay_secs: default_max_retry_delay(),
            pool_limit: default_pool_limit(),
            providers: Vec::new(),
        }
    }
}

impl MonitorConfig {
    pub fn poll_interval(&self) -> Duration {
        Duration::from_secs(self.poll_interval_secs)
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

/// Load configuration from an explicit path. Supports TOML or JSON.
pub fn load_from(path: &Path) -> Result<MonitorConfig> {
    let content = fs::read_to_string(path)
        .with_context(|| format!("reading config from {}", path.display()))?;
    let ext = path
        .extension()
        .and_then(|s| s.to_str())
        .unwrap_or_default()
        .to_ascii_lowercase();
    parse_config(&content, ext.as_str())
}

/// Load configuration using env var + fallbacks:
/// 1) $STATUSWATCH_CONFIG
/// 2) config/statuswatch.toml
/// 3) config/statuswatch.json
///
/// Nothing found → defaults with an empty provider list.
pub fn load_default() -> Result<MonitorConfig> {
    if let Ok(p) = std::env::var(ENV_PATH) {
        let pb = PathBuf::from(p);
        if pb.exists() {
            return load_from(&pb);
        }
        return Err(anyhow!("STATUSWATCH_CONFIG points to non-existent path"));
    }
    let toml_p = PathBuf::from("config/statuswatch.toml");
    if toml_p.exists() {
        return load_from(&toml_p);
    }
    let json_p = PathBuf::from("config/statuswatch.json");
    if json_p.exists() {
        return load_from(&json_p);
    }
    Ok(MonitorConfig::default())
}

fn parse_config(s: &str, hint_ext: &str) -> Result<MonitorConfig> {
    if hint_ext == "json" {
        return serde_json::from_str(s).context("parsing JSON config");
    }
    // TOML is the primary format; fall back to JSON for unhinted content.
    match toml::from_str(s) {
        Ok(cfg) => Ok(cfg),
        Err(toml_err) => serde_json::from_str(s)
            .map_err(|_| anyhow!("unsupported config format: {toml_err}")),
    }
}
