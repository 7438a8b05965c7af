// src/notify/slack.rs
use anyhow::{Context, Result};
use reqwest::Client;

use super::Notifier;
use crate::model::{format_dt, IncidentUpdate};

pub struct SlackNotifier {
    webhook_url: Option<String>,
    client: Client,
}

impl SlackNotifier {
    pub fn from_env() -> Self {
        Self {
            webhook_url: std::env::var("SLACK_WEBHOOK_URL").ok(),
            client: Client::new(),
        }
    }

    /// Optional builder for tests/tools
    pub fn new(url: String) -> Self {
        Self {
            webhook_url: Some(url),
            client: Client::new(),
        }
    }

    fn text(u: &IncidentUpdate) -> String {
        let affected = if u.affected_components.is_empty() {
            "N/A".to_string()
        } else {
            u.affected_components.join(", ")
        };
        format!(
            "*{}* — *{}* ({})\n{}\nAffected: {}\n{} {}",
            u.provider,
            u.status.to_uppercase(),
            u.impact,
            u.incident_name,
            affected,
            format_dt(u.updated_at),
            u.shortlink,
        )
    }
}

#[async_trait::async_trait]
impl Notifier for SlackNotifier {
    async fn handle(&self, update: &IncidentUpdate) -> Result<()> {
        let Some(url) = &self.webhook_url else {
            tracing::debug!("Slack disabled (no SLACK_WEBHOOK_URL)");
            return Ok(());
        };

        let body = serde_json::json!({ "text": Self::text(update) });

        self.client
            .post(url)
            .json(&body)
            .send()
            .await
            .context("slack post")?
            .error_for_status()
            .context("slack non-2xx")?;
        Ok(())
    }
}
