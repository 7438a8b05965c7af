pub mod console;
pub mod slack;

use anyhow::Result;

use crate::model::IncidentUpdate;

pub use console::ConsoleNotifier;
pub use slack::SlackNotifier;

/// Output target for incident updates.
///
/// Handlers may perform I/O and may fail; the watch loop logs a failed
/// handler and moves on to the next poll cycle.
#[async_trait::async_trait]
pub trait Notifier: Send + Sync {
    async fn handle(&self, update: &IncidentUpdate) -> Result<()>;
}

/// Fans one update out to every configured notifier, in registration
/// order. The first failure is returned after all notifiers have run, so
/// one broken webhook doesn't starve the others.
pub struct NotifierMux {
    notifiers: Vec<Box<dyn Notifier>>,
}

impl NotifierMux {
    pub fn new(notifiers: Vec<Box<dyn Notifier>>) -> Self {
        Self { notifiers }
    }

    /// Console always; Slack when SLACK_WEBHOOK_URL is set.
    pub fn from_env() -> Self {
        let mut notifiers: Vec<Box<dyn Notifier>> = vec![Box::new(ConsoleNotifier::new())];
        if std::env::var("SLACK_WEBHOOK_URL").is_ok() {
            notifiers.push(Box::new(SlackNotifier::from_env()));
        }
        Self::new(notifiers)
    }
}

#[async_trait::async_trait]
impl Notifier for NotifierMux {
    async fn handle(&self, update: &IncidentUpdate) -> Result<()> {
        let mut first_err = None;
        for n in &self.notifiers {
            if let Err(e) = n.handle(update).await {
                tracing::warn!(error = ?e, "notifier failed");
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }
}
