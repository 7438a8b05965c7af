// src/notify/console.rs
// Console output: one structured, pipe-delimited line per incident update.
//
// Format:
//   [2026-02-21T12:39:08Z] OpenAI | IDENTIFIED | Impact=MINOR | Product=API errors | Affected=Chat Completions | Message=We are investigating...
//
// Single line per event so it stays grep/cut-able in a terminal or log
// aggregator; ANSI colour only on the status and impact values so parsers
// are not broken. Prints to stdout, which plays well with docker logs,
// journalctl, and any log collector.

use anyhow::Result;
use chrono::Utc;

use super::Notifier;
use crate::model::IncidentUpdate;

const RESET: &str = "\x1b[0m";

fn status_color(status: &str) -> &'static str {
    match status.to_ascii_lowercase().as_str() {
        "investigating" => "\x1b[33m", // yellow: something is wrong, unknown cause
        "identified" => "\x1b[31m",    // red: root cause confirmed
        "monitoring" => "\x1b[34m",    // blue: fix deployed, watching
        "resolved" => "\x1b[32m",      // green: all clear
        _ => "",
    }
}

fn impact_color(impact: &str) -> &'static str {
    match impact.to_ascii_lowercase().as_str() {
        "critical" => "\x1b[91m", // bright red
        "major" => "\x1b[33m",
        "minor" => "\x1b[34m",
        "none" => "\x1b[32m",
        _ => "",
    }
}

fn colorize(value: &str, color: &str) -> String {
    let upper = value.to_uppercase();
    if color.is_empty() {
        upper
    } else {
        format!("{color}{upper}{RESET}")
    }
}

#[derive(Debug, Default)]
pub struct ConsoleNotifier;

impl ConsoleNotifier {
    // Truncate long messages so lines stay scannable in a terminal.
    const MAX_MSG_LEN: usize = 120;

    pub fn new() -> Self {
        Self
    }

    fn format(&self, u: &IncidentUpdate) -> String {
        let affected = if u.affected_components.is_empty() {
            "N/A".to_string()
        } else {
            u.affected_components.join(", ")
        };
        format!(
            "[{}] {} | {} | Impact={} | Product={} | Affected={} | Message={}",
            Utc::now().format("%Y-%m-%dT%H:%M:%SZ"),
            u.provider,
            colorize(&u.status, status_color(&u.status)),
            colorize(&u.impact, impact_color(&u.impact)),
            u.incident_name,
            affected,
            self.truncate(&u.message),
        )
    }

    fn truncate(&self, text: &str) -> String {
        let collapsed = text.split_whitespace().collect::<Vec<_>>().join(" ");
        if collapsed.chars().count() <= Self::MAX_MSG_LEN {
            return collapsed;
        }
        let cut: String = collapsed.chars().take(Self::MAX_MSG_LEN - 1).collect();
        format!("{}…", cut.trim_end())
    }
}

#[async_trait::async_trait]
impl Notifier for ConsoleNotifier {
    async fn handle(&self, update: &IncidentUpdate) -> Result<()> {
        println!("{}", self.format(update));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn update() -> IncidentUpdate {
        IncidentUpdate {
            provider: "OpenAI".into(),
            incident_id: "inc1".into(),
            update_id: "u1".into(),
            incident_name: "API errors".into(),
            status: "identified".into(),
            impact: "minor".into(),
            affected_components: vec!["Chat Completions".into()],
            message: "  We   are investigating.  ".into(),
            updated_at: None,
            shortlink: String::new(),
        }
    }

    #[test]
    fn line_contains_all_fields_and_collapses_whitespace() {
        let line = ConsoleNotifier::new().format(&update());
        assert!(line.contains("OpenAI"));
        assert!(line.contains("IDENTIFIED"));
        assert!(line.contains("Impact="));
        assert!(line.contains("Product=API errors"));
        assert!(line.contains("Affected=Chat Completions"));
        assert!(line.contains("Message=We are investigating."));
    }

    #[test]
    fn empty_component_list_prints_na() {
        let mut u = update();
        u.affected_components.clear();
        let line = ConsoleNotifier::new().format(&u);
        assert!(line.contains("Affected=N/A"));
    }

    #[test]
    fn long_messages_are_truncated_with_ellipsis() {
        let mut u = update();
        u.message = "x".repeat(500);
        let line = ConsoleNotifier::new().format(&u);
        assert!(line.ends_with('…'));
        let msg = line.split("Message=").nth(1).unwrap();
        assert!(msg.chars().count() <= ConsoleNotifier::MAX_MSG_LEN);
    }
}
