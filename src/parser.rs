// src/parser.rs
// Parses a Statuspage-style /incidents.json payload into IncidentUpdate
// values: one per update entry, not one per incident.
//
// Update entries are sorted by updated_at before processing; the API does
// not contractually guarantee their order inside the payload.

use chrono::{DateTime, Utc};
use serde_json::Value;

use crate::model::{parse_dt, IncidentUpdate};

/// Sort key that tolerates missing timestamps: entries without a parseable
/// `updated_at` sort first.
fn sort_key(updated_at: Option<DateTime<Utc>>) -> DateTime<Utc> {
    updated_at.unwrap_or(DateTime::<Utc>::MIN_UTC)
}

fn str_or<'a>(v: &'a Value, key: &str, default: &'a str) -> &'a str {
    v.get(key).and_then(Value::as_str).unwrap_or(default)
}

/// Parse one provider payload into a flat, chronologically sorted list of
/// updates across all incidents in the response.
///
/// Total: malformed or missing fields degrade to defaults instead of
/// failing the whole parse.
pub fn parse_incidents(provider: &str, payload: &Value) -> Vec<IncidentUpdate> {
    let mut result: Vec<IncidentUpdate> = Vec::new();

    let incidents = payload
        .get("incidents")
        .and_then(Value::as_array)
        .map(Vec::as_slice)
        .unwrap_or_default();

    for incident in incidents {
        let entries = incident
            .get("incident_updates")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();
        if entries.is_empty() {
            continue;
        }

        let incident_id = str_or(incident, "id", "");
        let incident_name = str_or(incident, "name", "Unknown Incident");
        let impact = str_or(incident, "impact", "unknown");
        let shortlink = str_or(incident, "shortlink", "");
        let incident_status = str_or(incident, "status", "unknown");

        let components = incident
            .get("components")
            .and_then(Value::as_array)
            .map(Vec::as_slice)
            .unwrap_or_default();

        // Components that are actively degraded. An absent status must not
        // match the "not operational" condition, hence the "" default.
        let mut affected: Vec<String> = components
            .iter()
            .filter(|c| !matches!(str_or(c, "status", ""), "operational" | ""))
            .map(|c| str_or(c, "name", "Unknown").to_string())
            .collect();
        if affected.is_empty() {
            // Fall back to all listed components if none are flagged.
            affected = components
                .iter()
                .map(|c| str_or(c, "name", "Unknown").to_string())
                .collect();
        }

        // Sort entries chronologically; do not trust payload order.
        let mut sorted: Vec<&Value> = entries.iter().collect();
        sorted.sort_by_key(|e| sort_key(parse_dt(e.get("updated_at").and_then(Value::as_str))));

        for entry in sorted {
            result.push(IncidentUpdate {
                provider: provider.to_string(),
                incident_id: incident_id.to_string(),
                update_id: str_or(entry, "id", "").to_string(),
                incident_name: incident_name.to_string(),
                status: str_or(entry, "status", incident_status).to_string(),
                impact: impact.to_string(),
                affected_components: affected.clone(),
                message: str_or(entry, "body", "No message provided.").to_string(),
                updated_at: parse_dt(entry.get("updated_at").and_then(Value::as_str)),
                shortlink: shortlink.to_string(),
            });
        }
    }

    // Final sort across all incidents so events fire in chronological order.
    result.sort_by_key(|u| sort_key(u.updated_at));
    result
}
