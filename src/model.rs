// src/model.rs
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One update entry within an incident, not the incident itself.
///
/// One value per `update_id`, not per incident. If an incident moves
/// through several statuses between polls, each transition gets its own
/// event; no lifecycle step is ever collapsed away.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct IncidentUpdate {
    pub provider: String,
    pub incident_id: String,
    /// Unique id of this specific update entry; the unit of deduplication.
    pub update_id: String,
    pub incident_name: String,
    /// investigating | identified | monitoring | resolved (provider-defined)
    pub status: String,
    /// none | minor | major | critical
    pub impact: String,
    pub affected_components: Vec<String>,
    /// Body of this specific update entry.
    pub message: String,
    /// Stored as a datetime, never a raw string, so comparison is
    /// chronological rather than lexicographic.
    pub updated_at: Option<DateTime<Utc>>,
    pub shortlink: String,
}

/// Parse an ISO 8601 timestamp string into a UTC datetime.
///
/// Statuspage returns strings like `2024-11-03T14:32:00.000Z`. Unparseable
/// or absent values become `None` and sort earliest downstream.
pub fn parse_dt(value: Option<&str>) -> Option<DateTime<Utc>> {
    let raw = value?;
    if raw.is_empty() {
        return None;
    }
    match DateTime::parse_from_rfc3339(raw) {
        Ok(dt) => Some(dt.with_timezone(&Utc)),
        Err(e) => {
            tracing::warn!(value = raw, error = %e, "could not parse datetime string");
            None
        }
    }
}

/// Human-readable UTC timestamp for console display.
pub fn format_dt(dt: Option<DateTime<Utc>>) -> String {
    match dt {
        Some(dt) => dt.format("%Y-%m-%d %H:%M:%S UTC").to_string(),
        None => "Unknown".to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_statuspage_timestamps_with_z_and_millis() {
        let dt = parse_dt(Some("2024-11-03T14:32:00.000Z")).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 11, 3, 14, 32, 0).unwrap());
    }

    #[test]
    fn offset_timestamps_are_normalized_to_utc() {
        let dt = parse_dt(Some("2024-11-03T15:32:00+01:00")).unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 11, 3, 14, 32, 0).unwrap());
    }

    #[test]
    fn garbage_and_missing_values_become_none() {
        assert_eq!(parse_dt(Some("not-a-date")), None);
        assert_eq!(parse_dt(Some("")), None);
        assert_eq!(parse_dt(None), None);
    }

    #[test]
    fn format_dt_handles_missing() {
        assert_eq!(format_dt(None), "Unknown");
        let dt = Utc.with_ymd_and_hms(2024, 11, 3, 14, 32, 0).unwrap();
        assert_eq!(format_dt(Some(dt)), "2024-11-03 14:32:00 UTC");
    }
}
