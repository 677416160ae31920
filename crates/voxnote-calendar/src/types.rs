//! Wire types for the calendar API (camelCase JSON).

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

/// Start or end of an event: a timestamp for timed events, a bare date for
/// all-day events. Exactly one of the two fields is set.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventDateTime {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date_time: Option<DateTime<Utc>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub date: Option<NaiveDate>,
}

impl EventDateTime {
    /// A timed boundary
    pub fn timed(at: DateTime<Utc>) -> Self {
        Self {
            date_time: Some(at),
            date: None,
        }
    }

    /// An all-day boundary
    pub fn all_day(date: NaiveDate) -> Self {
        Self {
            date_time: None,
            date: Some(date),
        }
    }

    /// Resolve to a concrete instant plus the all-day flag.
    /// All-day dates resolve to midnight UTC.
    pub fn resolve(&self) -> Option<(DateTime<Utc>, bool)> {
        if let Some(at) = self.date_time {
            return Some((at, false));
        }
        self.date
            .map(|d| (d.and_hms_opt(0, 0, 0).unwrap_or_default().and_utc(), true))
    }
}

/// Event participant
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Attendee {
    pub email: String,
}

/// Outgoing event body for create and update calls
#[derive(Debug, Clone, Default, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct EventPayload {
    pub summary: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    pub start: EventDateTime,
    pub end: EventDateTime,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub attendees: Vec<Attendee>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub recurrence: Vec<String>,
}

/// Event resource as the API returns it
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventResource {
    pub id: String,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub summary: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub location: Option<String>,
    #[serde(default)]
    pub start: Option<EventDateTime>,
    #[serde(default)]
    pub end: Option<EventDateTime>,
    #[serde(default)]
    pub attendees: Vec<Attendee>,
    #[serde(default)]
    pub recurrence: Vec<String>,
}

impl EventResource {
    /// Cancelled entries still appear in list responses but carry no usable
    /// schedule.
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

/// One page of a list call
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventListResponse {
    #[serde(default)]
    pub items: Vec<EventResource>,
    #[serde(default)]
    pub next_page_token: Option<String>,
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;

    #[test]
    fn test_timed_payload_serializes_date_time_only() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let json = serde_json::to_value(EventDateTime::timed(at)).unwrap();
        assert!(json.get("dateTime").is_some());
        assert!(json.get("date").is_none());
    }

    #[test]
    fn test_all_day_payload_serializes_date_only() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let json = serde_json::to_value(EventDateTime::all_day(date)).unwrap();
        assert_eq!(json.get("date").unwrap(), "2026-03-01");
        assert!(json.get("dateTime").is_none());
    }

    #[test]
    fn test_resolve_prefers_timed() {
        let at = DateTime::parse_from_rfc3339("2026-03-01T10:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let (instant, all_day) = EventDateTime::timed(at).resolve().unwrap();
        assert_eq!(instant, at);
        assert!(!all_day);
    }

    #[test]
    fn test_resolve_all_day_is_midnight_utc() {
        let date = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let (instant, all_day) = EventDateTime::all_day(date).resolve().unwrap();
        assert!(all_day);
        assert_eq!(instant.to_rfc3339(), "2026-03-01T00:00:00+00:00");
    }

    #[test]
    fn test_payload_skips_empty_collections() {
        let payload = EventPayload {
            summary: "Standup".to_string(),
            ..EventPayload::default()
        };
        let json = serde_json::to_value(&payload).unwrap();
        assert!(json.get("attendees").is_none());
        assert!(json.get("recurrence").is_none());
        assert!(json.get("description").is_none());
    }

    #[test]
    fn test_resource_parses_camel_case() {
        let resource: EventResource = serde_json::from_value(serde_json::json!({
            "id": "evt1",
            "summary": "Planning",
            "start": {"dateTime": "2026-03-01T10:00:00Z"},
            "end": {"dateTime": "2026-03-01T11:00:00Z"},
            "attendees": [{"email": "a@example.com", "responseStatus": "accepted"}]
        }))
        .unwrap();

        assert_eq!(resource.id, "evt1");
        assert_eq!(resource.summary.as_deref(), Some("Planning"));
        assert_eq!(resource.attendees.len(), 1);
        assert!(!resource.is_cancelled());
    }

    #[test]
    fn test_cancelled_resource() {
        let resource: EventResource = serde_json::from_value(serde_json::json!({
            "id": "evt2",
            "status": "cancelled"
        }))
        .unwrap();
        assert!(resource.is_cancelled());
    }
}
