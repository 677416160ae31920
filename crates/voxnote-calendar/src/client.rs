//! Calendar API client.
//!
//! Every call takes the bearer token as an argument: tokens are session
//! state owned elsewhere, and callers may refresh between calls. No retry
//! logic lives here.

use chrono::{DateTime, Utc};
use tracing::instrument;

use crate::error::CalendarError;
use crate::types::{EventListResponse, EventPayload, EventResource};

const CALENDAR_API_BASE: &str = "https://www.googleapis.com/calendar/v3";
const PAGE_SIZE: u32 = 50;

pub struct CalendarClient {
    http: reqwest::Client,
    base_url: String,
    calendar_id: String,
}

impl CalendarClient {
    pub fn new(calendar_id: &str) -> Self {
        Self::with_base_url(calendar_id, CALENDAR_API_BASE)
    }

    /// Client against a non-default API base (self-hosted gateway, tests)
    pub fn with_base_url(calendar_id: &str, base_url: &str) -> Self {
        Self {
            http: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
            calendar_id: calendar_id.to_string(),
        }
    }

    fn events_url(&self) -> String {
        format!(
            "{}/calendars/{}/events",
            self.base_url,
            urlencoding::encode(&self.calendar_id),
        )
    }

    /// List events within a time range, following pagination to the end.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn list_events(
        &self,
        access_token: &str,
        time_min: DateTime<Utc>,
        time_max: DateTime<Utc>,
    ) -> Result<Vec<EventResource>, CalendarError> {
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut url = format!(
                "{}?timeMin={}&timeMax={}&singleEvents=true&orderBy=startTime&maxResults={}",
                self.events_url(),
                urlencoding::encode(&time_min.to_rfc3339()),
                urlencoding::encode(&time_max.to_rfc3339()),
                PAGE_SIZE,
            );
            if let Some(token) = &page_token {
                url.push_str(&format!("&pageToken={}", urlencoding::encode(token)));
            }

            let response = self
                .http
                .get(&url)
                .bearer_auth(access_token)
                .send()
                .await?;

            let page: EventListResponse = Self::handle_response(response).await?;
            events.extend(page.items);

            match page.next_page_token {
                Some(token) => page_token = Some(token),
                None => break,
            }
        }

        Ok(events)
    }

    /// Create a new event; returns the id the service assigned.
    #[instrument(skip(self, access_token, payload), level = "info")]
    pub async fn create_event(
        &self,
        access_token: &str,
        payload: &EventPayload,
    ) -> Result<String, CalendarError> {
        let response = self
            .http
            .post(self.events_url())
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;

        let created: EventResource = Self::handle_response(response).await?;
        Ok(created.id)
    }

    /// Replace the synced fields of an existing event.
    #[instrument(skip(self, access_token, payload), level = "info")]
    pub async fn update_event(
        &self,
        access_token: &str,
        event_id: &str,
        payload: &EventPayload,
    ) -> Result<(), CalendarError> {
        let url = format!(
            "{}/{}",
            self.events_url(),
            urlencoding::encode(event_id),
        );

        let response = self
            .http
            .patch(&url)
            .bearer_auth(access_token)
            .json(payload)
            .send()
            .await?;

        let _updated: EventResource = Self::handle_response(response).await?;
        Ok(())
    }

    /// Delete an event.
    #[instrument(skip(self, access_token), level = "info")]
    pub async fn delete_event(
        &self,
        access_token: &str,
        event_id: &str,
    ) -> Result<(), CalendarError> {
        let url = format!(
            "{}/{}",
            self.events_url(),
            urlencoding::encode(event_id),
        );

        let response = self
            .http
            .delete(&url)
            .bearer_auth(access_token)
            .send()
            .await?;

        // Delete returns 204 No Content on success
        if response.status().is_success() {
            Ok(())
        } else {
            Err(Self::error_from(response).await)
        }
    }

    /// Helper to handle API responses and errors.
    async fn handle_response<T: serde::de::DeserializeOwned>(
        response: reqwest::Response,
    ) -> Result<T, CalendarError> {
        let status = response.status();

        if status.is_success() {
            response.json().await.map_err(|e| CalendarError::Api {
                status: status.as_u16(),
                message: format!("JSON parse error: {}", e),
            })
        } else {
            Err(Self::error_from(response).await)
        }
    }

    async fn error_from(response: reqwest::Response) -> CalendarError {
        let status = response.status();
        match status.as_u16() {
            401 => CalendarError::Unauthorized,
            403 => CalendarError::Forbidden,
            404 => {
                let text = response.text().await.unwrap_or_default();
                CalendarError::NotFound(text)
            }
            429 => {
                let retry_after = response
                    .headers()
                    .get("Retry-After")
                    .and_then(|v| v.to_str().ok())
                    .and_then(|s| s.parse().ok())
                    .unwrap_or(60);
                CalendarError::RateLimited(retry_after)
            }
            _ => {
                let text = response.text().await.unwrap_or_default();
                CalendarError::Api {
                    status: status.as_u16(),
                    message: text,
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]
    use super::*;
    use crate::types::EventDateTime;
    use wiremock::matchers::{body_partial_json, header, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn window() -> (DateTime<Utc>, DateTime<Utc>) {
        let min = DateTime::parse_from_rfc3339("2026-03-01T00:00:00Z")
            .unwrap()
            .with_timezone(&Utc);
        let max = DateTime::parse_from_rfc3339("2026-03-31T23:59:59Z")
            .unwrap()
            .with_timezone(&Utc);
        (min, max)
    }

    fn timed_payload(summary: &str) -> EventPayload {
        let (start, end) = window();
        EventPayload {
            summary: summary.to_string(),
            start: EventDateTime::timed(start),
            end: EventDateTime::timed(end),
            ..EventPayload::default()
        }
    }

    #[tokio::test]
    async fn test_list_events_single_page() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("singleEvents", "true"))
            .and(header("Authorization", "Bearer test_token"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [
                    {
                        "id": "event1",
                        "summary": "Meeting",
                        "start": {"dateTime": "2026-03-02T10:00:00Z"},
                        "end": {"dateTime": "2026-03-02T11:00:00Z"}
                    }
                ]
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let (min, max) = window();
        let events = client.list_events("test_token", min, max).await.unwrap();

        assert_eq!(events.len(), 1);
        assert_eq!(events[0].summary.as_deref(), Some("Meeting"));
    }

    #[tokio::test]
    async fn test_list_events_follows_pagination() {
        let mock_server = MockServer::start().await;

        // More specific mock first: wiremock matches in mount order
        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .and(query_param("pageToken", "page2"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "event2"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "items": [{"id": "event1"}],
                "nextPageToken": "page2"
            })))
            .expect(1)
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let (min, max) = window();
        let events = client.list_events("test_token", min, max).await.unwrap();

        assert_eq!(events.len(), 2);
        assert_eq!(events[0].id, "event1");
        assert_eq!(events[1].id, "event2");
    }

    #[tokio::test]
    async fn test_create_event_returns_assigned_id() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .and(body_partial_json(serde_json::json!({"summary": "Buy milk"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "g123",
                "summary": "Buy milk",
                "status": "confirmed"
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let id = client
            .create_event("test_token", &timed_payload("Buy milk"))
            .await
            .unwrap();

        assert_eq!(id, "g123");
    }

    #[tokio::test]
    async fn test_update_event_uses_patch() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/calendars/primary/events/g123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "g123",
                "summary": "Buy milk"
            })))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let result = client
            .update_event("test_token", "g123", &timed_payload("Buy milk"))
            .await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_unauthorized_response() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(401))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let err = client
            .create_event("expired_token", &timed_payload("x"))
            .await
            .unwrap_err();

        assert!(matches!(err, CalendarError::Unauthorized));
    }

    #[tokio::test]
    async fn test_update_missing_event_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("PATCH"))
            .and(path("/calendars/primary/events/stale"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let err = client
            .update_event("test_token", "stale", &timed_payload("x"))
            .await
            .unwrap_err();

        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_rate_limited_reads_retry_after() {
        let mock_server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/calendars/primary/events"))
            .respond_with(ResponseTemplate::new(429).append_header("Retry-After", "60"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let (min, max) = window();
        let err = client.list_events("token", min, max).await.unwrap_err();

        assert!(matches!(err, CalendarError::RateLimited(60)));
    }

    #[tokio::test]
    async fn test_delete_event() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/g123"))
            .respond_with(ResponseTemplate::new(204))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let result = client.delete_event("test_token", "g123").await;

        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_delete_missing_event_is_not_found() {
        let mock_server = MockServer::start().await;

        Mock::given(method("DELETE"))
            .and(path("/calendars/primary/events/gone"))
            .respond_with(ResponseTemplate::new(404).set_body_string("Not Found"))
            .mount(&mock_server)
            .await;

        let client = CalendarClient::with_base_url("primary", &mock_server.uri());
        let err = client.delete_event("test_token", "gone").await.unwrap_err();

        assert!(err.is_not_found());
    }
}
