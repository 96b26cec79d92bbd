use super::models::{EventsPage, RawCalendarEvent};
use crate::error::{config_error, google_calendar_error, DigestResult};
use async_trait::async_trait;
use chrono::{DateTime, FixedOffset};
use reqwest::Client;
use std::time::Duration;
use tracing::debug;
use url::Url;

/// Page size requested from the API
const MAX_RESULTS_PER_PAGE: u32 = 250;

/// Parameters of a single events list call
#[derive(Debug, Clone, PartialEq)]
pub struct ListEventsQuery {
    pub time_min: DateTime<FixedOffset>,
    pub time_max: DateTime<FixedOffset>,
    pub show_deleted: bool,
    /// Expand recurring events into single occurrences
    pub single_events: bool,
    /// Ask the server to order by start time; the merger re-sorts regardless
    pub order_by_start_time: bool,
}

impl ListEventsQuery {
    /// Upcoming-events query: no deleted events, recurrences expanded
    pub fn upcoming(time_min: DateTime<FixedOffset>, time_max: DateTime<FixedOffset>) -> Self {
        Self {
            time_min,
            time_max,
            show_deleted: false,
            single_events: true,
            order_by_start_time: true,
        }
    }

    fn to_params(&self, page_token: Option<&str>) -> Vec<(&'static str, String)> {
        let mut params = vec![
            ("showDeleted", self.show_deleted.to_string()),
            ("timeMin", self.time_min.to_rfc3339()),
            ("timeMax", self.time_max.to_rfc3339()),
            ("singleEvents", self.single_events.to_string()),
            ("maxResults", MAX_RESULTS_PER_PAGE.to_string()),
        ];
        // The API only allows startTime ordering on expanded results
        if self.order_by_start_time && self.single_events {
            params.push(("orderBy", "startTime".to_string()));
        }
        if let Some(token) = page_token {
            params.push(("pageToken", token.to_string()));
        }
        params
    }
}

/// Remote calendar service queried by the fetcher
#[async_trait]
pub trait CalendarProvider: Send + Sync {
    /// List every event of `calendar_id` matching `query`
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> DigestResult<Vec<RawCalendarEvent>>;
}

/// Google Calendar v3 over an authenticated HTTP client
pub struct GoogleCalendarProvider {
    client: Client,
    base_url: Url,
    access_token: String,
}

impl GoogleCalendarProvider {
    pub fn new(base_url: &str, access_token: String, timeout: Duration) -> DigestResult<Self> {
        let base_url = Url::parse(base_url)
            .map_err(|e| config_error(&format!("Invalid API base URL '{}': {}", base_url, e)))?;
        if base_url.cannot_be_a_base() {
            return Err(config_error(&format!("API base URL '{}' cannot be a base", base_url)));
        }

        let client = Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url,
            access_token,
        })
    }

    /// `{base}/calendars/{id}/events`, with the id percent-encoded as one segment
    fn events_url(&self, calendar_id: &str) -> DigestResult<Url> {
        let mut url = self.base_url.clone();
        url.path_segments_mut()
            .map_err(|_| config_error("API base URL cannot be a base"))?
            .pop_if_empty()
            .extend(&["calendars", calendar_id, "events"]);
        Ok(url)
    }

    async fn fetch_page(
        &self,
        url: &Url,
        query: &ListEventsQuery,
        page_token: Option<&str>,
    ) -> DigestResult<EventsPage> {
        let response = self
            .client
            .get(url.clone())
            .bearer_auth(&self.access_token)
            .query(&query.to_params(page_token))
            .send()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to fetch events: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(google_calendar_error(&format!(
                "Failed to fetch events: HTTP {} - {}",
                status, error_body
            )));
        }

        let body = response
            .text()
            .await
            .map_err(|e| google_calendar_error(&format!("Failed to read events response: {}", e)))?;

        serde_json::from_str(&body)
            .map_err(|e| google_calendar_error(&format!("Failed to parse events response: {}", e)))
    }
}

#[async_trait]
impl CalendarProvider for GoogleCalendarProvider {
    async fn list_events(
        &self,
        calendar_id: &str,
        query: &ListEventsQuery,
    ) -> DigestResult<Vec<RawCalendarEvent>> {
        let url = self.events_url(calendar_id)?;
        let mut events = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let page = self.fetch_page(&url, query, page_token.as_deref()).await?;
            debug!("Calendar {}: received page with {} item(s)", calendar_id, page.items.len());
            events.extend(page.items);

            match page.next_page_token {
                Some(token) if !token.is_empty() => page_token = Some(token),
                _ => break,
            }
        }

        Ok(events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn provider(base: &str) -> GoogleCalendarProvider {
        GoogleCalendarProvider::new(base, "token".to_string(), Duration::from_secs(5)).unwrap()
    }

    #[test]
    fn test_events_url_encodes_calendar_id() {
        let p = provider("https://www.googleapis.com/calendar/v3");
        let url = p.events_url("en.usa#holiday@group.v.calendar.google.com").unwrap();
        assert_eq!(
            url.as_str(),
            "https://www.googleapis.com/calendar/v3/calendars/en.usa%23holiday@group.v.calendar.google.com/events"
        );
    }

    #[test]
    fn test_events_url_with_trailing_slash() {
        let p = provider("http://127.0.0.1:8080/");
        let url = p.events_url("primary").unwrap();
        assert_eq!(url.as_str(), "http://127.0.0.1:8080/calendars/primary/events");
    }

    #[test]
    fn test_invalid_base_url_rejected() {
        assert!(GoogleCalendarProvider::new("not a url", String::new(), Duration::from_secs(5)).is_err());
        assert!(GoogleCalendarProvider::new("mailto:someone@example.com", String::new(), Duration::from_secs(5)).is_err());
    }

    #[test]
    fn test_query_params() {
        let min = DateTime::parse_from_rfc3339("2024-03-14T00:00:00+03:00").unwrap();
        let max = DateTime::parse_from_rfc3339("2024-04-13T00:00:00+03:00").unwrap();
        let params = ListEventsQuery::upcoming(min, max).to_params(Some("next"));

        let get = |key: &str| {
            params
                .iter()
                .find(|(k, _)| *k == key)
                .map(|(_, v)| v.as_str())
        };
        assert_eq!(get("showDeleted"), Some("false"));
        assert_eq!(get("singleEvents"), Some("true"));
        assert_eq!(get("orderBy"), Some("startTime"));
        assert_eq!(get("timeMin"), Some("2024-03-14T00:00:00+03:00"));
        assert_eq!(get("timeMax"), Some("2024-04-13T00:00:00+03:00"));
        assert_eq!(get("pageToken"), Some("next"));
    }
}
