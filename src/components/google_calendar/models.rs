use crate::error::{google_calendar_error, DigestResult};
use crate::utils::time::{local_midnight, parse_event_date, parse_event_date_time};
use chrono::{DateTime, FixedOffset, NaiveDate, Utc};
use chrono_tz::Tz;
use serde::Deserialize;

/// Title shown for events without a summary
pub const UNTITLED_EVENT: &str = "(no title)";

/// Event record as returned by the Calendar API
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawCalendarEvent {
    #[serde(default)]
    pub id: String,
    pub status: Option<String>,
    pub summary: Option<String>,
    pub description: Option<String>,
    #[serde(default)]
    pub start: RawEventTime,
}

impl RawCalendarEvent {
    pub fn is_cancelled(&self) -> bool {
        self.status.as_deref() == Some("cancelled")
    }
}

/// Start or end of a raw event; Google sets exactly one of the two fields
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct RawEventTime {
    pub date: Option<String>,
    pub date_time: Option<String>,
}

/// One page of an events list response
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventsPage {
    #[serde(default)]
    pub items: Vec<RawCalendarEvent>,
    pub next_page_token: Option<String>,
}

/// When an event starts
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EventStart {
    /// All-day event
    Date(NaiveDate),
    /// Timed event with the offset it was reported in
    DateTime(DateTime<FixedOffset>),
}

impl EventStart {
    /// Instant used to order events; all-day events start at local midnight in `tz`
    pub fn effective_instant(&self, tz: Tz) -> DateTime<Utc> {
        match self {
            EventStart::Date(date) => local_midnight(*date, tz).with_timezone(&Utc),
            EventStart::DateTime(dt) => dt.with_timezone(&Utc),
        }
    }
}

/// A single calendar occurrence ready for merging and rendering
#[derive(Debug, Clone, PartialEq)]
pub struct Event {
    pub title: String,
    pub description: Option<String>,
    pub start: EventStart,
    /// Calendar the event was fetched from
    pub source_id: String,
}

impl Event {
    /// Convert an API record, failing when its start is missing or malformed
    pub fn from_raw(raw: RawCalendarEvent, source_id: &str) -> DigestResult<Self> {
        let start = match (&raw.start.date_time, &raw.start.date) {
            (Some(date_time), _) => parse_event_date_time(date_time)
                .map(EventStart::DateTime)
                .ok_or_else(|| {
                    google_calendar_error(&format!(
                        "Event '{}' has an invalid start time '{}'",
                        raw.id, date_time
                    ))
                })?,
            (None, Some(date)) => parse_event_date(date)
                .map(EventStart::Date)
                .ok_or_else(|| {
                    google_calendar_error(&format!(
                        "Event '{}' has an invalid start date '{}'",
                        raw.id, date
                    ))
                })?,
            (None, None) => {
                return Err(google_calendar_error(&format!(
                    "Event '{}' has no start",
                    raw.id
                )))
            }
        };

        let title = raw
            .summary
            .filter(|s| !s.trim().is_empty())
            .unwrap_or_else(|| UNTITLED_EVENT.to_string());
        let description = raw.description.filter(|d| !d.trim().is_empty());

        Ok(Event {
            title,
            description,
            start,
            source_id: source_id.to_string(),
        })
    }
}
