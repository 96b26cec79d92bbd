use super::models::Event;
use super::provider::{CalendarProvider, ListEventsQuery};
use crate::utils::time::lookahead_window;
use chrono::DateTime;
use chrono_tz::Tz;
use tracing::{debug, error, info, warn};

/// Days of upcoming events to fetch, counted from today's midnight
pub const LOOKAHEAD_DAYS: u64 = 30;

/// Queries every configured calendar for upcoming events
pub struct CalendarFetcher<'a> {
    provider: &'a dyn CalendarProvider,
}

impl<'a> CalendarFetcher<'a> {
    pub fn new(provider: &'a dyn CalendarProvider) -> Self {
        Self { provider }
    }

    /// Fetch events per source, in source order
    ///
    /// Sources are queried one at a time. The first failing source ends the
    /// run's fetching: its events and those of every later source are absent,
    /// while sources fetched before it are kept.
    pub async fn fetch(&self, calendar_ids: &[String], now: &DateTime<Tz>) -> Vec<Vec<Event>> {
        let (time_min, time_max) = lookahead_window(now, LOOKAHEAD_DAYS);
        let query = ListEventsQuery::upcoming(time_min.fixed_offset(), time_max.fixed_offset());

        let mut per_source = Vec::with_capacity(calendar_ids.len());
        for calendar_id in calendar_ids {
            let raw_events = match self.provider.list_events(calendar_id, &query).await {
                Ok(raw_events) => raw_events,
                Err(e) => {
                    error!("Failed to fetch calendar {}: {}", calendar_id, e);
                    let skipped = calendar_ids.len() - per_source.len() - 1;
                    if skipped > 0 {
                        warn!("Skipping {} remaining calendar(s) for this run", skipped);
                    }
                    break;
                }
            };

            let mut events = Vec::with_capacity(raw_events.len());
            for raw in raw_events {
                if raw.is_cancelled() {
                    debug!("Skipping cancelled event {}", raw.id);
                    continue;
                }
                match Event::from_raw(raw, calendar_id) {
                    Ok(event) => events.push(event),
                    Err(e) => warn!("Dropping event from {}: {}", calendar_id, e),
                }
            }

            info!("Fetched {} event(s) from {}", events.len(), calendar_id);
            per_source.push(events);
        }

        per_source
    }
}
