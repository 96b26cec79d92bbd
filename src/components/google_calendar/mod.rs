mod fetcher;
pub mod models;
mod provider;
pub mod token;

pub use fetcher::{CalendarFetcher, LOOKAHEAD_DAYS};
pub use models::{Event, EventStart, RawCalendarEvent, RawEventTime};
pub use provider::{CalendarProvider, GoogleCalendarProvider, ListEventsQuery};
pub use token::{OAuthToken, TokenManager};
