pub mod formatter;
pub mod merger;

pub use formatter::{format_date, format_instant, format_start, RelativeDay};
pub use merger::merge_events;

use crate::components::google_calendar::Event;
use chrono::DateTime;
use chrono_tz::Tz;
use std::fmt::Write;

/// Indentation of description lines under their event
const DESCRIPTION_INDENT: &str = "        ";

/// Render merged events into the digest text
///
/// Each event becomes `[<label>] <title>`, an indented description line when
/// one exists, and a blank separator line.
pub fn render_digest(events: &[Event], now: &DateTime<Tz>) -> String {
    let mut digest = String::new();
    for event in events {
        // Writing to a String cannot fail
        let _ = writeln!(digest, "[{}] {}", format_start(&event.start, now), event.title);
        if let Some(description) = &event.description {
            let _ = writeln!(digest, "{}{}", DESCRIPTION_INDENT, description);
        }
        digest.push('\n');
    }
    digest
}
