use crate::components::google_calendar::Event;
use chrono_tz::Tz;

/// Combine per-source lists into one list ordered by effective start instant
///
/// Events sharing an instant keep their input order, which follows source
/// order. Nothing is deduplicated.
pub fn merge_events(per_source: Vec<Vec<Event>>, tz: Tz) -> Vec<Event> {
    let mut merged: Vec<Event> = per_source.into_iter().flatten().collect();
    // sort_by_key is stable
    merged.sort_by_key(|event| event.start.effective_instant(tz));
    merged
}
