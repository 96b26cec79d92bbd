use chrono::{DateTime, Days, FixedOffset, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Start of the given calendar day in `tz`
///
/// In zones where a DST change skips midnight, the wall-clock midnight is
/// read as UTC instead.
pub fn local_midnight(date: NaiveDate, tz: Tz) -> DateTime<Tz> {
    let midnight = date.and_time(chrono::NaiveTime::MIN);
    tz.from_local_datetime(&midnight)
        .earliest()
        .unwrap_or_else(|| tz.from_utc_datetime(&midnight))
}

/// Half-open window `[today 00:00, today + days 00:00)` in the zone of `now`
pub fn lookahead_window(now: &DateTime<Tz>, days: u64) -> (DateTime<Tz>, DateTime<Tz>) {
    let tz = now.timezone();
    let today = now.date_naive();
    let last = today.checked_add_days(Days::new(days)).unwrap_or(today);
    (local_midnight(today, tz), local_midnight(last, tz))
}

/// Parse an all-day date in `YYYY-MM-DD` format
pub fn parse_event_date(date_str: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(date_str, "%Y-%m-%d").ok()
}

/// Parse an RFC3339 timestamp, keeping its offset
pub fn parse_event_date_time(date_time_str: &str) -> Option<DateTime<FixedOffset>> {
    DateTime::parse_from_rfc3339(date_time_str).ok()
}
