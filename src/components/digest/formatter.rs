use crate::components::google_calendar::EventStart;
use chrono::{DateTime, NaiveDate, TimeZone};
use chrono_tz::Tz;

/// Calendar-day relation of a date to today
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RelativeDay {
    Today,
    Tomorrow,
    Other,
}

impl RelativeDay {
    /// Compare whole calendar dates, so month and year boundaries behave
    pub fn of(date: NaiveDate, today: NaiveDate) -> Self {
        if date == today {
            RelativeDay::Today
        } else if today.succ_opt() == Some(date) {
            RelativeDay::Tomorrow
        } else {
            RelativeDay::Other
        }
    }
}

/// Label for a timed start, e.g. `Today, 18:30:00` or `Wed, 20 Mar 14:00:00`
pub fn format_instant<T: TimeZone>(instant: &DateTime<T>, now: &DateTime<Tz>) -> String {
    let local = instant.with_timezone(&now.timezone());
    let pattern = match RelativeDay::of(local.date_naive(), now.date_naive()) {
        RelativeDay::Today => "Today, %H:%M:%S",
        RelativeDay::Tomorrow => "Tomorrow, %H:%M:%S",
        RelativeDay::Other => "%a, %d %b %H:%M:%S",
    };
    local.format(pattern).to_string()
}

/// Label for an all-day start, e.g. `Tomorrow` or `Sat, 16 Mar`
pub fn format_date(date: NaiveDate, now: &DateTime<Tz>) -> String {
    match RelativeDay::of(date, now.date_naive()) {
        RelativeDay::Today => "Today".to_string(),
        RelativeDay::Tomorrow => "Tomorrow".to_string(),
        RelativeDay::Other => date.format("%a, %d %b").to_string(),
    }
}

pub fn format_start(start: &EventStart, now: &DateTime<Tz>) -> String {
    match start {
        EventStart::Date(date) => format_date(*date, now),
        EventStart::DateTime(dt) => format_instant(dt, now),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono_tz::Europe::Moscow;

    fn moscow(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Tz> {
        Moscow.with_ymd_and_hms(y, m, d, h, min, 0).unwrap()
    }

    #[test]
    fn test_format_instant_relative_labels() {
        let now = moscow(2024, 3, 14, 10, 0);

        assert_eq!(format_instant(&moscow(2024, 3, 14, 18, 30), &now), "Today, 18:30:00");
        assert_eq!(format_instant(&moscow(2024, 3, 15, 9, 0), &now), "Tomorrow, 09:00:00");
        assert_eq!(
            format_instant(&moscow(2024, 3, 20, 14, 0), &now),
            "Wed, 20 Mar 14:00:00"
        );
    }

    #[test]
    fn test_format_instant_converts_to_display_zone() {
        let now = moscow(2024, 3, 14, 10, 0);
        // 22:30 UTC is 01:30 the next day in Moscow
        let instant = DateTime::parse_from_rfc3339("2024-03-14T22:30:00Z").unwrap();
        assert_eq!(format_instant(&instant, &now), "Tomorrow, 01:30:00");
    }

    #[test]
    fn test_month_boundaries() {
        let now = moscow(2024, 1, 31, 23, 0);

        assert_eq!(format_instant(&moscow(2024, 2, 1, 0, 15), &now), "Tomorrow, 00:15:00");
        // Same day-of-month, different month
        assert_eq!(
            format_instant(&moscow(2024, 3, 31, 8, 0), &now),
            "Sun, 31 Mar 08:00:00"
        );
        assert_eq!(
            format_instant(&moscow(2024, 3, 1, 8, 0), &now),
            "Fri, 01 Mar 08:00:00"
        );

        let new_year = moscow(2024, 12, 31, 12, 0);
        assert_eq!(format_instant(&moscow(2025, 1, 1, 9, 0), &new_year), "Tomorrow, 09:00:00");
    }

    #[test]
    fn test_format_date() {
        let now = moscow(2024, 3, 14, 10, 0);

        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 14).unwrap(), &now), "Today");
        assert_eq!(format_date(NaiveDate::from_ymd_opt(2024, 3, 15).unwrap(), &now), "Tomorrow");
        assert_eq!(
            format_date(NaiveDate::from_ymd_opt(2024, 3, 16).unwrap(), &now),
            "Sat, 16 Mar"
        );
    }

    #[test]
    fn test_relative_day() {
        let today = NaiveDate::from_ymd_opt(2024, 2, 28).unwrap();
        assert_eq!(RelativeDay::of(today, today), RelativeDay::Today);
        // Leap day
        assert_eq!(
            RelativeDay::of(NaiveDate::from_ymd_opt(2024, 2, 29).unwrap(), today),
            RelativeDay::Tomorrow
        );
        assert_eq!(
            RelativeDay::of(NaiveDate::from_ymd_opt(2024, 3, 1).unwrap(), today),
            RelativeDay::Other
        );
        assert_eq!(
            RelativeDay::of(NaiveDate::from_ymd_opt(2024, 2, 27).unwrap(), today),
            RelativeDay::Other
        );
    }
}
