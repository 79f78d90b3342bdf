//! Calendar-day boundary math for step records.
//!
//! "Today" is the current instant shifted into the configured offset and
//! truncated to midnight. Every record for a given wall-clock day keys to
//! that one midnight instant, which is what makes repeated daily writes
//! land on the same row.

use time::{Duration, OffsetDateTime, Time, UtcOffset};

/// Length of the weekly query window.
pub const WEEKLY_WINDOW: Duration = Duration::days(7);

/// Midnight boundary of the calendar day containing `now`, in the given
/// whole-hour UTC offset.
pub fn day_start(now: OffsetDateTime, utc_offset_hours: i8) -> OffsetDateTime {
    // Config validation keeps the offset in range; fall back to UTC rather
    // than panic if a bad value slips through.
    let offset = UtcOffset::from_hms(utc_offset_hours, 0, 0).unwrap_or(UtcOffset::UTC);
    now.to_offset(offset).replace_time(Time::MIDNIGHT)
}

/// The trailing-week window: `(now - 7 days, now)`.
///
/// Wall-clock subtraction, not calendar alignment: a record for the day
/// exactly seven days ago is included only if its midnight boundary falls
/// at or after the start instant.
pub fn weekly_window(now: OffsetDateTime) -> (OffsetDateTime, OffsetDateTime) {
    (now - WEEKLY_WINDOW, now)
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_day_start_truncates_time_of_day() {
        let now = datetime!(2026-08-20 14:37:22 UTC);
        let start = day_start(now, 0);

        assert_eq!(start, datetime!(2026-08-20 00:00:00 UTC));
        assert_eq!(start.time(), Time::MIDNIGHT);
    }

    #[test]
    fn test_day_start_is_stable_within_a_day() {
        let morning = datetime!(2026-08-20 00:00:01 UTC);
        let night = datetime!(2026-08-20 23:59:59 UTC);

        assert_eq!(day_start(morning, 0), day_start(night, 0));
    }

    #[test]
    fn test_day_start_respects_offset() {
        // 01:30 UTC is still "yesterday" at UTC-5
        let now = datetime!(2026-08-20 01:30:00 UTC);
        let start = day_start(now, -5);

        assert_eq!(start, datetime!(2026-08-19 00:00:00 -5));
        assert_eq!(start.time(), Time::MIDNIGHT);

        // ...and already "tomorrow" at UTC+14
        let start = day_start(now, 14);
        assert_eq!(start, datetime!(2026-08-20 00:00:00 +14));
    }

    #[test]
    fn test_day_start_precedes_now() {
        let now = datetime!(2026-08-20 12:00:00 UTC);
        for offset in [-12i8, -5, 0, 3, 14] {
            assert!(day_start(now, offset) <= now, "offset {}", offset);
        }
    }

    #[test]
    fn test_weekly_window_is_seven_days_wide() {
        let now = datetime!(2026-08-20 14:37:22 UTC);
        let (since, until) = weekly_window(now);

        assert_eq!(until, now);
        assert_eq!(until - since, Duration::days(7));
    }

    #[test]
    fn test_weekly_window_contains_today() {
        let now = datetime!(2026-08-20 14:37:22 UTC);
        let (since, until) = weekly_window(now);
        let today = day_start(now, 0);

        assert!(today >= since && today <= until);
    }
}
