//! Normalizes heterogeneous date/time strings into absolute UTC instants.
//!
//! Sources emit a mix of ISO-8601 datetimes (with and without offsets),
//! RFC-2822 dates, bare dates, and bare times of day. Values without an
//! explicit offset are wall-clock US Eastern and are converted to UTC using
//! the standard/daylight offset in effect at that date.

use chrono::{DateTime, LocalResult, NaiveDate, NaiveDateTime, NaiveTime, TimeZone, Utc};
use chrono_tz::America::New_York;
use tracing::warn;

/// Parse `date_str` into a UTC instant, or `None` if it cannot be parsed.
///
/// A bare `HH:MM:SS` time is combined with the date portion of `reference`
/// (itself normalized first) or, failing that, the current date. A bare date
/// is treated as local midnight. Never panics or errors; failures are logged
/// at warn level.
pub fn normalize_datetime(date_str: &str, reference: Option<&str>) -> Option<DateTime<Utc>> {
    let trimmed = date_str.trim();
    if trimmed.is_empty() {
        return None;
    }

    // Explicit offsets win: the instant is already absolute.
    if let Ok(dt) = DateTime::parse_from_rfc3339(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(trimmed) {
        return Some(dt.with_timezone(&Utc));
    }

    for format in ["%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M:%S"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(trimmed, format) {
            return eastern_to_utc(naive, trimmed);
        }
    }

    if let Ok(date) = NaiveDate::parse_from_str(trimmed, "%Y-%m-%d") {
        return eastern_to_utc(date.and_hms_opt(0, 0, 0)?, trimmed);
    }

    if let Ok(time) = NaiveTime::parse_from_str(trimmed, "%H:%M:%S") {
        let date = reference
            .and_then(|r| normalize_datetime(r, None))
            .map(|dt| dt.date_naive())
            .unwrap_or_else(|| Utc::now().date_naive());
        return eastern_to_utc(NaiveDateTime::new(date, time), trimmed);
    }

    warn!(input = trimmed, "unable to parse date string");
    None
}

/// Interpret a naive datetime as US Eastern wall-clock time.
fn eastern_to_utc(naive: NaiveDateTime, original: &str) -> Option<DateTime<Utc>> {
    match New_York.from_local_datetime(&naive) {
        LocalResult::Single(dt) => Some(dt.with_timezone(&Utc)),
        // Fall-back transition repeats an hour; take the earlier offset.
        LocalResult::Ambiguous(earliest, _) => Some(earliest.with_timezone(&Utc)),
        LocalResult::None => {
            warn!(
                input = original,
                "wall-clock time skipped by daylight-saving transition"
            );
            None
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_explicit_offset_is_exact() {
        let parsed = normalize_datetime("2024-11-10T18:00:00-05:00", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 23, 0, 0).unwrap());

        let parsed = normalize_datetime("2024-11-10T18:00:00Z", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_rfc2822_date() {
        let parsed = normalize_datetime("Sun, 10 Nov 2024 18:00:00 GMT", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 18, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_datetime_is_eastern_standard_time() {
        // November is EST (UTC-5).
        let parsed = normalize_datetime("2024-11-10T18:00:00", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 23, 0, 0).unwrap());
    }

    #[test]
    fn test_naive_datetime_is_eastern_daylight_time_in_summer() {
        // July is EDT (UTC-4), not a fixed five-hour shift.
        let parsed = normalize_datetime("2024-07-10T18:00:00", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 7, 10, 22, 0, 0).unwrap());
    }

    #[test]
    fn test_date_only_is_local_midnight() {
        let parsed = normalize_datetime("2024-11-10", None).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 5, 0, 0).unwrap());
    }

    #[test]
    fn test_bare_time_uses_reference_date() {
        let parsed = normalize_datetime("18:00:00", Some("2024-11-10")).unwrap();
        assert_eq!(parsed, Utc.with_ymd_and_hms(2024, 11, 10, 23, 0, 0).unwrap());
        // Same instant as the full naive datetime form.
        assert_eq!(
            parsed,
            normalize_datetime("2024-11-10T18:00:00", None).unwrap()
        );
    }

    #[test]
    fn test_bare_time_without_reference_falls_back_to_today() {
        let parsed = normalize_datetime("18:00:00", None);
        assert!(parsed.is_some());
    }

    #[test]
    fn test_empty_and_garbage_return_none() {
        assert!(normalize_datetime("", None).is_none());
        assert!(normalize_datetime("   ", None).is_none());
        assert!(normalize_datetime("next Tuesday-ish", None).is_none());
    }

    #[test]
    fn test_spring_forward_gap_returns_none() {
        // 2:30 AM on 2024-03-10 does not exist in US Eastern.
        assert!(normalize_datetime("2024-03-10T02:30:00", None).is_none());
    }
}
