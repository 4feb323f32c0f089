//! Timestamp formatting helpers shared by the RSS generator and the
//! Publishing phase. Every user-visible timestamp (filenames, `pubDate`,
//! titles) is rendered in `Settings.display_timezone`, never UTC.

use chrono::{DateTime, NaiveDate, Utc};
use chrono_tz::Tz;

/// Formats a duration in seconds as `itunes:duration`'s `HH:MM:SS`.
pub fn format_itunes_duration(total_seconds: i64) -> String {
    let total_seconds = total_seconds.max(0);
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    format!("{hours:02}:{minutes:02}:{seconds:02}")
}

/// Formats a UTC instant as an RFC 2822 `pubDate` in the given display
/// timezone, as required by the RSS 2.0 spec's `pubDate` format.
pub fn format_pub_date(instant: DateTime<Utc>, tz: Tz) -> String {
    instant.with_timezone(&tz).to_rfc2822()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn formats_durations_under_an_hour() {
        assert_eq!(format_itunes_duration(65), "00:01:05");
    }

    #[test]
    fn formats_durations_over_an_hour() {
        assert_eq!(format_itunes_duration(3725), "01:02:05");
    }

    #[test]
    fn negative_duration_clamps_to_zero() {
        assert_eq!(format_itunes_duration(-5), "00:00:00");
    }

    #[test]
    fn pub_date_reflects_display_timezone() {
        let instant = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        let formatted = format_pub_date(instant, chrono_tz::America::New_York);
        assert!(formatted.contains("31 Dec 2025"));
    }
}
