//! Capture-time and HTTP `Date` parsing.

use crate::error::CaptureTimeError;
use chrono::{DateTime, FixedOffset, NaiveTime};

/// Parse a capture time such as `01:15:30 PM` into a 24-hour time of day.
///
/// Hour 12 with `AM` becomes 0 and hours below 12 with `PM` gain 12. Any
/// other hour is kept, so `13:15:30 PM` stays 13:15:30. The meridiem is
/// matched case-sensitively.
pub fn parse_capture_time(raw: &str) -> Result<NaiveTime, CaptureTimeError> {
    let malformed = || CaptureTimeError::Malformed(raw.to_string());

    let mut parts = raw.split_whitespace();
    let (Some(clock), Some(meridiem), None) = (parts.next(), parts.next(), parts.next()) else {
        return Err(malformed());
    };

    let fields = clock
        .split(':')
        .map(str::parse::<u32>)
        .collect::<Result<Vec<_>, _>>()
        .map_err(|_| malformed())?;
    let [hour, minute, second] = fields[..] else {
        return Err(malformed());
    };

    let hour = match meridiem {
        "AM" if hour == 12 => 0,
        "PM" if hour < 12 => hour + 12,
        _ => hour,
    };

    NaiveTime::from_hms_opt(hour, minute, second).ok_or(CaptureTimeError::OutOfRange {
        hour,
        minute,
        second,
    })
}

/// Parse an HTTP-date such as `Mon, 01 Jan 2024 12:00:00 GMT`.
///
/// The weekday must agree with the date, and zone names such as `GMT`, `UT`
/// or `EST` are accepted.
pub fn parse_http_date(raw: &str) -> Result<DateTime<FixedOffset>, chrono::ParseError> {
    DateTime::parse_from_rfc2822(raw.trim())
}
