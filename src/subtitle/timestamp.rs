use serde::{Deserialize, Serialize};

use crate::{Result, SubtitleError};

/// Slack added before flooring to whole milliseconds. Covers values such as
/// 59.999 whose nearest f64 sits just below the intended millisecond.
const FLOOR_TOLERANCE_MS: f64 = 1e-4;

/// Timestamp flavour for caption files
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum TimestampStyle {
    /// `HH:MM:SS,mmm`
    Srt,
    /// `HH:MM:SS.mmm`
    Vtt,
}

impl TimestampStyle {
    fn millis_separator(self) -> char {
        match self {
            TimestampStyle::Srt => ',',
            TimestampStyle::Vtt => '.',
        }
    }
}

/// Convert a seconds offset to whole milliseconds, flooring.
/// Negative and NaN offsets map to zero.
pub fn to_millis(seconds: f64) -> u64 {
    if !(seconds > 0.0) {
        return 0;
    }
    (seconds * 1000.0 + FLOOR_TOLERANCE_MS).floor() as u64
}

/// Format a seconds offset as a caption timestamp.
///
/// Hours are not bounded: 100 hours formats as `100:00:00,000`.
pub fn format_timestamp(seconds: f64, style: TimestampStyle) -> String {
    let total_ms = to_millis(seconds);
    let hours = total_ms / 3_600_000;
    let minutes = (total_ms % 3_600_000) / 60_000;
    let secs = (total_ms % 60_000) / 1000;
    let millis = total_ms % 1000;

    format!(
        "{:02}:{:02}:{:02}{}{:03}",
        hours,
        minutes,
        secs,
        style.millis_separator(),
        millis
    )
}

/// Parse a single caption timestamp (`HH:MM:SS,mmm` or `HH:MM:SS.mmm`) to seconds
pub fn parse_timestamp(timestamp: &str) -> Result<f64> {
    let timestamp = timestamp.trim();
    let invalid = || SubtitleError::InvalidTimestamp(timestamp.to_string());

    let (hms, millis) = timestamp
        .rsplit_once(|c: char| c == ',' || c == '.')
        .ok_or_else(invalid)?;
    if millis.len() != 3 {
        return Err(invalid());
    }

    let hms_parts: Vec<&str> = hms.split(':').collect();
    if hms_parts.len() != 3 {
        return Err(invalid());
    }

    let hours = parse_field(hms_parts[0]).ok_or_else(invalid)?;
    let minutes = parse_field(hms_parts[1]).ok_or_else(invalid)?;
    let seconds = parse_field(hms_parts[2]).ok_or_else(invalid)?;
    let millis = parse_field(millis).ok_or_else(invalid)?;

    if minutes >= 60 || seconds >= 60 {
        return Err(invalid());
    }

    let total_ms = hours
        .checked_mul(60)
        .and_then(|m| m.checked_add(minutes))
        .and_then(|m| m.checked_mul(60))
        .and_then(|s| s.checked_add(seconds))
        .and_then(|s| s.checked_mul(1000))
        .and_then(|ms| ms.checked_add(millis))
        .ok_or_else(invalid)?;
    Ok(total_ms as f64 / 1000.0)
}

fn parse_field(field: &str) -> Option<u64> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_styles() {
        assert_eq!(format_timestamp(0.0, TimestampStyle::Srt), "00:00:00,000");
        assert_eq!(format_timestamp(0.0, TimestampStyle::Vtt), "00:00:00.000");
        assert_eq!(format_timestamp(1.5, TimestampStyle::Srt), "00:00:01,500");
        assert_eq!(format_timestamp(3661.25, TimestampStyle::Vtt), "01:01:01.250");
    }

    #[test]
    fn test_format_floors_milliseconds() {
        assert_eq!(format_timestamp(1.0009, TimestampStyle::Srt), "00:00:01,000");
        assert_eq!(format_timestamp(59.999, TimestampStyle::Srt), "00:00:59,999");
        assert_eq!(format_timestamp(1.001, TimestampStyle::Srt), "00:00:01,001");
    }

    #[test]
    fn test_format_past_a_day() {
        // hours keep counting past 24 and 99
        assert_eq!(format_timestamp(86_400.0, TimestampStyle::Srt), "24:00:00,000");
        assert_eq!(format_timestamp(100.0 * 3600.0, TimestampStyle::Srt), "100:00:00,000");
        assert_eq!(format_timestamp(359_999.999, TimestampStyle::Vtt), "99:59:59.999");
    }

    #[test]
    fn test_negative_is_clamped() {
        assert_eq!(format_timestamp(-3.0, TimestampStyle::Srt), "00:00:00,000");
        assert_eq!(to_millis(f64::NAN), 0);
    }

    #[test]
    fn test_parse_both_separators() {
        assert_eq!(parse_timestamp("01:01:01,500").unwrap(), 3661.5);
        assert_eq!(parse_timestamp("00:00:02.250").unwrap(), 2.25);
        assert_eq!(parse_timestamp("123:00:00,000").unwrap(), 442_800.0);
    }

    #[test]
    fn test_parse_rejects_malformed() {
        for bad in ["", "00:00:01", "00:01,000", "00:00:61,000", "00:00:01,5", "aa:00:01,000", "00:-1:01,000"] {
            assert!(parse_timestamp(bad).is_err(), "accepted {:?}", bad);
        }
    }

    #[test]
    fn test_parse_rejects_overflowing_hours() {
        let huge = format!("{}:00:00,000", u64::MAX);
        assert!(matches!(parse_timestamp(&huge), Err(SubtitleError::InvalidTimestamp(_))));
        assert!(parse_timestamp("5124095576030431:00:00,000").is_err());
    }

    #[test]
    fn test_round_trip() {
        for t in [0.0, 0.5, 59.999, 3600.0, 359_999.999] {
            for style in [TimestampStyle::Srt, TimestampStyle::Vtt] {
                let parsed = parse_timestamp(&format_timestamp(t, style)).unwrap();
                assert!((parsed - t).abs() < 0.0005, "{} -> {}", t, parsed);
            }
        }
    }
}
