use std::time::Duration;

use anyhow::{bail, Result};
use chrono::{DateTime, Utc};

/// Suffix to seconds multiplier (order matters: longer suffixes first)
const UNITS: &[(&str, f64)] = &[
    ("ms", 0.001),
    ("s", 1.0),
    ("m", 60.0),
    ("h", 3_600.0),
    ("d", 86_400.0),
    ("w", 604_800.0),
];

/// Parse interval strings like "500ms", "30s", "5m", "1h", "7d"
pub fn parse_duration(s: &str) -> Result<Duration> {
    let s = s.trim();

    for (suffix, multiplier) in UNITS {
        if let Some(val_str) = s.strip_suffix(suffix) {
            let val: f64 = val_str.parse()?;
            if !val.is_finite() || val < 0.0 {
                bail!("Invalid duration: {}", s);
            }
            return match Duration::try_from_secs_f64(val * multiplier) {
                Ok(d) => Ok(d),
                Err(_) => bail!("Duration out of range: {}", s),
            };
        }
    }

    bail!("Unknown duration format: {}", s)
}

/// Longest accepted refresh interval
pub const MAX_REFRESH: Duration = Duration::from_secs(7 * 86_400);

/// Parse a refresh interval: non-zero and at most [`MAX_REFRESH`]
pub fn parse_refresh_interval(s: &str) -> Result<Duration> {
    let d = parse_duration(s)?;
    if d.is_zero() {
        bail!("Refresh interval must be greater than zero");
    }
    if d > MAX_REFRESH {
        bail!("Refresh interval {} is longer than 7d", s.trim());
    }
    Ok(d)
}

/// Format a span of seconds with its two largest units, e.g. "3d 4h"
fn format_span(secs: i64) -> String {
    let secs = secs.unsigned_abs();
    let days = secs / 86_400;
    let hours = (secs % 86_400) / 3_600;
    let minutes = (secs % 3_600) / 60;

    if days >= 365 {
        format!("{:.1}y", days as f64 / 365.0)
    } else if days > 0 {
        format!("{}d {}h", days, hours)
    } else if hours > 0 {
        format!("{}h {}m", hours, minutes)
    } else if minutes > 0 {
        format!("{}m", minutes)
    } else {
        format!("{}s", secs)
    }
}

/// Format `at` relative to `now` ("in 3d 4h", "2h 5m ago")
pub fn format_relative(at: DateTime<Utc>, now: DateTime<Utc>) -> String {
    let delta = at.signed_duration_since(now).num_seconds();
    if delta >= 0 {
        format!("in {}", format_span(delta))
    } else {
        format!("{} ago", format_span(delta))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_parse_seconds() {
        let d = parse_duration("30s").unwrap();
        assert_eq!(d.as_secs(), 30);
    }

    #[test]
    fn test_parse_milliseconds() {
        let d = parse_duration("250ms").unwrap();
        assert_eq!(d.as_millis(), 250);
    }

    #[test]
    fn test_parse_minutes_and_days() {
        assert_eq!(parse_duration("5m").unwrap().as_secs(), 300);
        assert_eq!(parse_duration("1.5h").unwrap().as_secs(), 5_400);
        assert_eq!(parse_duration("2d").unwrap().as_secs(), 172_800);
    }

    #[test]
    fn test_parse_rejects_garbage() {
        assert!(parse_duration("soon").is_err());
        assert!(parse_duration("-5s").is_err());
        assert!(parse_duration("10").is_err());
    }

    #[test]
    fn test_parse_rejects_oversized() {
        let err = parse_duration("1e20s").unwrap_err();
        assert!(err.to_string().contains("out of range"));
        assert!(parse_duration("1e300w").is_err());
    }

    #[test]
    fn test_refresh_interval_bounds() {
        assert_eq!(parse_refresh_interval("30s").unwrap().as_secs(), 30);
        assert_eq!(parse_refresh_interval("7d").unwrap(), MAX_REFRESH);
        assert!(parse_refresh_interval("0s").is_err());
        assert!(parse_refresh_interval("8d").is_err());
        assert!(parse_refresh_interval("1e15s").is_err());
    }

    #[test]
    fn test_format_relative() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2024, 1, 4, 5, 0, 0).unwrap();
        let earlier = Utc.with_ymd_and_hms(2023, 12, 31, 21, 30, 0).unwrap();

        assert_eq!(format_relative(later, now), "in 3d 5h");
        assert_eq!(format_relative(earlier, now), "2h 30m ago");
        assert_eq!(format_relative(now, now), "in 0s");
    }

    #[test]
    fn test_format_relative_years() {
        let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
        let later = Utc.with_ymd_and_hms(2026, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(format_relative(later, now), "in 2.0y");
    }
}
