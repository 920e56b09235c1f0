//! `HH:MM:SS` annotation timestamps.

use std::sync::LazyLock;

use regex::Regex;

/// Value used when an annotation is created without a timestamp.
pub const DEFAULT_TIMESTAMP: &str = "00:00:00";

static TIMESTAMP_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^([0-9]{2}):([0-5][0-9]):([0-5][0-9])$").expect("valid regex"));

/// Validate a timestamp: two ASCII digits each for hours, minutes and
/// seconds, with minutes and seconds below 60.
pub fn validate_timestamp(field: &str, value: &str) -> Result<(), String> {
    if TIMESTAMP_RE.is_match(value) {
        Ok(())
    } else {
        Err(format!(
            "{field} must be formatted as HH:MM:SS (e.g. 00:01:30), got '{value}'"
        ))
    }
}

/// Convert a well-formed `HH:MM:SS` string to seconds.
///
/// Returns `None` for malformed input.
pub fn to_seconds(value: &str) -> Option<u32> {
    let caps = TIMESTAMP_RE.captures(value)?;
    let hours: u32 = caps[1].parse().ok()?;
    let minutes: u32 = caps[2].parse().ok()?;
    let seconds: u32 = caps[3].parse().ok()?;
    Some(hours * 3600 + minutes * 60 + seconds)
}
