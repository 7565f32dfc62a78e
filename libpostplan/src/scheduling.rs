//! Schedule-string parsing
//!
//! Turns the human-friendly `--at` values accepted by the command-line
//! tools into concrete instants. The reference instant is passed in, never
//! read from the ambient clock.

use crate::error::{PostplanError, Result};
use chrono::{DateTime, Duration, Utc};

/// Parse a schedule string into a DateTime.
///
/// Supports:
/// - relative durations: "1h", "30m", "2d", "1 hour"
/// - natural language: "tomorrow", "next friday 3pm"
/// - absolute times: "2026-09-01 12:00"
///
/// # Errors
///
/// Returns an error if the string is empty or matches no supported format.
pub fn parse_schedule(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    if input.trim().is_empty() {
        return Err(PostplanError::InvalidInput(
            "Schedule string cannot be empty".to_string(),
        ));
    }

    // Try duration parsing first
    if let Ok(duration) = parse_duration(input) {
        return Ok(now + duration);
    }

    // Fall back to natural language / absolute parsing
    if let Ok(instant) = parse_natural_language(input, now) {
        return Ok(instant);
    }

    Err(PostplanError::InvalidInput(format!(
        "Could not parse schedule string: {}",
        input
    )))
}

/// Parse a duration string like "1h" or "30m" into a chrono::Duration
fn parse_duration(input: &str) -> Result<Duration> {
    if let Ok(std_duration) = humantime::parse_duration(input) {
        let seconds = std_duration.as_secs() as i64;
        return Duration::try_seconds(seconds)
            .ok_or_else(|| PostplanError::InvalidInput("Duration out of range".to_string()));
    }

    Err(PostplanError::InvalidInput(format!(
        "Could not parse duration: {}",
        input
    )))
}

/// Parse a natural-language or absolute time expression
fn parse_natural_language(input: &str, now: DateTime<Utc>) -> Result<DateTime<Utc>> {
    chrono_english::parse_date_string(input, now, chrono_english::Dialect::Us)
        .map_err(|e| PostplanError::InvalidInput(format!("Could not parse time: {}", e)))
}
