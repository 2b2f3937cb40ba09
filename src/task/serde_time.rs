//! Lenient date and timestamp parsing for task payloads.
//!
//! The remote API emits zone-less `LocalDateTime` strings for both due dates
//! and timestamps, while the demo dataset uses plain dates and RFC 3339.

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use serde::{de, Deserialize, Deserializer};

/// Parses `YYYY-MM-DD`, or a date-time whose date part is kept.
///
/// # Errors
///
/// Returns a message when the input does not start with a calendar date.
pub fn parse_date(raw: &str) -> Result<NaiveDate, String> {
    let raw = raw.trim();
    let date_part = match raw.char_indices().nth(10) {
        Some((idx, 'T' | ' ')) => &raw[..idx],
        Some(_) => return Err(format!("invalid date: {raw}")),
        None => raw,
    };
    NaiveDate::parse_from_str(date_part, "%Y-%m-%d").map_err(|e| format!("invalid date {raw}: {e}"))
}

/// Parses RFC 3339, or a zone-less date-time taken to be UTC.
///
/// # Errors
///
/// Returns a message when neither form matches.
pub fn parse_timestamp(raw: &str) -> Result<DateTime<Utc>, String> {
    let raw = raw.trim();
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }
    NaiveDateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f")
        .map(|naive| naive.and_utc())
        .map_err(|e| format!("invalid timestamp {raw}: {e}"))
}

pub(crate) fn optional_date<'de, D>(deserializer: D) -> Result<Option<NaiveDate>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<String> = Option::deserialize(deserializer)?;
    raw.filter(|s| !s.trim().is_empty())
        .map(|s| parse_date(&s).map_err(de::Error::custom))
        .transpose()
}

pub(crate) fn timestamp<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_timestamp(&raw).map_err(de::Error::custom)
}
