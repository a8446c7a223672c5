//! Small helpers shared across the crate: timestamp handling, relative time
//! labels, cursor editing, and lenient JSON field decoding.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, Utc};
use serde::{Deserialize, Deserializer};

/// Parse a backend timestamp.
///
/// Accepts RFC 3339, `%Y-%m-%dT%H:%M:%S%z`, offset-less ISO date-times and
/// plain dates (read as UTC), and integer epoch milliseconds.
pub fn parse_timestamp(s: &str) -> Option<DateTime<FixedOffset>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt);
    }
    // Example: 2025-08-20T15:23:45+0200
    if let Ok(dt) = DateTime::parse_from_str(s, "%Y-%m-%dT%H:%M:%S%z") {
        return Some(dt);
    }
    for format in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, format) {
            return Some(naive.and_utc().fixed_offset());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return date
            .and_hms_opt(0, 0, 0)
            .map(|naive| naive.and_utc().fixed_offset());
    }

    s.parse::<i64>()
        .ok()
        .and_then(DateTime::<Utc>::from_timestamp_millis)
        .map(|dt| dt.fixed_offset())
}

/// Milliseconds since the epoch, with missing or unparseable values at 0.
pub fn sort_timestamp(s: Option<&str>) -> i64 {
    s.and_then(parse_timestamp)
        .map(|dt| dt.timestamp_millis())
        .unwrap_or(0)
}

const INTERVALS: [(&str, i64); 7] = [
    ("year", 31_536_000),
    ("month", 2_592_000),
    ("week", 604_800),
    ("day", 86_400),
    ("hour", 3_600),
    ("minute", 60),
    ("second", 1),
];

/// Human readable age of a timestamp relative to `now`, e.g. "3 hours ago".
///
/// Missing, invalid and future timestamps all read "Just now".
pub fn time_ago_from(created_at: Option<&str>, now: DateTime<Utc>) -> String {
    let Some(time) = created_at.and_then(parse_timestamp) else {
        return "Just now".to_string();
    };

    let diff = (now.timestamp_millis() - time.timestamp_millis()) / 1000;
    if diff < 0 {
        return "Just now".to_string();
    }

    for (unit, seconds) in INTERVALS {
        let interval = diff / seconds;
        if interval >= 1 {
            let plural = if interval != 1 { "s" } else { "" };
            return format!("{interval} {unit}{plural} ago");
        }
    }
    "Just now".to_string()
}

pub fn time_ago(created_at: Option<&str>) -> String {
    time_ago_from(created_at, Utc::now())
}

/// Clamp a byte cursor into `buffer` and move it back onto a char boundary.
fn floor_char_boundary(buffer: &str, cursor: usize) -> usize {
    let mut at = cursor.min(buffer.len());
    while !buffer.is_char_boundary(at) {
        at -= 1;
    }
    at
}

/// Insert `text` at a byte cursor and advance the cursor past it.
pub(crate) fn insert_at_cursor(buffer: &mut String, cursor: &mut usize, text: &str) {
    let at = floor_char_boundary(buffer, *cursor);
    buffer.insert_str(at, text);
    *cursor = at + text.len();
}

/// Remove the character before a byte cursor, keeping the cursor on a char boundary.
pub(crate) fn backspace_at_cursor(buffer: &mut String, cursor: &mut usize) {
    let at = floor_char_boundary(buffer, *cursor);
    if let Some(ch) = buffer[..at].chars().next_back() {
        let start = at - ch.len_utf8();
        buffer.remove(start);
        *cursor = start;
    }
}

#[derive(Deserialize)]
#[serde(untagged)]
enum StringOrNumber {
    String(String),
    Integer(i64),
    Float(f64),
}

impl From<StringOrNumber> for String {
    fn from(value: StringOrNumber) -> Self {
        match value {
            StringOrNumber::String(s) => s,
            StringOrNumber::Integer(i) => i.to_string(),
            StringOrNumber::Float(f) => f.to_string(),
        }
    }
}

/// Ids arrive either as JSON strings or numbers; `null` becomes empty.
pub(crate) fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?
        .map(String::from)
        .unwrap_or_default())
}

pub(crate) fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<StringOrNumber>::deserialize(deserializer)?.map(String::from))
}

#[derive(Deserialize)]
#[serde(untagged)]
enum Count {
    Unsigned(u64),
    Signed(i64),
    Float(f64),
    Text(String),
}

/// Counters arrive as integers, floats or digit strings; `null`, negatives
/// and unreadable text all count as zero.
pub(crate) fn lenient_count<'de, D>(deserializer: D) -> Result<u64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Count>::deserialize(deserializer)? {
        Some(Count::Unsigned(n)) => n,
        Some(Count::Float(f)) if f.is_finite() && f > 0.0 => f as u64,
        Some(Count::Text(s)) => s.trim().parse().unwrap_or(0),
        Some(Count::Signed(_)) | Some(Count::Float(_)) | None => 0,
    })
}

/// Treat an explicit JSON `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}
