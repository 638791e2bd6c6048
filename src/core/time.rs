//! Shared timestamp/id helpers.

use chrono::{DateTime, SecondsFormat, Utc};
use ulid::Ulid;

/// Current instant as RFC 3339 with millisecond precision and `Z` suffix
/// (e.g. `2026-10-19T08:30:00.123Z`).
pub fn now_iso() -> String {
    Utc::now().to_rfc3339_opts(SecondsFormat::Millis, true)
}

pub fn parse_iso(ts: &str) -> Option<DateTime<Utc>> {
    DateTime::parse_from_rfc3339(ts)
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

pub fn new_event_id() -> String {
    Ulid::new().to_string()
}
