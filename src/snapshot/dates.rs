//! Date resolution for heterogeneous upstream records.
//!
//! The hospital API mixes calendar dates and several ISO 8601
//! timestamp shapes in the same columns. `resolve_date` folds them
//! all into one sortable `NaiveDateTime`; anything unparseable sorts
//! as `MIN_DATE` so ranking never fails on malformed input.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use serde_json::Value;

/// Sentinel for absent or unparseable dates. Sorts last under the
/// descending recency order.
pub const MIN_DATE: NaiveDateTime = NaiveDateTime::MIN;

/// Timestamp formats tried in priority order after the plain
/// calendar-date form.
// %.f consumes the dot and reads the fraction left-aligned, so ".589"
// means 589 milliseconds (plain %f would read it as nanoseconds).
const TIMESTAMP_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.fZ",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%SZ",
];

/// Resolve an upstream field value to a sortable date.
///
/// Absent, null and empty-string values resolve to [`MIN_DATE`], as
/// does any value no format accepts. Non-string scalars are
/// stringified before parsing.
pub fn resolve_date(value: Option<&Value>) -> NaiveDateTime {
    let text = match value {
        None | Some(Value::Null) => return MIN_DATE,
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    };
    if text.is_empty() {
        return MIN_DATE;
    }
    parse_text(&text).unwrap_or(MIN_DATE)
}

fn parse_text(text: &str) -> Option<NaiveDateTime> {
    if let Ok(date) = NaiveDate::parse_from_str(text, "%Y-%m-%d") {
        return date.and_hms_opt(0, 0, 0);
    }
    for format in TIMESTAMP_FORMATS {
        if let Ok(parsed) = NaiveDateTime::parse_from_str(text, format) {
            return Some(parsed);
        }
    }
    // General ISO 8601 fallback. A literal trailing zone marker is
    // normalized to an explicit UTC offset first.
    let normalized = match text.strip_suffix('Z') {
        Some(prefix) => format!("{prefix}+00:00"),
        None => text.to_string(),
    };
    DateTime::parse_from_rfc3339(&normalized)
        .ok()
        .map(|parsed| parsed.naive_utc())
}
