//! Field parsers for raw CSV cells.
//!
//! Every parser here is lenient: a value that cannot be interpreted is
//! reported as `None` and the caller decides how to count it.

use chrono::{DateTime, NaiveDate, NaiveDateTime};

const DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

const DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%d-%b-%Y"];

/// Parses a timestamp cell. Date-only values resolve to midnight.
///
/// Returns `None` for empty or unrecognized input.
pub fn parse_timestamp(raw: &str) -> Option<NaiveDateTime> {
    let raw = raw.trim();
    if raw.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return Some(dt.naive_utc());
    }

    // Fractional seconds are dropped before trying the fixed formats.
    let trimmed = raw.split('.').next().unwrap_or(raw);
    for fmt in DATETIME_FORMATS {
        if let Ok(dt) = NaiveDateTime::parse_from_str(trimmed, fmt) {
            return Some(dt);
        }
    }

    DATE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDate::parse_from_str(raw, fmt).ok())
        .and_then(|d| d.and_hms_opt(0, 0, 0))
}

/// Parses a non-negative count.
///
/// Empty cells count as zero. Floats are truncated and negatives clamp to
/// zero. Returns `None` only when the text is not a number at all.
pub fn parse_count(raw: &str) -> Option<u64> {
    let raw = raw.trim();
    if raw.is_empty() {
        return Some(0);
    }
    if let Ok(n) = raw.parse::<u64>() {
        return Some(n);
    }
    match raw.replace(',', "").parse::<f64>() {
        Ok(f) if f.is_nan() => Some(0),
        Ok(f) => Some(f.max(0.0).trunc() as u64),
        Err(_) => None,
    }
}

/// Turns a cell into an optional string, treating blank text as missing.
pub fn parse_text(raw: &str) -> Option<String> {
    let raw = raw.trim();
    if raw.is_empty() {
        None
    } else {
        Some(raw.to_string())
    }
}

/// Splits a tag cell into its individual tags.
pub fn parse_tags(raw: &str) -> Vec<String> {
    raw.split([',', ';', '|'])
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect()
}
