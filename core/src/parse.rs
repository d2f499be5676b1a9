//! Cell-level parsers for the raw OCDS exports.
//!
//! Both parsers distinguish an empty cell (absent, not an error) from a
//! cell that holds something unreadable (absent, and the caller records a
//! quality issue).

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};

#[derive(Debug, Clone, PartialEq)]
pub enum Parsed<T> {
    Value(T),
    Empty,
    Malformed(String),
}

const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
];

/// Parse an OCDS timestamp. Offsets are normalized to UTC; naive values
/// are taken as UTC.
pub fn parse_timestamp(raw: &str) -> Parsed<DateTime<Utc>> {
    let s = raw.trim();
    if s.is_empty() {
        return Parsed::Empty;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Parsed::Value(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_DATETIME_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Parsed::Value(naive.and_utc());
        }
    }
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        if let Some(naive) = date.and_hms_opt(0, 0, 0) {
            return Parsed::Value(naive.and_utc());
        }
    }
    Parsed::Malformed(s.to_string())
}

/// Parse a currency cell such as `"KES 1,250,000"`.
pub fn parse_amount(raw: &str) -> Parsed<f64> {
    let cleaned: String = raw
        .replace("KES", "")
        .chars()
        .filter(|c| *c != ',' && !c.is_whitespace())
        .collect();
    if cleaned.is_empty() {
        return Parsed::Empty;
    }
    match cleaned.parse::<f64>() {
        Ok(v) if v.is_finite() => Parsed::Value(v),
        _ => Parsed::Malformed(raw.trim().to_string()),
    }
}
