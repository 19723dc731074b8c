//! Lenient date parsing for feed timestamps.
//!
//! Message Center exports dates in several shapes (`2024-05-01T17:00:00Z`,
//! `2024-05-01T17:00:00.000Z`, `2024-05-01T17:00:00`, `2024-05-01`). Anything
//! that does not parse is treated as absent so callers can fall through to
//! the next candidate.

use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};

/// Naive layouts tried after RFC 3339; all are interpreted as UTC.
const NAIVE_DATETIME_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%dT%H:%M",
];

/// Parse a feed timestamp into UTC.
pub fn parse(s: &str) -> Option<DateTime<Utc>> {
    let s = s.trim();
    if s.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }

    NAIVE_DATETIME_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(s, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(s, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| naive.and_utc())
}

/// First candidate that parses.
pub fn parse_first<'a, I>(candidates: I) -> Option<DateTime<Utc>>
where
    I: IntoIterator<Item = &'a str>,
{
    candidates.into_iter().find_map(parse)
}

/// `YYYY-MM-DD`, as used by sitemap `<lastmod>`.
pub fn to_ymd(dt: DateTime<Utc>) -> String {
    dt.format("%Y-%m-%d").to_string()
}

/// `YYYY-MM-DDTHH:MM:SSZ` (W3C datetime).
pub fn to_w3c(dt: DateTime<Utc>) -> String {
    dt.to_rfc3339_opts(SecondsFormat::Secs, true)
}

/// Human-readable date for page text, e.g. `May 1, 2024`.
pub fn to_display(dt: DateTime<Utc>) -> String {
    dt.format("%B %-d, %Y").to_string()
}
