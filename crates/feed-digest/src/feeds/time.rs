//! Publish-date resolution.
//!
//! Feeds in the wild carry RFC 3339 (Atom), RFC 2822 (RSS) and a long tail
//! of almost-RFC-822 strings. [`parse_timestamp`] tries each form in turn
//! and is installed as the feed parser's timestamp hook, so every date
//! string a feed carries goes through it. Timestamps without zone
//! information are taken as UTC, never local time.

use chrono::{DateTime, FixedOffset, NaiveDate, NaiveDateTime, TimeZone, Utc};

/// Date-time layouts tried after the weekday and zone have been split off.
const LENIENT_FORMATS: &[&str] = &[
    "%d %b %Y %H:%M:%S",
    "%d %b %Y %H:%M",
    "%d %B %Y %H:%M:%S",
    "%d %B %Y %H:%M",
];

/// ISO-like layouts that carry a numeric offset without the RFC 3339 colon.
const OFFSET_FORMATS: &[&str] = &["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M:%S%.f%z"];

/// ISO-like layouts without any zone.
const NAIVE_FORMATS: &[&str] = &[
    "%Y-%m-%dT%H:%M:%S",
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
];

/// Resolve a raw feed date string to a UTC instant.
///
/// Returns `None` when no strategy understands the text; callers drop such
/// entries rather than fail.
#[must_use]
pub fn parse_timestamp(text: &str) -> Option<DateTime<Utc>> {
    let text = text.split_whitespace().collect::<Vec<_>>().join(" ");
    if text.is_empty() {
        return None;
    }

    DateTime::parse_from_rfc3339(&text)
        .or_else(|_| DateTime::parse_from_rfc2822(&text))
        .ok()
        .or_else(|| {
            OFFSET_FORMATS
                .iter()
                .find_map(|fmt| DateTime::parse_from_str(&text, fmt).ok())
        })
        .map(|dt| dt.with_timezone(&Utc))
        .or_else(|| parse_lenient_rfc822(&text))
        .or_else(|| parse_naive(&text))
}

/// RFC 822 look-alikes: optional weekday, full month names, `UTC`,
/// `+00:00` style offsets, missing zone.
fn parse_lenient_rfc822(text: &str) -> Option<DateTime<Utc>> {
    let body = match text.split_once(',') {
        Some((day, rest)) if !day.is_empty() && day.chars().all(char::is_alphabetic) => {
            rest.trim()
        }
        _ => text,
    };

    let utc = FixedOffset::east_opt(0)?;
    let (datetime, offset) = match body.rsplit_once(' ') {
        Some((dt, zone)) => match zone_offset(zone) {
            Some(offset) => (dt, offset),
            // Unknown zone abbreviation (CEST, BST, JST...): read as UTC.
            None if zone.chars().all(|c| c.is_ascii_alphabetic()) => (dt, utc),
            None => (body, utc),
        },
        None => (body, utc),
    };

    let naive = LENIENT_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(datetime, fmt).ok())?;

    offset
        .from_local_datetime(&naive)
        .single()
        .map(|dt| dt.with_timezone(&Utc))
}

fn parse_naive(text: &str) -> Option<DateTime<Utc>> {
    NAIVE_FORMATS
        .iter()
        .find_map(|fmt| NaiveDateTime::parse_from_str(text, fmt).ok())
        .or_else(|| {
            NaiveDate::parse_from_str(text, "%Y-%m-%d")
                .ok()
                .and_then(|d| d.and_hms_opt(0, 0, 0))
        })
        .map(|naive| Utc.from_utc_datetime(&naive))
}

fn zone_offset(zone: &str) -> Option<FixedOffset> {
    let hours = match zone.to_ascii_uppercase().as_str() {
        "GMT" | "UT" | "UTC" | "Z" => 0,
        "EDT" => -4,
        "EST" | "CDT" => -5,
        "CST" | "MDT" => -6,
        "MST" | "PDT" => -7,
        "PST" => -8,
        _ => return numeric_offset(zone),
    };
    FixedOffset::east_opt(hours * 3600)
}

fn numeric_offset(zone: &str) -> Option<FixedOffset> {
    let (sign, rest) = if let Some(rest) = zone.strip_prefix('+') {
        (1, rest)
    } else if let Some(rest) = zone.strip_prefix('-') {
        (-1, rest)
    } else {
        return None;
    };

    let digits: String = rest.chars().filter(|c| *c != ':').collect();
    if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }

    let hours: i32 = digits[..2].parse().ok()?;
    let minutes: i32 = digits[2..].parse().ok()?;
    FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
}
