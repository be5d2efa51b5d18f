//! Feed parsing for RSS, Atom and JSON Feed bodies.

use chrono::{DateTime, Utc};
use feed_rs::model::{Entry, Feed};

use super::sources::UNKNOWN_SOURCE;
use super::time::parse_timestamp;
use crate::error::ParseError;

/// A parsed feed: its display name and entries in document order.
#[derive(Debug, Clone)]
pub struct ParsedFeed {
    /// Feed title, or [`UNKNOWN_SOURCE`].
    pub title: String,
    pub entries: Vec<RawEntry>,
}

/// One feed item before filtering. Every field may be absent.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub summary: Option<String>,
    pub published: Option<DateTime<Utc>>,
}

/// Parse a feed body of any supported dialect.
pub fn parse_feed(body: &[u8]) -> Result<ParsedFeed, ParseError> {
    let parser = feed_rs::parser::Builder::new()
        .timestamp_parser(parse_timestamp)
        .build();
    let feed = parser.parse(body)?;
    Ok(convert(feed))
}

fn convert(feed: Feed) -> ParsedFeed {
    let title = feed
        .title
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty())
        .unwrap_or_else(|| UNKNOWN_SOURCE.to_string());

    let entries = feed.entries.iter().map(convert_entry).collect();

    ParsedFeed { title, entries }
}

fn convert_entry(entry: &Entry) -> RawEntry {
    let title = entry
        .title
        .as_ref()
        .map(|t| t.content.trim().to_string())
        .filter(|t| !t.is_empty());

    let summary = entry
        .summary
        .as_ref()
        .map(|s| s.content.clone())
        .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty());

    RawEntry {
        title,
        link: select_link(entry),
        summary,
        published: entry.published,
    }
}

/// Prefer the alternate (or unqualified) link, then any link, then an
/// entry id that is itself a URL.
fn select_link(entry: &Entry) -> Option<String> {
    let non_empty = || entry.links.iter().filter(|l| !l.href.trim().is_empty());

    non_empty()
        .find(|l| {
            l.rel
                .as_deref()
                .is_none_or(|rel| rel.is_empty() || rel.eq_ignore_ascii_case("alternate"))
        })
        .or_else(|| non_empty().next())
        .map(|l| l.href.trim().to_string())
        .or_else(|| {
            let id = entry.id.trim();
            (id.starts_with("http://") || id.starts_with("https://")).then(|| id.to_string())
        })
}
