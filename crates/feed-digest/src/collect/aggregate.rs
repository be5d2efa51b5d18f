//! Rendering accepted entries into the text block sent to the model.

use std::fmt::Write;

use super::Entry;

/// Line separating entries in the aggregate.
pub const ENTRY_DELIMITER: &str = "---";

/// Sort `entries` newest first in place and render them.
///
/// The sort is stable, so entries with equal timestamps keep encounter
/// order. Returns an empty string when there is nothing to report; callers
/// treat that as "no news" and stop.
pub fn aggregate(entries: &mut [Entry]) -> String {
    sort_newest_first(entries);
    render(entries)
}

pub fn sort_newest_first(entries: &mut [Entry]) {
    entries.sort_by(|a, b| b.published.cmp(&a.published));
}

/// Render entries in the given order.
#[must_use]
pub fn render(entries: &[Entry]) -> String {
    let mut text = String::new();
    for entry in entries {
        let _ = write!(
            text,
            "Source: {source}\nPublished Time: {published}\nTitle: {title}\nLink: {link}\nSummary: {summary}\n\n{ENTRY_DELIMITER}\n\n",
            source = entry.source,
            published = entry.published.format("%Y-%m-%d %H:%M:%S UTC"),
            title = entry.title,
            link = entry.link,
            summary = entry.summary,
        );
    }
    text
}
