//! Per-run entry admission: date, window, then duplicate check.

use std::collections::HashSet;

use super::window::TimeWindow;
use super::Entry;
use crate::feeds::RawEntry;

/// Outcome of offering one raw entry to the run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Admission {
    Accepted,
    /// No resolvable publish time.
    Undated,
    /// No usable link to key on.
    NoLink,
    OutsideWindow,
    /// Link already accepted earlier in this run.
    Duplicate,
}

/// State for a single run. Created per run and dropped afterwards, so
/// nothing leaks between invocations.
///
/// Dedup keys on the literal link string: trailing slashes, parameter
/// order and tracking parameters all produce distinct keys.
#[derive(Debug)]
pub struct RunState {
    window: TimeWindow,
    seen_links: HashSet<String>,
    entries: Vec<Entry>,
}

impl RunState {
    #[must_use]
    pub fn new(window: TimeWindow) -> Self {
        Self {
            window,
            seen_links: HashSet::new(),
            entries: Vec::new(),
        }
    }

    /// Offer a raw entry from `source`.
    ///
    /// Only entries inside the window register their link, so an
    /// out-of-window copy never shadows a later in-window one.
    pub fn offer(&mut self, source: &str, raw: RawEntry) -> Admission {
        let Some(published) = raw.published else {
            return Admission::Undated;
        };
        let Some(link) = raw.link else {
            return Admission::NoLink;
        };
        if !self.window.contains(published) {
            return Admission::OutsideWindow;
        }

        self.accept(Entry {
            source: source.to_string(),
            title: raw.title.unwrap_or_default(),
            link,
            summary: raw.summary.unwrap_or_default(),
            published,
        })
    }

    /// Accept `entry` unless its link was seen before.
    pub fn accept(&mut self, entry: Entry) -> Admission {
        if !self.seen_links.insert(entry.link.clone()) {
            return Admission::Duplicate;
        }
        self.entries.push(entry);
        Admission::Accepted
    }

    #[must_use]
    pub fn is_seen(&self, link: &str) -> bool {
        self.seen_links.contains(link)
    }

    /// Accepted entries in encounter order.
    #[must_use]
    pub fn entries(&self) -> &[Entry] {
        &self.entries
    }

    #[must_use]
    pub fn into_entries(self) -> Vec<Entry> {
        self.entries
    }
}
