//! Filtering, deduplication and aggregation of feed entries.

mod aggregate;
mod dedup;
mod window;

use chrono::{DateTime, Utc};

pub use aggregate::aggregate;
pub use dedup::{Admission, RunState};
pub use window::TimeWindow;

/// An accepted news item.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    /// Display name of the feed it came from.
    pub source: String,
    pub title: String,
    /// Unique key within a run.
    pub link: String,
    /// May be empty.
    pub summary: String,
    pub published: DateTime<Utc>,
}
