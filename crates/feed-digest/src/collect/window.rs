//! Publish-time window.

use chrono::{DateTime, Duration, Utc};

/// Closed interval `[now - span, now]`.
///
/// Entries dated after `now` (publisher clock skew) fall outside the
/// window and are excluded, not clamped.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimeWindow {
    start: DateTime<Utc>,
    end: DateTime<Utc>,
}

impl TimeWindow {
    /// Window ending at `now` and reaching back `span`.
    #[must_use]
    pub fn ending_at(now: DateTime<Utc>, span: Duration) -> Self {
        Self {
            start: now - span,
            end: now,
        }
    }

    /// The standard 24-hour digest window.
    #[must_use]
    pub fn last_24h(now: DateTime<Utc>) -> Self {
        Self::ending_at(now, Duration::hours(24))
    }

    #[must_use]
    pub const fn start(&self) -> DateTime<Utc> {
        self.start
    }

    #[must_use]
    pub const fn end(&self) -> DateTime<Utc> {
        self.end
    }

    /// Both bounds are inclusive.
    #[must_use]
    pub fn contains(&self, t: DateTime<Utc>) -> bool {
        self.start <= t && t <= self.end
    }
}
