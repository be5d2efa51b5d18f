//! Digest pipeline - orchestrates the fetch-filter-aggregate-digest-email flow.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};

use crate::collect::{aggregate, Admission, Entry, RunState, TimeWindow};
use crate::config::DEFAULT_WINDOW_HOURS;
use crate::digest::{DigestGenerator, DigestMailer, EmailTemplate};
use crate::error::DigestError;
use crate::feeds::{parse_feed, FeedSource, FetchFeed};

/// Counters for one collection pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CollectStats {
    /// Feeds requested.
    pub feeds_attempted: usize,
    /// Feeds that failed to fetch or parse.
    pub feeds_failed: usize,
    /// Raw entries read from all parsed feeds.
    pub entries_seen: usize,
    /// Entries kept.
    pub accepted: usize,
    /// Dropped because the link was already accepted.
    pub duplicates: usize,
    /// Dropped for lack of a resolvable publish time.
    pub undated: usize,
    /// Dropped for lack of a link.
    pub no_link: usize,
    /// Dropped for falling outside the window.
    pub outside_window: usize,
}

/// Result of fetching and filtering every feed.
#[derive(Debug, Clone, Default)]
pub struct Collection {
    /// Accepted entries, newest first.
    pub entries: Vec<Entry>,
    /// Rendered aggregate; empty when no entry qualified.
    pub text: String,
    pub stats: CollectStats,
    /// Per-feed failures, for the run summary.
    pub errors: Vec<String>,
}

impl Collection {
    /// `true` when nothing qualified and the run should stop.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// Fetches feeds in order and builds the aggregate.
pub struct Collector {
    fetcher: Arc<dyn FetchFeed>,
    feeds: Vec<FeedSource>,
    window_span: Duration,
}

impl Collector {
    #[must_use]
    pub fn new(fetcher: Arc<dyn FetchFeed>, feeds: Vec<FeedSource>) -> Self {
        Self {
            fetcher,
            feeds,
            window_span: Duration::hours(DEFAULT_WINDOW_HOURS),
        }
    }

    #[must_use]
    pub fn with_window(mut self, span: Duration) -> Self {
        self.window_span = span;
        self
    }

    /// Collect entries published in the window ending at `now`.
    ///
    /// Feeds are fetched one at a time in configured order. A feed that
    /// fails to fetch or parse contributes nothing; the pass continues.
    pub async fn collect(&self, now: DateTime<Utc>) -> Collection {
        let mut state = RunState::new(TimeWindow::ending_at(now, self.window_span));
        let mut stats = CollectStats::default();
        let mut errors = Vec::new();

        tracing::info!(feeds = self.feeds.len(), "Fetching news from feeds");

        for source in &self.feeds {
            stats.feeds_attempted += 1;

            let body = match self.fetcher.fetch(&source.url).await {
                Ok(body) => body,
                Err(e) => {
                    if let Some(status) = e.status() {
                        tracing::warn!(
                            url = %source.url,
                            status,
                            "Error fetching feed: HTTP error, likely blocked by the source"
                        );
                    } else {
                        tracing::warn!(url = %source.url, error = %e, "Error fetching feed");
                    }
                    stats.feeds_failed += 1;
                    errors.push(format!("{}: {e}", source.url));
                    continue;
                }
            };

            let feed = match parse_feed(&body) {
                Ok(feed) => feed,
                Err(e) => {
                    tracing::warn!(url = %source.url, error = %e, "Error parsing feed");
                    stats.feeds_failed += 1;
                    errors.push(format!("{}: {e}", source.url));
                    continue;
                }
            };

            tracing::info!(url = %source.url, "Scraping {}", feed.title);

            let mut found = 0;
            for raw in feed.entries {
                stats.entries_seen += 1;
                let title = raw.title.clone();
                match state.offer(&feed.title, raw) {
                    Admission::Accepted => {
                        found += 1;
                        stats.accepted += 1;
                    }
                    Admission::Duplicate => stats.duplicates += 1,
                    Admission::Undated => {
                        tracing::debug!(
                            source = %feed.title,
                            title = title.as_deref().unwrap_or_default(),
                            "Dropping entry without a resolvable publish time"
                        );
                        stats.undated += 1;
                    }
                    Admission::NoLink => stats.no_link += 1,
                    Admission::OutsideWindow => stats.outside_window += 1,
                }
            }

            tracing::info!(
                "Found {found} unique articles from the last {} hours in {}",
                self.window_span.num_hours(),
                feed.title
            );
        }

        let mut entries = state.into_entries();
        let text = aggregate(&mut entries);

        tracing::info!(
            attempted = stats.feeds_attempted,
            failed = stats.feeds_failed,
            seen = stats.entries_seen,
            accepted = stats.accepted,
            duplicates = stats.duplicates,
            undated = stats.undated,
            outside_window = stats.outside_window,
            "Collection complete"
        );

        Collection {
            entries,
            text,
            stats,
            errors,
        }
    }
}

/// How a run ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RunOutcome {
    /// Digest generated and emailed.
    Sent,
    /// Nothing qualified; digest and email were skipped.
    NoNews,
    /// Digest generated and rendered, email deliberately not sent.
    DryRun { subject: String, html: String },
    /// Digest generated but the email could not be sent. Not retried.
    DeliveryFailed(String),
}

/// Result of a single run.
#[derive(Debug, Clone)]
pub struct RunSummary {
    pub stats: CollectStats,
    pub errors: Vec<String>,
    /// Model that produced the digest, if one was generated.
    pub model: Option<String>,
    pub outcome: RunOutcome,
}

/// Configuration for the digest pipeline.
#[derive(Debug, Clone)]
pub struct PipelineConfig {
    /// Look-back window.
    pub window: Duration,
    /// Render the email without sending it.
    pub dry_run: bool,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            window: Duration::hours(DEFAULT_WINDOW_HOURS),
            dry_run: false,
        }
    }
}

/// Digest pipeline orchestrator.
pub struct Pipeline {
    collector: Collector,
    generator: DigestGenerator,
    mailer: Arc<dyn DigestMailer>,
    dry_run: bool,
}

impl Pipeline {
    /// Create a new pipeline.
    #[must_use]
    pub fn new(
        config: PipelineConfig,
        fetcher: Arc<dyn FetchFeed>,
        feeds: Vec<FeedSource>,
        generator: DigestGenerator,
        mailer: Arc<dyn DigestMailer>,
    ) -> Self {
        Self {
            collector: Collector::new(fetcher, feeds).with_window(config.window),
            generator,
            mailer,
            dry_run: config.dry_run,
        }
    }

    /// Run once against the current time.
    pub async fn run(&self) -> Result<RunSummary, DigestError> {
        self.run_at(Utc::now()).await
    }

    /// Run once with `now` as the end of the window.
    ///
    /// Only total digest-generation failure is an error. Feed failures are
    /// recorded in the summary; a delivery failure is logged and reported
    /// as [`RunOutcome::DeliveryFailed`].
    pub async fn run_at(&self, now: DateTime<Utc>) -> Result<RunSummary, DigestError> {
        tracing::info!(%now, "Starting digest run");

        let collection = self.collector.collect(now).await;
        let mut summary = RunSummary {
            stats: collection.stats.clone(),
            errors: collection.errors.clone(),
            model: None,
            outcome: RunOutcome::NoNews,
        };

        if collection.is_empty() {
            tracing::info!("No news found, skipping digest and email");
            return Ok(summary);
        }

        tracing::info!(
            entries = collection.entries.len(),
            "Sending aggregate for summarization"
        );
        let digest = self.generator.generate(&collection.text).await?;
        summary.model = Some(digest.model.clone());

        let subject = EmailTemplate::subject(now);
        let html = EmailTemplate::render_html(&digest.text);

        if self.dry_run {
            tracing::info!(subject = %subject, "Dry run, email not sent");
            summary.outcome = RunOutcome::DryRun { subject, html };
            return Ok(summary);
        }

        let text = EmailTemplate::render_text(&digest.text);
        summary.outcome = match self.mailer.send(&subject, &html, &text).await {
            Ok(()) => RunOutcome::Sent,
            Err(e) => {
                tracing::error!(error = %format!("{e:#}"), "Failed to send email");
                RunOutcome::DeliveryFailed(format!("{e:#}"))
            }
        };

        Ok(summary)
    }
}
