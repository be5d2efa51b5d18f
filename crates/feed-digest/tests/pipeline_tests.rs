//! Integration tests for the digest pipeline.
//!
//! Feeds, the model and the mailer are replaced by in-memory doubles so a
//! whole run can be driven against a fixed clock.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use anyhow::Result;
use async_trait::async_trait;
use bytes::Bytes;
use chrono::{DateTime, Duration, TimeZone, Utc};

use feed_digest::ai::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions};
use feed_digest::digest::{DigestGenerator, DigestMailer, GREETING};
use feed_digest::error::{AiError, DigestError, FetchError};
use feed_digest::feeds::{FeedSource, FetchFeed};
use feed_digest::pipeline::{Collector, Pipeline, PipelineConfig, RunOutcome};

// =============================================================================
// Test doubles
// =============================================================================

/// Serves canned bodies or errors by URL.
#[derive(Default)]
struct StubFetcher {
    responses: HashMap<String, Result<Bytes, FetchError>>,
    requested: Mutex<Vec<String>>,
}

impl StubFetcher {
    fn with_body(mut self, url: &str, body: String) -> Self {
        self.responses.insert(url.to_string(), Ok(Bytes::from(body)));
        self
    }

    fn with_error(mut self, url: &str, error: FetchError) -> Self {
        self.responses.insert(url.to_string(), Err(error));
        self
    }
}

#[async_trait]
impl FetchFeed for StubFetcher {
    async fn fetch(&self, url: &str) -> Result<Bytes, FetchError> {
        self.requested.lock().unwrap().push(url.to_string());
        self.responses
            .get(url)
            .cloned()
            .unwrap_or_else(|| Err(FetchError::Transport("connection refused".to_string())))
    }
}

/// Answers with a fixed digest unless the model is listed as failing.
struct StubProvider {
    failing: Vec<String>,
    prompts: Mutex<Vec<String>>,
    models: Mutex<Vec<String>>,
}

impl StubProvider {
    fn answering() -> Self {
        Self::failing(&[])
    }

    fn failing(models: &[&str]) -> Self {
        Self {
            failing: models.iter().map(ToString::to_string).collect(),
            prompts: Mutex::new(Vec::new()),
            models: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl AIProvider for StubProvider {
    fn name(&self) -> &str {
        "stub"
    }

    fn is_configured(&self) -> bool {
        true
    }

    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        _options: &GenerateOptions,
    ) -> Result<AIResponse, AiError> {
        self.models.lock().unwrap().push(model.to_string());
        if let Some(user) = messages.iter().find(|m| m.role == AIRole::User) {
            self.prompts.lock().unwrap().push(user.content.clone());
        }

        if self.failing.iter().any(|m| m == model) {
            return Err(AiError::Api {
                status: 404,
                message: format!("NOT_FOUND - models/{model} is not found"),
            });
        }

        Ok(AIResponse {
            text: "**כותרת:** מודל חדש\nתיאור קצר".to_string(),
            model: model.to_string(),
            usage: None,
        })
    }
}

/// Records sent emails, optionally failing every send.
#[derive(Default)]
struct RecordingMailer {
    fail: bool,
    sent: Mutex<Vec<(String, String, String)>>,
}

#[async_trait]
impl DigestMailer for RecordingMailer {
    async fn send(&self, subject: &str, html_body: &str, text_body: &str) -> Result<()> {
        if self.fail {
            anyhow::bail!("SMTP authentication failed");
        }
        self.sent.lock().unwrap().push((
            subject.to_string(),
            html_body.to_string(),
            text_body.to_string(),
        ));
        Ok(())
    }
}

// =============================================================================
// Fixtures
// =============================================================================

const FEED_A: &str = "https://a.example.com/feed";
const FEED_B: &str = "https://b.example.com/feed";
const FEED_C: &str = "https://c.example.com/feed";

fn now() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 6, 10, 6, 0, 0).unwrap()
}

fn rfc2822(t: DateTime<Utc>) -> String {
    t.to_rfc2822()
}

/// An RSS item; `pub_date` is inserted verbatim when present.
fn item(title: &str, link: &str, pub_date: Option<&str>) -> String {
    let date = pub_date
        .map(|d| format!("<pubDate>{d}</pubDate>"))
        .unwrap_or_default();
    format!(
        "<item><title>{title}</title><link>{link}</link><description>About {title}</description>{date}</item>"
    )
}

fn rss(title: &str, items: &[String]) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8"?>
<rss version="2.0"><channel><title>{title}</title><link>https://example.com</link><description>d</description>{}</channel></rss>"#,
        items.concat()
    )
}

fn hours_ago(h: i64) -> String {
    rfc2822(now() - Duration::hours(h))
}

fn feeds(urls: &[&str]) -> Vec<FeedSource> {
    urls.iter().map(|u| FeedSource::new(*u)).collect()
}

fn models(names: &[&str]) -> Vec<String> {
    names.iter().map(ToString::to_string).collect()
}

struct Harness {
    fetcher: Arc<StubFetcher>,
    provider: Arc<StubProvider>,
    mailer: Arc<RecordingMailer>,
    pipeline: Pipeline,
}

fn harness(
    fetcher: StubFetcher,
    provider: StubProvider,
    mailer: RecordingMailer,
    sources: &[&str],
    dry_run: bool,
) -> Harness {
    let fetcher = Arc::new(fetcher);
    let provider = Arc::new(provider);
    let mailer = Arc::new(mailer);

    let generator =
        DigestGenerator::new(provider.clone(), models(&["gemini-pro", "gemini-2.5-flash"]))
            .unwrap();
    let config = PipelineConfig {
        dry_run,
        ..PipelineConfig::default()
    };
    let pipeline = Pipeline::new(
        config,
        fetcher.clone(),
        feeds(sources),
        generator,
        mailer.clone(),
    );

    Harness {
        fetcher,
        provider,
        mailer,
        pipeline,
    }
}

// =============================================================================
// Collection
// =============================================================================

#[tokio::test]
async fn test_first_feed_wins_duplicate_links() {
    let fetcher = StubFetcher::default()
        .with_body(
            FEED_A,
            rss(
                "Feed A",
                &[item("Shared from A", "https://x.com/shared", Some(&hours_ago(5)))],
            ),
        )
        .with_body(
            FEED_B,
            rss(
                "Feed B",
                &[
                    item("Shared from B", "https://x.com/shared", Some(&hours_ago(1))),
                    item("Only in B", "https://x.com/b-only", Some(&hours_ago(2))),
                ],
            ),
        );

    let collector = Collector::new(Arc::new(fetcher), feeds(&[FEED_A, FEED_B]));
    let collection = collector.collect(now()).await;

    assert_eq!(collection.entries.len(), 2);
    assert_eq!(collection.stats.duplicates, 1);

    let shared = collection
        .entries
        .iter()
        .find(|e| e.link == "https://x.com/shared")
        .unwrap();
    assert_eq!(shared.source, "Feed A");
    assert_eq!(shared.title, "Shared from A");
}

#[tokio::test]
async fn test_blocked_feed_does_not_stop_collection() {
    let fetcher = StubFetcher::default()
        .with_error(FEED_A, FetchError::Status { status: 403 })
        .with_body(
            FEED_B,
            rss("Feed B", &[item("News", "https://x.com/news", Some(&hours_ago(3)))]),
        )
        .with_body(FEED_C, "<html>not a feed</html>".to_string());

    let collector = Collector::new(Arc::new(fetcher), feeds(&[FEED_A, FEED_B, FEED_C]));
    let collection = collector.collect(now()).await;

    assert_eq!(collection.stats.feeds_attempted, 3);
    assert_eq!(collection.stats.feeds_failed, 2);
    assert_eq!(collection.errors.len(), 2);
    assert!(collection.errors[0].contains("HTTP error 403"));
    assert_eq!(collection.entries.len(), 1);
    assert_eq!(collection.entries[0].source, "Feed B");
}

#[tokio::test]
async fn test_filters_undated_and_out_of_window_entries() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss(
            "Feed A",
            &[
                item("Fresh", "https://x.com/fresh", Some(&hours_ago(2))),
                item("Stale", "https://x.com/stale", Some(&hours_ago(30))),
                item("Garbled", "https://x.com/garbled", Some("sometime last week")),
                item("Undated", "https://x.com/undated", None),
                item("Future", "https://x.com/future", Some(&hours_ago(-2))),
            ],
        ),
    );

    let collector = Collector::new(Arc::new(fetcher), feeds(&[FEED_A]));
    let collection = collector.collect(now()).await;

    let links: Vec<_> = collection.entries.iter().map(|e| e.link.as_str()).collect();
    assert_eq!(links, ["https://x.com/fresh"]);
    assert_eq!(collection.stats.entries_seen, 5);
    assert_eq!(collection.stats.undated, 2);
    assert_eq!(collection.stats.outside_window, 2);
}

#[tokio::test]
async fn test_unknown_zone_name_is_accepted_as_utc() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss(
            "Feed A",
            &[item(
                "Summer time",
                "https://x.com/cest",
                Some("Tue, 10 Jun 2025 04:00:00 CEST"),
            )],
        ),
    );

    let collection = Collector::new(Arc::new(fetcher), feeds(&[FEED_A]))
        .collect(now())
        .await;

    assert_eq!(collection.stats.undated, 0);
    assert_eq!(collection.entries.len(), 1);
    assert_eq!(
        collection.entries[0].published,
        Utc.with_ymd_and_hms(2025, 6, 10, 4, 0, 0).unwrap()
    );
}

#[tokio::test]
async fn test_window_boundary_is_inclusive() {
    let boundary = rfc2822(now() - Duration::hours(24));
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("Edge", "https://x.com/edge", Some(&boundary))]),
    );

    let collection = Collector::new(Arc::new(fetcher), feeds(&[FEED_A]))
        .collect(now())
        .await;

    assert_eq!(collection.entries.len(), 1);
}

#[tokio::test]
async fn test_aggregate_is_newest_first_across_feeds() {
    let fetcher = StubFetcher::default()
        .with_body(
            FEED_A,
            rss(
                "Feed A",
                &[
                    item("Oldest", "https://x.com/oldest", Some(&hours_ago(10))),
                    item("Newest", "https://x.com/newest", Some(&hours_ago(1))),
                ],
            ),
        )
        .with_body(
            FEED_B,
            rss("Feed B", &[item("Middle", "https://x.com/middle", Some(&hours_ago(4)))]),
        );

    let collection = Collector::new(Arc::new(fetcher), feeds(&[FEED_A, FEED_B]))
        .collect(now())
        .await;

    let newest = collection.text.find("https://x.com/newest").unwrap();
    let middle = collection.text.find("https://x.com/middle").unwrap();
    let oldest = collection.text.find("https://x.com/oldest").unwrap();
    assert!(newest < middle && middle < oldest);
    assert!(collection
        .text
        .starts_with("Source: Feed A\nPublished Time: 2025-06-10 05:00:00 UTC\nTitle: Newest\n"));
}

// =============================================================================
// Full runs
// =============================================================================

#[tokio::test]
async fn test_run_sends_rtl_digest() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("Release", "https://x.com/release", Some(&hours_ago(1)))]),
    );
    let h = harness(
        fetcher,
        StubProvider::answering(),
        RecordingMailer::default(),
        &[FEED_A],
        false,
    );

    let summary = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Sent);
    assert_eq!(summary.model.as_deref(), Some("gemini-pro"));
    assert_eq!(summary.stats.accepted, 1);

    let prompts = h.provider.prompts.lock().unwrap();
    assert_eq!(prompts.len(), 1);
    assert!(prompts[0].contains("Link: https://x.com/release"));
    assert!(prompts[0].contains("HEBREW"));

    let sent = h.mailer.sent.lock().unwrap();
    assert_eq!(sent.len(), 1);
    let (subject, html, text) = &sent[0];
    assert_eq!(subject, "Daily AI Dev Update 🤖 - 10/06/2025");
    assert!(html.contains(r#"dir="rtl""#));
    assert!(html.contains("<b>כותרת:</b> מודל חדש<br>תיאור קצר"));
    assert!(text.starts_with(GREETING));
}

#[tokio::test]
async fn test_no_news_skips_model_and_email() {
    let fetcher = StubFetcher::default()
        .with_body(
            FEED_A,
            rss("Feed A", &[item("Old", "https://x.com/old", Some(&hours_ago(48)))]),
        )
        .with_error(FEED_B, FetchError::Status { status: 403 });
    let h = harness(
        fetcher,
        StubProvider::answering(),
        RecordingMailer::default(),
        &[FEED_A, FEED_B],
        false,
    );

    let summary = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::NoNews);
    assert_eq!(summary.model, None);
    assert!(h.provider.models.lock().unwrap().is_empty());
    assert!(h.mailer.sent.lock().unwrap().is_empty());
    assert_eq!(*h.fetcher.requested.lock().unwrap(), vec![FEED_A, FEED_B]);
}

#[tokio::test]
async fn test_falls_back_to_next_model() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("News", "https://x.com/news", Some(&hours_ago(1)))]),
    );
    let h = harness(
        fetcher,
        StubProvider::failing(&["gemini-pro"]),
        RecordingMailer::default(),
        &[FEED_A],
        false,
    );

    let summary = h.pipeline.run_at(now()).await.unwrap();

    assert_eq!(summary.outcome, RunOutcome::Sent);
    assert_eq!(summary.model.as_deref(), Some("gemini-2.5-flash"));
    assert_eq!(
        *h.provider.models.lock().unwrap(),
        vec!["gemini-pro", "gemini-2.5-flash"]
    );
}

#[tokio::test]
async fn test_all_models_failing_fails_the_run() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("News", "https://x.com/news", Some(&hours_ago(1)))]),
    );
    let h = harness(
        fetcher,
        StubProvider::failing(&["gemini-pro", "gemini-2.5-flash"]),
        RecordingMailer::default(),
        &[FEED_A],
        false,
    );

    let result = h.pipeline.run_at(now()).await;

    match result {
        Err(DigestError::AllModelsFailed { attempts }) => assert_eq!(attempts.len(), 2),
        other => panic!("expected AllModelsFailed, got {other:?}"),
    }
    assert!(h.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_dry_run_renders_without_sending() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("News", "https://x.com/news", Some(&hours_ago(1)))]),
    );
    let h = harness(
        fetcher,
        StubProvider::answering(),
        RecordingMailer::default(),
        &[FEED_A],
        true,
    );

    let summary = h.pipeline.run_at(now()).await.unwrap();

    match summary.outcome {
        RunOutcome::DryRun { subject, html } => {
            assert_eq!(subject, "Daily AI Dev Update 🤖 - 10/06/2025");
            assert!(html.contains(GREETING));
        }
        other => panic!("expected DryRun, got {other:?}"),
    }
    assert!(h.mailer.sent.lock().unwrap().is_empty());
}

#[tokio::test]
async fn test_delivery_failure_is_reported_not_raised() {
    let fetcher = StubFetcher::default().with_body(
        FEED_A,
        rss("Feed A", &[item("News", "https://x.com/news", Some(&hours_ago(1)))]),
    );
    let mailer = RecordingMailer {
        fail: true,
        ..RecordingMailer::default()
    };
    let h = harness(fetcher, StubProvider::answering(), mailer, &[FEED_A], false);

    let summary = h.pipeline.run_at(now()).await.unwrap();

    match summary.outcome {
        RunOutcome::DeliveryFailed(reason) => assert!(reason.contains("SMTP authentication")),
        other => panic!("expected DeliveryFailed, got {other:?}"),
    }
    assert_eq!(summary.model.as_deref(), Some("gemini-pro"));
}
