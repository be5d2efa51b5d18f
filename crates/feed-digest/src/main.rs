//! feed-digest CLI - daily AI news digest by email.

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use feed_digest::ai::GeminiProvider;
use feed_digest::config::{AppConfig, DEFAULT_FEED_TIMEOUT_SECS, DEFAULT_WINDOW_HOURS};
use feed_digest::digest::{DigestGenerator, EmailSender};
use feed_digest::feeds::{FeedSource, HttpFeedFetcher};
use feed_digest::pipeline::{Collector, Pipeline, PipelineConfig, RunOutcome, RunSummary};

/// feed-digest - Summarize the last day of AI news and email it.
#[derive(Parser)]
#[command(name = "feed-digest")]
#[command(about = "Daily AI news digest from RSS/Atom feeds")]
#[command(version)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Log output format
    #[arg(long, global = true, value_enum, default_value = "text")]
    log_format: LogFormat,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, ValueEnum)]
enum LogFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Fetch, summarize and email the digest (for scheduled use)
    Run {
        /// Render the email and print it instead of sending
        #[arg(long)]
        dry_run: bool,

        /// Feed URL to use instead of the built-in list (repeatable)
        #[arg(long = "feed")]
        feeds: Vec<String>,
    },

    /// Fetch feeds and print the aggregate without calling the model
    Fetch {
        /// Feed URL to use instead of the built-in list (repeatable)
        #[arg(long = "feed")]
        feeds: Vec<String>,

        /// Per-feed request timeout in seconds
        #[arg(long, default_value_t = DEFAULT_FEED_TIMEOUT_SECS)]
        timeout: u64,

        /// Look-back window in hours
        #[arg(long, default_value_t = DEFAULT_WINDOW_HOURS)]
        hours: i64,
    },

    /// List the built-in feeds
    Feeds,

    /// Send a test email to verify SMTP settings
    TestEmail,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let filter = if cli.verbose {
        EnvFilter::new("feed_digest=debug,info")
    } else {
        EnvFilter::try_from_default_env()
            .unwrap_or_else(|_| EnvFilter::new("feed_digest=info,warn"))
    };

    let fmt_layer = match cli.log_format {
        LogFormat::Text => fmt::layer().boxed(),
        LogFormat::Json => fmt::layer().json().boxed(),
    };

    tracing_subscriber::registry()
        .with(fmt_layer)
        .with(filter)
        .init();

    match cli.command {
        Commands::Run { dry_run, feeds } => {
            tracing::info!(dry_run, custom_feeds = feeds.len(), "Starting digest run");
            run_digest(dry_run, feeds).await
        }
        Commands::Fetch {
            feeds,
            timeout,
            hours,
        } => run_fetch(feeds, timeout, hours).await,
        Commands::Feeds => {
            run_feeds();
            Ok(())
        }
        Commands::TestEmail => run_test_email().await,
    }
}

fn select_feeds(urls: Vec<String>) -> Vec<FeedSource> {
    if urls.is_empty() {
        FeedSource::defaults()
    } else {
        urls.into_iter().map(FeedSource::new).collect()
    }
}

async fn run_digest(dry_run: bool, feeds: Vec<String>) -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;
    tracing::debug!(models = ?config.models, "Loaded configuration from environment");

    let fetcher = HttpFeedFetcher::new(config.feed_timeout)?;
    let provider = GeminiProvider::new(config.gemini_api_key.clone());
    let generator = DigestGenerator::new(Arc::new(provider), config.models.clone())?;
    let mailer = EmailSender::new(config.mail.clone());

    let pipeline_config = PipelineConfig {
        window: chrono::Duration::hours(config.window_hours),
        dry_run,
    };

    let pipeline = Pipeline::new(
        pipeline_config,
        Arc::new(fetcher),
        select_feeds(feeds),
        generator,
        Arc::new(mailer),
    );
    let summary = pipeline.run().await?;

    print_summary(&summary);
    Ok(())
}

fn print_summary(summary: &RunSummary) {
    let stats = &summary.stats;

    println!("\n📊 Digest Run Summary");
    println!(
        "   Feeds: {} ({} failed)",
        stats.feeds_attempted, stats.feeds_failed
    );
    println!("   Entries seen: {}", stats.entries_seen);
    println!("   Accepted: {}", stats.accepted);
    println!("   Duplicates: {}", stats.duplicates);
    println!(
        "   Skipped: {} undated, {} without link, {} outside window",
        stats.undated, stats.no_link, stats.outside_window
    );
    if let Some(model) = &summary.model {
        println!("   Model: {model}");
    }

    if !summary.errors.is_empty() {
        println!("   Errors: {}", summary.errors.len());
        for err in &summary.errors {
            eprintln!("     - {err}");
        }
    }

    match &summary.outcome {
        RunOutcome::Sent => println!("\n✅ Digest email sent"),
        RunOutcome::NoNews => println!("\n📭 No news found in the window"),
        RunOutcome::DryRun { subject, html } => {
            println!("\n📝 Dry run - email not sent");
            println!("Subject: {subject}\n");
            println!("{html}");
        }
        RunOutcome::DeliveryFailed(reason) => {
            eprintln!("\n❌ Failed to send email: {reason}");
        }
    }
}

async fn run_fetch(feeds: Vec<String>, timeout: u64, hours: i64) -> Result<()> {
    anyhow::ensure!(hours > 0, "--hours must be positive");

    let fetcher = HttpFeedFetcher::new(Duration::from_secs(timeout))?;
    let collector = Collector::new(Arc::new(fetcher), select_feeds(feeds))
        .with_window(chrono::Duration::hours(hours));

    let collection = collector.collect(chrono::Utc::now()).await;

    if collection.is_empty() {
        println!("📭 No entries in the last {hours} hours.");
    } else {
        print!("{}", collection.text);
        println!("Total: {} entries", collection.entries.len());
    }

    for err in &collection.errors {
        eprintln!("  - {err}");
    }

    Ok(())
}

fn run_feeds() {
    println!("📋 Built-in feeds\n");
    for (i, source) in FeedSource::defaults().iter().enumerate() {
        println!("{:>3}. {}", i + 1, source.url);
    }
}

async fn run_test_email() -> Result<()> {
    let config = AppConfig::from_env().context("Failed to load configuration")?;

    println!("📧 Sending test email to {}...", config.mail.receiver);
    EmailSender::new(config.mail).send_test().await?;
    println!("✅ Test email sent");

    Ok(())
}
