//! Daily AI news digest.
//!
//! This crate provides:
//! - RSS/Atom feed fetching with a browser-like client
//! - Permissive publish-time resolution and a 24-hour window filter
//! - Link-based deduplication and newest-first aggregation
//! - Hebrew digest generation with Gemini and ordered model fallback
//! - Right-to-left HTML email delivery over SMTP

pub mod ai;
pub mod collect;
pub mod config;
pub mod digest;
pub mod error;
pub mod feeds;
pub mod pipeline;

// Re-export main types
pub use collect::{Entry, RunState, TimeWindow};
pub use config::{AppConfig, MailConfig};
pub use digest::{Digest, DigestGenerator, DigestMailer, EmailSender, EmailTemplate};
pub use error::{ConfigError, DigestError, FetchError, ParseError};
pub use feeds::{FeedSource, FetchFeed, HttpFeedFetcher};
pub use pipeline::{Collection, Collector, Pipeline, PipelineConfig, RunOutcome, RunSummary};
