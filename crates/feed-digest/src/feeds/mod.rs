//! Feed retrieval and parsing.

mod fetcher;
mod parser;
mod sources;
pub mod time;

pub use fetcher::{FetchFeed, HttpFeedFetcher, BROWSER_USER_AGENT, FEED_ACCEPT};
pub use parser::{parse_feed, ParsedFeed, RawEntry};
pub use sources::{FeedSource, DEFAULT_FEEDS, UNKNOWN_SOURCE};
