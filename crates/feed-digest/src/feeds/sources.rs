//! The static list of feeds polled on every run.

/// Placeholder name for feeds that carry no title.
pub const UNKNOWN_SOURCE: &str = "Unknown Source";

/// Feeds in polling order. Order matters: when two feeds carry the same
/// link, the entry from the earlier feed wins.
pub const DEFAULT_FEEDS: &[&str] = &[
    // AI-filtered tech news
    "https://techcrunch.com/category/artificial-intelligence/feed/",
    "https://www.theverge.com/rss/artificial-intelligence/index.xml",
    // Major AI labs
    "https://openai.com/blog/rss.xml",
    "https://www.anthropic.com/atom.xml",
    "https://blog.google/technology/ai/rss/",
    "https://ai.meta.com/rss",
    "https://aws.amazon.com/blogs/machine-learning/feed/",
    // Developer libraries and tools
    "https://huggingface.co/blog/feed.xml",
    "https://blog.langchain.dev/rss/",
    // Research
    "http://export.arxiv.org/rss/cs.CL",
];

/// A configured feed URL.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FeedSource {
    pub url: String,
}

impl FeedSource {
    #[must_use]
    pub fn new(url: impl Into<String>) -> Self {
        Self { url: url.into() }
    }

    /// The built-in feed list.
    #[must_use]
    pub fn defaults() -> Vec<Self> {
        DEFAULT_FEEDS.iter().map(|url| Self::new(*url)).collect()
    }
}
