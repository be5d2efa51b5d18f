//! Error types for the digest pipeline.

use thiserror::Error;

/// Failure to retrieve a single feed.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum FetchError {
    /// The server answered with a non-2xx status.
    #[error("HTTP error {status}")]
    Status { status: u16 },

    /// Timeout, DNS, refused connection or an unreadable body.
    #[error("transport error: {0}")]
    Transport(String),
}

impl FetchError {
    /// Numeric HTTP status, if the failure was a status error.
    #[must_use]
    pub const fn status(&self) -> Option<u16> {
        match self {
            Self::Status { status } => Some(*status),
            Self::Transport(_) => None,
        }
    }
}

impl From<reqwest::Error> for FetchError {
    fn from(err: reqwest::Error) -> Self {
        if let Some(status) = err.status() {
            return Self::Status {
                status: status.as_u16(),
            };
        }
        Self::Transport(err.to_string())
    }
}

/// A feed body that could not be parsed as RSS, Atom or JSON Feed.
#[derive(Debug, Error)]
#[error("failed to parse feed: {0}")]
pub struct ParseError(#[from] pub feed_rs::parser::ParseFeedError);

/// Errors from a language model provider.
#[derive(Debug, Clone, Error)]
pub enum AiError {
    #[error("AI request failed: {0}")]
    Request(String),

    #[error("AI API error ({status}): {message}")]
    Api { status: u16, message: String },

    #[error("AI response parse error: {0}")]
    ResponseParse(String),

    #[error("AI response contained no text")]
    EmptyResponse,

    #[error("AI provider not configured: {0}")]
    NotConfigured(String),
}

/// One failed model attempt inside the fallback chain.
#[derive(Debug, Clone)]
pub struct ModelAttempt {
    pub model: String,
    pub error: AiError,
}

/// Errors from digest generation.
#[derive(Debug, Clone, Error)]
pub enum DigestError {
    #[error("no models configured for digest generation")]
    NoModels,

    #[error("prompt rendering failed: {0}")]
    Prompt(String),

    #[error("all {} models failed: {}", .attempts.len(), summarize_attempts(.attempts))]
    AllModelsFailed { attempts: Vec<ModelAttempt> },
}

fn summarize_attempts(attempts: &[ModelAttempt]) -> String {
    attempts
        .iter()
        .map(|a| format!("{} ({})", a.model, a.error))
        .collect::<Vec<_>>()
        .join("; ")
}

/// Configuration problems detected at startup.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{0} environment variable not set")]
    MissingVar(&'static str),

    #[error("invalid value for {key}: {reason}")]
    InvalidValue { key: &'static str, reason: String },
}
