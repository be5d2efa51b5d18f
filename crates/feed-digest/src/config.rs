//! Runtime configuration loaded from the environment.

use std::time::Duration;

use crate::error::ConfigError;

/// Default Gmail SMTP host.
pub const DEFAULT_SMTP_HOST: &str = "smtp.gmail.com";

/// Default Gmail SMTP port (STARTTLS).
pub const DEFAULT_SMTP_PORT: u16 = 587;

/// Default per-feed request timeout.
pub const DEFAULT_FEED_TIMEOUT_SECS: u64 = 10;

/// Default look-back window for entries.
pub const DEFAULT_WINDOW_HOURS: i64 = 24;

/// Models tried in order until one produces a digest.
pub const DEFAULT_MODELS: &[&str] = &[
    "gemini-pro",
    "gemini-1.5-pro",
    "gemini-2.0-flash",
    "gemini-2.5-flash",
];

const ENV_GEMINI_API_KEY: &str = "GEMINI_API_KEY";
const ENV_EMAIL_SENDER: &str = "EMAIL_SENDER";
const ENV_EMAIL_PASSWORD: &str = "EMAIL_PASSWORD";
const ENV_EMAIL_RECEIVER: &str = "EMAIL_RECEIVER";
const ENV_DIGEST_MODELS: &str = "DIGEST_MODELS";
const ENV_SMTP_HOST: &str = "SMTP_HOST";
const ENV_SMTP_PORT: &str = "SMTP_PORT";
const ENV_FEED_TIMEOUT_SECS: &str = "FEED_TIMEOUT_SECS";
const ENV_WINDOW_HOURS: &str = "DIGEST_WINDOW_HOURS";

/// SMTP account used to send the digest.
#[derive(Debug, Clone)]
pub struct MailConfig {
    /// SMTP server hostname.
    pub smtp_host: String,
    /// SMTP server port.
    pub smtp_port: u16,
    /// Sender address, also the SMTP username.
    pub sender: String,
    /// SMTP password (Gmail app password).
    pub password: String,
    /// Recipient address.
    pub receiver: String,
}

/// Full application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Gemini API key.
    pub gemini_api_key: String,
    /// Model identifiers, in fallback order.
    pub models: Vec<String>,
    /// Mail account and recipient.
    pub mail: MailConfig,
    /// Per-feed request timeout.
    pub feed_timeout: Duration,
    /// Look-back window in hours.
    pub window_hours: i64,
}

impl AppConfig {
    /// Create configuration from environment variables.
    ///
    /// # Required Environment Variables
    /// - `GEMINI_API_KEY`
    /// - `EMAIL_SENDER`
    /// - `EMAIL_PASSWORD`
    /// - `EMAIL_RECEIVER`
    ///
    /// # Optional Environment Variables
    /// - `DIGEST_MODELS`: comma-separated model list
    /// - `SMTP_HOST` / `SMTP_PORT`: default smtp.gmail.com:587
    /// - `FEED_TIMEOUT_SECS`: default 10
    /// - `DIGEST_WINDOW_HOURS`: default 24
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary key lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &'static str| {
            lookup(key)
                .filter(|v| !v.trim().is_empty())
                .ok_or(ConfigError::MissingVar(key))
        };

        let gemini_api_key = required(ENV_GEMINI_API_KEY)?;
        let sender = required(ENV_EMAIL_SENDER)?;
        let password = required(ENV_EMAIL_PASSWORD)?;
        let receiver = required(ENV_EMAIL_RECEIVER)?;

        let models = match lookup(ENV_DIGEST_MODELS) {
            Some(raw) => parse_model_list(&raw)?,
            None => DEFAULT_MODELS.iter().map(ToString::to_string).collect(),
        };

        let smtp_host = lookup(ENV_SMTP_HOST)
            .map(|v| v.trim().to_string())
            .filter(|v| !v.is_empty())
            .unwrap_or_else(|| DEFAULT_SMTP_HOST.to_string());
        let smtp_port = parse_optional(&lookup, ENV_SMTP_PORT)?.unwrap_or(DEFAULT_SMTP_PORT);
        let timeout_secs = parse_optional::<u64, _>(&lookup, ENV_FEED_TIMEOUT_SECS)?
            .unwrap_or(DEFAULT_FEED_TIMEOUT_SECS);
        let window_hours =
            parse_optional(&lookup, ENV_WINDOW_HOURS)?.unwrap_or(DEFAULT_WINDOW_HOURS);

        if window_hours <= 0 {
            return Err(ConfigError::InvalidValue {
                key: ENV_WINDOW_HOURS,
                reason: "must be positive".to_string(),
            });
        }

        Ok(Self {
            gemini_api_key,
            models,
            mail: MailConfig {
                smtp_host,
                smtp_port,
                sender,
                password,
                receiver,
            },
            feed_timeout: Duration::from_secs(timeout_secs),
            window_hours,
        })
    }
}

fn parse_model_list(raw: &str) -> Result<Vec<String>, ConfigError> {
    let models: Vec<String> = raw
        .split(',')
        .map(str::trim)
        .filter(|m| !m.is_empty())
        .map(ToString::to_string)
        .collect();

    if models.is_empty() {
        return Err(ConfigError::InvalidValue {
            key: ENV_DIGEST_MODELS,
            reason: "no model identifiers given".to_string(),
        });
    }
    Ok(models)
}

fn parse_optional<T, F>(lookup: &F, key: &'static str) -> Result<Option<T>, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
    F: Fn(&str) -> Option<String>,
{
    lookup(key)
        .map(|raw| {
            raw.trim()
                .parse::<T>()
                .map_err(|e| ConfigError::InvalidValue {
                    key,
                    reason: e.to_string(),
                })
        })
        .transpose()
}
