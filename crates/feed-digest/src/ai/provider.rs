//! Provider abstraction for hosted language models.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::AiError;

/// Message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AIRole {
    System,
    User,
    Assistant,
}

/// One chat message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AIMessage {
    pub role: AIRole,
    pub content: String,
}

impl AIMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: AIRole::System,
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: AIRole::User,
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: AIRole::Assistant,
            content: content.into(),
        }
    }
}

/// Sampling options passed through to the provider.
#[derive(Debug, Clone, Default)]
pub struct GenerateOptions {
    pub temperature: Option<f32>,
    pub max_tokens: Option<u32>,
}

/// Token accounting, when the provider reports it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct TokenUsage {
    pub input_tokens: u32,
    pub output_tokens: u32,
}

/// Text returned by a provider.
#[derive(Debug, Clone)]
pub struct AIResponse {
    pub text: String,
    /// Model that produced the text, as reported by the provider.
    pub model: String,
    pub usage: Option<TokenUsage>,
}

/// A hosted text-in/text-out model service.
#[async_trait]
pub trait AIProvider: Send + Sync {
    /// Provider name, for logs.
    fn name(&self) -> &str;

    /// Whether credentials are present.
    fn is_configured(&self) -> bool;

    /// Generate text with `model`.
    async fn generate_text(
        &self,
        model: &str,
        messages: &[AIMessage],
        options: &GenerateOptions,
    ) -> Result<AIResponse, AiError>;
}
