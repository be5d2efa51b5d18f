//! Digest generation with ordered model fallback.

use std::sync::Arc;

use crate::ai::{AIMessage, AIProvider, GenerateOptions};
use crate::error::{DigestError, ModelAttempt};

use super::prompt::{PromptManager, SYSTEM_PROMPT};

/// A generated digest and the model that produced it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Digest {
    pub text: String,
    pub model: String,
}

/// Turns aggregated news into digest text.
///
/// Models are tried in order and the first success wins. Quota errors,
/// unknown models, transport failures and empty answers all move on to the
/// next model; the run fails only once every model has failed.
pub struct DigestGenerator {
    provider: Arc<dyn AIProvider>,
    models: Vec<String>,
    prompts: PromptManager,
    options: GenerateOptions,
}

impl DigestGenerator {
    pub fn new(provider: Arc<dyn AIProvider>, models: Vec<String>) -> Result<Self, DigestError> {
        if models.is_empty() {
            return Err(DigestError::NoModels);
        }
        Ok(Self {
            provider,
            models,
            prompts: PromptManager::new()?,
            options: GenerateOptions {
                temperature: Some(0.4),
                max_tokens: None,
            },
        })
    }

    /// Generate a digest for `news_text`.
    pub async fn generate(&self, news_text: &str) -> Result<Digest, DigestError> {
        let prompt = self.prompts.render_digest(news_text)?;
        let messages = vec![AIMessage::system(SYSTEM_PROMPT), AIMessage::user(prompt)];

        let mut attempts = Vec::new();
        for model in &self.models {
            tracing::info!(provider = self.provider.name(), model = %model, "Trying model");

            match self
                .provider
                .generate_text(model, &messages, &self.options)
                .await
            {
                Ok(response) => {
                    tracing::info!(
                        model = %model,
                        reported_model = %response.model,
                        output_tokens = response.usage.map(|u| u.output_tokens),
                        "Digest generated"
                    );
                    return Ok(Digest {
                        text: response.text,
                        model: model.clone(),
                    });
                }
                Err(error) => {
                    tracing::warn!(model = %model, error = %error, "Model failed");
                    attempts.push(ModelAttempt {
                        model: model.clone(),
                        error,
                    });
                }
            }
        }

        Err(DigestError::AllModelsFailed { attempts })
    }
}
