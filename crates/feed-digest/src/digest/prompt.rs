//! Digest prompt templates.

use handlebars::Handlebars;
use serde::Serialize;

use crate::error::DigestError;

const DIGEST_TEMPLATE_NAME: &str = "digest";

/// Renders the fixed digest instruction around the aggregated news.
pub struct PromptManager {
    handlebars: Handlebars<'static>,
}

#[derive(Serialize)]
struct DigestPromptData<'a> {
    news_text: &'a str,
}

impl PromptManager {
    /// Create a prompt manager with the embedded digest template.
    pub fn new() -> Result<Self, DigestError> {
        let mut handlebars = Handlebars::new();
        handlebars.set_strict_mode(true);
        handlebars
            .register_template_string(DIGEST_TEMPLATE_NAME, DIGEST_TEMPLATE)
            .map_err(|e| DigestError::Prompt(e.to_string()))?;
        Ok(Self { handlebars })
    }

    /// Render the user prompt for `news_text`.
    pub fn render_digest(&self, news_text: &str) -> Result<String, DigestError> {
        self.handlebars
            .render(DIGEST_TEMPLATE_NAME, &DigestPromptData { news_text })
            .map_err(|e| DigestError::Prompt(e.to_string()))
    }
}

/// System role for the curator model.
pub const SYSTEM_PROMPT: &str = "You are an expert AI Engineering Curator. You write concise, accurate daily digests for software engineers and AI developers. You never invent links or facts that are not present in the provided data.";

/// Digest instruction. `news_text` is inserted unescaped.
const DIGEST_TEMPLATE: &str = r#"I will provide you with a raw list of news articles (already deduplicated by URL).

Your task is to create the body of a daily digest email in HEBREW (עברית) specifically tailored for **Software Engineers and AI Developers**.

Instructions:
1. **Target Audience:** Content must be relevant to developers. Focus on open-source libraries, new models (LLMs), APIs, developer tools, and performance improvements.
2. **Strict "BIG NEWS" Filtering:**
   - **EXCLUDE:** General tech news, crypto, business/stock news, purely theoretical research papers (unless it's a major breakthrough), minor bug fixes, small version increments (v1.1 to v1.2), funding news, pure speculation/opinion pieces.
   - **INCLUDE:** GitHub repos, Hugging Face releases, new SOTA models that can be used/tested, critical security vulnerabilities, major flaws in popular tools, or "breaking changes" and major updates to frameworks (PyTorch, TensorFlow, LangChain).
3. **Structure:** Unified list of updates.
4. **Format per item:**
   - **Headline:** The name of the innovation.
   - **Date:** The date of publication (YYYY-MM-DD). Include the time of publication in Israel time (HH:MM:SS).
   - **Description:** 2-3 sentences explaining what is new and why it matters.
   - **Details:** License (Open Source/Commercial), Price (Is it free?), Where to try (Link).
   - **Source Link:** Original link.
5. **IMPORTANT:** Do NOT include an opening sentence (like "Here is the summary"). Do NOT include a closing sentence. Start directly with the first news item. Include ALL relevant entries from the provided list. Do not summarize or combine entries unless they are truly about the exact same story.
6. **Tone:** Friendly, professional, concise, engaging, easy to read.

Here is the raw data (all unique entries):
{{{news_text}}}
"#;
