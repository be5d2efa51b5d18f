//! Language model integration.

pub mod gemini;
pub mod provider;

pub use gemini::GeminiProvider;
pub use provider::{AIMessage, AIProvider, AIResponse, AIRole, GenerateOptions, TokenUsage};
