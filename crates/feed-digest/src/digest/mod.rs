//! Digest generation and delivery.
//!
//! - Hebrew digest prompt rendered with Handlebars
//! - Ordered model fallback: first model to answer wins
//! - Right-to-left HTML email with a plain-text alternative

mod email;
mod generator;
mod prompt;
mod template;

pub use email::{DigestMailer, EmailSender};
pub use generator::{Digest, DigestGenerator};
pub use prompt::{PromptManager, SYSTEM_PROMPT};
pub use template::{markdown_to_html, EmailTemplate, FOOTER, GREETING, SUBJECT_LABEL};
