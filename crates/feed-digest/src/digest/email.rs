//! Email sender using SMTP with STARTTLS.

use anyhow::{Context, Result};
use async_trait::async_trait;
use lettre::message::{header::ContentType, Mailbox, MultiPart, SinglePart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};

use crate::config::MailConfig;

/// Delivers a rendered digest.
#[async_trait]
pub trait DigestMailer: Send + Sync {
    async fn send(&self, subject: &str, html_body: &str, text_body: &str) -> Result<()>;
}

/// SMTP sender for digest emails.
pub struct EmailSender {
    config: MailConfig,
}

impl EmailSender {
    /// Create a new email sender with the given configuration.
    #[must_use]
    pub const fn new(config: MailConfig) -> Self {
        Self { config }
    }

    /// Build the multipart message without sending it.
    pub fn build_message(&self, subject: &str, html_body: &str, text_body: &str) -> Result<Message> {
        let from: Mailbox = self
            .config
            .sender
            .parse()
            .context("Invalid sender email address")?;

        let to: Mailbox = self
            .config
            .receiver
            .parse()
            .context("Invalid recipient email address")?;

        Message::builder()
            .from(from)
            .to(to)
            .subject(subject)
            .multipart(
                MultiPart::alternative()
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_PLAIN)
                            .body(text_body.to_string()),
                    )
                    .singlepart(
                        SinglePart::builder()
                            .header(ContentType::TEXT_HTML)
                            .body(html_body.to_string()),
                    ),
            )
            .context("Failed to build email message")
    }

    /// Send a simple test email to verify configuration.
    pub async fn send_test(&self) -> Result<()> {
        let subject = "Daily AI Dev Update - Test Email";
        let html_body = r#"<!DOCTYPE html>
<html>
<body style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; padding: 20px;">
    <h2 style="color: #2c3e50;">Daily AI Dev Update</h2>
    <p>Email configuration is working.</p>
</body>
</html>
"#;
        let text_body = "Daily AI Dev Update - Test Email\n\nEmail configuration is working.\n";

        self.send(subject, html_body, text_body).await
    }
}

#[async_trait]
impl DigestMailer for EmailSender {
    async fn send(&self, subject: &str, html_body: &str, text_body: &str) -> Result<()> {
        let email = self.build_message(subject, html_body, text_body)?;

        let creds = Credentials::new(self.config.sender.clone(), self.config.password.clone());

        let mailer: AsyncSmtpTransport<Tokio1Executor> =
            AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&self.config.smtp_host)
                .context("Failed to create SMTP transport")?
                .port(self.config.smtp_port)
                .credentials(creds)
                .build();

        mailer
            .send(email)
            .await
            .context("Failed to send email via SMTP")?;

        tracing::info!(
            to = %self.config.receiver,
            subject = subject,
            "Email sent successfully"
        );

        Ok(())
    }
}
