//! Email rendering for the digest.

use chrono::{DateTime, Utc};

/// Greeting shown at the top of every digest.
pub const GREETING: &str = "בוקר טוב! להלן העדכונים החמים מ24 השעות האחרונות ☕";

/// Footer shown at the bottom of every digest.
pub const FOOTER: &str = "נשלח אוטומטית על ידי סוכן ה-AI האישי שלך";

/// Fixed subject label; the date is appended.
pub const SUBJECT_LABEL: &str = "Daily AI Dev Update 🤖";

/// Builds the digest email subject and bodies.
pub struct EmailTemplate;

impl EmailTemplate {
    /// `Daily AI Dev Update 🤖 - DD/MM/YYYY`.
    #[must_use]
    pub fn subject(date: DateTime<Utc>) -> String {
        format!("{SUBJECT_LABEL} - {}", date.format("%d/%m/%Y"))
    }

    /// Right-to-left HTML body.
    #[must_use]
    pub fn render_html(digest: &str) -> String {
        format!(
            r#"<!DOCTYPE html>
<html lang="he" dir="rtl">
<head>
    <meta charset="utf-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
</head>
<body>
    <div dir="rtl" style="font-family: 'Segoe UI', Tahoma, Geneva, Verdana, sans-serif; line-height: 1.6; color: #333; max-width: 800px; margin: 0 auto;">
        <div style="background-color: #f0f4f8; padding: 15px; border-radius: 5px; margin-bottom: 20px;">
            <h2 style="margin: 0; color: #2c3e50;">{GREETING}</h2>
        </div>

        <div style="padding: 0 10px;">
            {content}
        </div>

        <hr style="border: 0; border-top: 1px solid #eee; margin-top: 30px;">
        <p style="font-size: 12px; color: #999; text-align: center;">
            {FOOTER}
        </p>
    </div>
</body>
</html>"#,
            content = markdown_to_html(digest),
        )
    }

    /// Plain-text alternative body.
    #[must_use]
    pub fn render_text(digest: &str) -> String {
        format!(
            "{GREETING}\n\n{body}\n\n---\n{FOOTER}\n",
            body = digest.trim(),
        )
    }
}

/// Convert the markdown subset the model emits: paired `**` become
/// `<b>`/`</b>` and line breaks become `<br>`. The text is HTML-escaped
/// first; an unpaired trailing `**` stays literal.
#[must_use]
pub fn markdown_to_html(text: &str) -> String {
    let escaped = html_escape(&text.replace("\r\n", "\n"));
    convert_bold(&escaped).replace('\n', "<br>")
}

fn convert_bold(text: &str) -> String {
    let pieces: Vec<&str> = text.split("**").collect();
    let markers = pieces.len() - 1;
    let paired = markers - markers % 2;

    let mut out = String::with_capacity(text.len() + markers * 2);
    for (i, piece) in pieces.iter().enumerate() {
        if i > 0 {
            let marker = i - 1;
            if marker >= paired {
                out.push_str("**");
            } else if marker % 2 == 0 {
                out.push_str("<b>");
            } else {
                out.push_str("</b>");
            }
        }
        out.push_str(piece);
    }
    out
}

/// Simple HTML escaping for model output.
fn html_escape(s: &str) -> String {
    s.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}
