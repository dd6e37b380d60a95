//! Renders post payloads into final channel messages (HTML parse mode).

use tracing::warn;

use crate::summarizer::payload::{PostPayload, SectionValue, SummaryBody};

/// Caption limit when a message is sent with an image.
pub const MAX_CAPTION_CHARS: usize = 1024;
/// Message limit for a text-only post.
pub const MAX_TEXT_CHARS: usize = 4096;

const DIVIDER: &str = "━━━━━━━━━━━━━━━━━━━━";

fn format_body(body: &SummaryBody) -> String {
    match body {
        SummaryBody::Plain(text) => text.clone(),
        SummaryBody::Sections(sections) => {
            let mut parts = Vec::new();
            for (label, value) in sections {
                parts.push(format!("<b>{}</b>", label));
                match value {
                    SectionValue::Text(text) => parts.push(text.clone()),
                    SectionValue::Items(items) => {
                        for item in items {
                            parts.push(format!("• {}", item));
                        }
                    }
                }
                parts.push(String::new()); // spacer
            }
            // Drop the trailing spacer.
            while parts.last().map(|p| p.is_empty()).unwrap_or(false) {
                parts.pop();
            }
            parts.join("\n")
        }
    }
}

fn footer(channel_link: &str) -> Option<String> {
    if channel_link.is_empty() {
        return None;
    }
    Some(format!("👉 <a href='{}'>Subscribe to the channel</a>", channel_link))
}

/// Renders a payload into the final message text. Pure.
pub fn format_post(payload: &PostPayload, channel_link: &str) -> String {
    let mut parts = Vec::new();

    parts.push(format!("<b>{}</b>", payload.title));
    parts.push(String::new());

    parts.push(format_body(&payload.body));
    parts.push(String::new());

    if let Some(link) = &payload.link {
        parts.push(format!("🔗 <a href='{}'>Source</a>", link));
        parts.push(String::new());
    }

    if !payload.hashtags.is_empty() {
        parts.push(payload.hashtags.clone());
    }

    if let Some(footer) = footer(channel_link) {
        parts.push(String::new());
        parts.push(DIVIDER.to_string());
        parts.push(footer);
    }

    parts.join("\n")
}

/// Checks the message against the channel length limits. Over-limit text is
/// reported, not blocked; the caller decides whether to send anyway.
pub fn validate_length(text: &str, has_image: bool) -> bool {
    let max_chars = if has_image { MAX_CAPTION_CHARS } else { MAX_TEXT_CHARS };
    let length = text.chars().count();

    if length > max_chars {
        warn!(
            "Message too long: {} characters (max {} for {})",
            length,
            max_chars,
            if has_image { "image caption" } else { "text" }
        );
        return false;
    }
    true
}
