//! Utility functions for feed processing.

use once_cell::sync::Lazy;
use regex::Regex;

/// Helper function to validate a URL
pub fn is_valid_url(url: &str) -> bool {
    if let Ok(parsed) = url::Url::parse(url) {
        parsed.scheme() == "http" || parsed.scheme() == "https"
    } else {
        false
    }
}

static TAG_RE: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").expect("valid regex"));

/// Strips markup from a feed summary and collapses whitespace.
pub fn strip_html(text: &str) -> String {
    let without_tags = TAG_RE.replace_all(text, " ");
    let decoded = without_tags
        .replace("&amp;", "&")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&nbsp;", " ");
    decoded.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncates text to at most `max_chars`, cutting back to the last word
/// boundary and appending an ellipsis.
pub fn truncate_at_word(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        return text.to_string();
    }

    let cut: String = text.chars().take(max_chars).collect();
    let trimmed = match cut.rfind(char::is_whitespace) {
        Some(pos) => &cut[..pos],
        None => cut.as_str(),
    };
    format!("{}...", trimmed.trim_end())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_html_removes_tags_and_entities() {
        let cleaned = strip_html("<p>Rust &amp; Tokio<br/>are   <b>fast</b></p>");
        assert_eq!(cleaned, "Rust & Tokio are fast");
    }

    #[test]
    fn truncate_cuts_at_word_boundary() {
        let text = "one two three four five";
        let cut = truncate_at_word(text, 12);
        assert_eq!(cut, "one two...");
    }

    #[test]
    fn truncate_leaves_short_text_alone() {
        assert_eq!(truncate_at_word("short", 300), "short");
    }

    #[test]
    fn url_validation_rejects_non_http_schemes() {
        assert!(is_valid_url("https://example.com/feed"));
        assert!(!is_valid_url("ftp://example.com"));
        assert!(!is_valid_url("nonsense"));
    }
}
