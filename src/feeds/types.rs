//! Type definitions for the feed intake module.

use chrono::{DateTime, Utc};

use crate::summarizer::payload::SummaryBody;

/// An article under consideration for the current cycle. Created per fetch,
/// discarded if not selected; never persisted directly.
#[derive(Debug, Clone)]
pub struct ArticleCandidate {
    /// Canonical link to the article; the deduplication key.
    pub link: String,
    pub title: String,
    pub summary: SummaryBody,
    pub published: Option<DateTime<Utc>>,
    /// URL of the feed this candidate came from.
    pub feed_url: String,
    /// Image found in the entry's media fields, if any.
    pub image_url: Option<String>,
}

// Summaries longer than this are cut at a word boundary.
pub const MAX_SUMMARY_CHARS: usize = 300;
