//! Feed intake: fetches configured feeds and filters entries into candidates.

use anyhow::{anyhow, Result};
use chrono::{Duration as ChronoDuration, Utc};
use feed_rs::parser;
use std::io::Cursor;
use tokio::time::timeout;
use tracing::{debug, info, warn};

use super::types::{ArticleCandidate, MAX_SUMMARY_CHARS};
use super::util::{is_valid_url, strip_html, truncate_at_word};
use crate::config::Config;
use crate::images;
use crate::summarizer::payload::SummaryBody;
use crate::TARGET_WEB_REQUEST;

pub struct FeedIntake {
    client: reqwest::Client,
    keywords: Vec<String>,
    max_age: ChronoDuration,
    request_timeout: tokio::time::Duration,
    fetch_images: bool,
}

impl FeedIntake {
    pub fn new(config: &Config) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()?;
        Ok(FeedIntake {
            client,
            keywords: config.keywords.clone(),
            max_age: ChronoDuration::hours(config.max_article_age_hours),
            request_timeout: config.request_timeout,
            fetch_images: config.enable_image_fetching,
        })
    }

    /// Fetches one feed and returns the entries that pass the age and keyword
    /// filters. A malformed or unreachable feed is an error for this source
    /// only; the caller logs it and moves on to the next feed.
    pub async fn fetch_relevant(&self, feed_url: &str) -> Result<Vec<ArticleCandidate>> {
        if !is_valid_url(feed_url) {
            return Err(anyhow!("invalid feed URL: {}", feed_url));
        }

        debug!(target: TARGET_WEB_REQUEST, "Loading feed from {}", feed_url);
        let response = timeout(self.request_timeout, self.client.get(feed_url).send())
            .await
            .map_err(|_| anyhow!("request to {} timed out", feed_url))??;

        if !response.status().is_success() {
            return Err(anyhow!(
                "non-success status {} from {}",
                response.status(),
                feed_url
            ));
        }

        let body = response.text().await?;
        let feed = parser::parse(Cursor::new(body))
            .map_err(|err| anyhow!("failed to parse feed from {}: {}", feed_url, err))?;

        let candidates = self.candidates_from_feed(feed, feed_url);
        info!(
            target: TARGET_WEB_REQUEST,
            "Found {} relevant entries from {}",
            candidates.len(),
            feed_url
        );
        Ok(candidates)
    }

    /// Converts parsed entries into candidates and applies the filters.
    /// Entries without a link are skipped.
    pub fn candidates_from_feed(
        &self,
        feed: feed_rs::model::Feed,
        feed_url: &str,
    ) -> Vec<ArticleCandidate> {
        let mut candidates = Vec::new();

        for entry in feed.entries {
            let link = match entry.links.first().map(|link| link.href.clone()) {
                Some(link) => link,
                None => {
                    warn!(target: TARGET_WEB_REQUEST, "Feed entry missing link, skipping");
                    continue;
                }
            };

            let title = entry
                .title
                .as_ref()
                .map(|t| t.content.clone())
                .unwrap_or_default();

            let raw_summary = entry
                .summary
                .as_ref()
                .map(|s| s.content.clone())
                .or_else(|| entry.content.as_ref().and_then(|c| c.body.clone()))
                .unwrap_or_default();
            let summary = truncate_at_word(&strip_html(&raw_summary), MAX_SUMMARY_CHARS);

            // The image toggle covers entry media too, not just the page
            // scrape fallback.
            let image_url = if self.fetch_images {
                images::image_from_entry(&entry)
            } else {
                None
            };

            let candidate = ArticleCandidate {
                link,
                title,
                summary: SummaryBody::Plain(summary),
                published: entry.published.or(entry.updated),
                feed_url: feed_url.to_string(),
                image_url,
            };

            if self.passes_filters(&candidate) {
                debug!(target: TARGET_WEB_REQUEST, "Found relevant article: {}", candidate.title);
                candidates.push(candidate);
            }
        }

        candidates
    }

    /// Both filters must hold: the entry is recent enough (a missing
    /// timestamp passes) and the title or summary matches a keyword.
    pub fn passes_filters(&self, candidate: &ArticleCandidate) -> bool {
        if let Some(published) = candidate.published {
            if Utc::now().signed_duration_since(published) > self.max_age {
                debug!(target: TARGET_WEB_REQUEST, "Article too old: {}", candidate.title);
                return false;
            }
        }

        let haystack = format!(
            "{} {}",
            candidate.title.to_lowercase(),
            candidate.summary.flatten_text().to_lowercase()
        );
        if !self.keywords.iter().any(|kw| haystack.contains(kw.as_str())) {
            debug!(target: TARGET_WEB_REQUEST, "Article doesn't match keywords: {}", candidate.title);
            return false;
        }

        true
    }
}
