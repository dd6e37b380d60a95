use chrono::{DateTime, Utc};
use sqlx::Row;
use tracing::{debug, error, info, instrument};
use url::Url;
use urlnorm::UrlNormalizer;

use super::core::Database;
use crate::summarizer::payload::SummaryBody;
use crate::TARGET_DB;

fn normalize_url(url: &str) -> Result<String, sqlx::Error> {
    if url.trim().is_empty() {
        error!(target: TARGET_DB, "Attempted to use an empty article URL");
        return Err(sqlx::Error::Protocol("Empty URL provided".into()));
    }
    let parsed_url = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(e) => {
            error!(target: TARGET_DB, "Attempted to use an invalid URL ({}): {}", url, e);
            return Err(sqlx::Error::Protocol("Invalid URL provided".into()));
        }
    };
    let normalizer = UrlNormalizer::default();
    Ok(normalizer.compute_normalization_string(&parsed_url))
}

impl Database {
    /// True when an article with the same normalized URL was already posted.
    /// Tracking parameters and trailing-slash variants map to one entry.
    #[instrument(target = "db_query", level = "debug", skip(self))]
    pub async fn already_posted(&self, url: &str) -> Result<bool, sqlx::Error> {
        let normalized_url = normalize_url(url)?;
        let exists = sqlx::query("SELECT 1 FROM articles WHERE normalized_url = ?1")
            .bind(&normalized_url)
            .fetch_optional(self.pool())
            .await?
            .is_some();

        if exists {
            debug!(target: TARGET_DB, "URL already posted: {}", normalized_url);
        }
        Ok(exists)
    }

    /// Records a published article. Returns Ok(false) without writing when
    /// the normalized URL is already present, so a concurrent or repeated
    /// insert cannot produce a duplicate row.
    #[allow(clippy::too_many_arguments)]
    #[instrument(target = "db_query", level = "info", skip(self, title, summary))]
    pub async fn record_posted(
        &self,
        url: &str,
        title: &str,
        summary: &SummaryBody,
        published_at: Option<DateTime<Utc>>,
        image_url: Option<&str>,
        message_id: i64,
        feed_id: Option<i64>,
    ) -> Result<bool, sqlx::Error> {
        let normalized_url = normalize_url(url)?;
        let summary_json = serde_json::to_string(summary).unwrap_or_default();

        let result = sqlx::query(
            r#"
            INSERT INTO articles (url, normalized_url, title, summary, published_at, posted_at, image_url, message_id, feed_id)
            VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
            ON CONFLICT(normalized_url) DO NOTHING
            "#,
        )
        .bind(url)
        .bind(&normalized_url)
        .bind(title)
        .bind(&summary_json)
        .bind(published_at.map(|ts| ts.to_rfc3339()))
        .bind(Utc::now().to_rfc3339())
        .bind(image_url)
        .bind(message_id)
        .bind(feed_id)
        .execute(self.pool())
        .await?;

        if result.rows_affected() == 0 {
            debug!(target: TARGET_DB, "Article already recorded: {}", normalized_url);
            return Ok(false);
        }

        info!(target: TARGET_DB, "Recorded posted article: {}", url);
        Ok(true)
    }

    #[cfg(test)]
    pub async fn posted_count(&self) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT COUNT(*) AS n FROM articles")
            .fetch_one(self.pool())
            .await?;
        row.try_get("n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn recording_twice_rejects_the_duplicate() {
        let db = Database::new_in_memory().await.unwrap();
        let summary = SummaryBody::Plain("text".to_string());

        let first = db
            .record_posted("https://example.com/a", "A", &summary, None, None, 1, None)
            .await
            .unwrap();
        let second = db
            .record_posted("https://example.com/a", "A", &summary, None, None, 2, None)
            .await
            .unwrap();

        assert!(first);
        assert!(!second);
        assert_eq!(db.posted_count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn url_variants_normalize_to_one_article() {
        let db = Database::new_in_memory().await.unwrap();
        let summary = SummaryBody::Plain("text".to_string());

        db.record_posted(
            "https://example.com/a?utm_source=feed",
            "A",
            &summary,
            None,
            None,
            1,
            None,
        )
        .await
        .unwrap();

        assert!(db.already_posted("https://example.com/a").await.unwrap());
    }

    #[tokio::test]
    async fn unseen_urls_are_not_posted() {
        let db = Database::new_in_memory().await.unwrap();
        assert!(!db.already_posted("https://example.com/new").await.unwrap());
    }

    #[tokio::test]
    async fn invalid_urls_are_rejected() {
        let db = Database::new_in_memory().await.unwrap();
        assert!(db.already_posted("not a url").await.is_err());
        assert!(db.already_posted("").await.is_err());
    }
}
