use chrono::Utc;
use sqlx::Row;
use tracing::{debug, instrument};

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    /// Adds a feed to the registry. Re-registering an existing URL is a
    /// no-op.
    #[instrument(target = "db_query", level = "info", skip(self))]
    pub async fn register_feed(&self, url: &str) -> Result<(), sqlx::Error> {
        sqlx::query("INSERT INTO feeds (url) VALUES (?1) ON CONFLICT(url) DO NOTHING")
            .bind(url)
            .execute(self.pool())
            .await?;
        debug!(target: TARGET_DB, "Registered feed: {}", url);
        Ok(())
    }

    pub async fn feed_id(&self, url: &str) -> Result<Option<i64>, sqlx::Error> {
        let row = sqlx::query("SELECT id FROM feeds WHERE url = ?1")
            .bind(url)
            .fetch_optional(self.pool())
            .await?;
        row.map(|r| r.try_get("id")).transpose()
    }

    /// Marks a feed as checked. Success stamps last_success and clears the
    /// consecutive error count; failure increments it.
    #[instrument(target = "db_query", level = "debug", skip(self))]
    pub async fn update_feed_checked(&self, url: &str, success: bool) -> Result<(), sqlx::Error> {
        let now = Utc::now().to_rfc3339();
        sqlx::query(
            r#"
            UPDATE feeds SET
                last_checked = ?1,
                last_success = CASE WHEN ?2 THEN ?1 ELSE last_success END,
                error_count = CASE WHEN ?2 THEN 0 ELSE error_count + 1 END
            WHERE url = ?3
            "#,
        )
        .bind(&now)
        .bind(success)
        .bind(url)
        .execute(self.pool())
        .await?;
        Ok(())
    }

    #[cfg(test)]
    pub async fn feed_error_count(&self, url: &str) -> Result<i64, sqlx::Error> {
        let row = sqlx::query("SELECT error_count FROM feeds WHERE url = ?1")
            .bind(url)
            .fetch_one(self.pool())
            .await?;
        row.try_get("error_count")
    }
}
