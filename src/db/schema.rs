use tracing::info;

use super::core::Database;
use crate::TARGET_DB;

impl Database {
    pub(crate) async fn initialize_schema(&self) -> Result<(), sqlx::Error> {
        let mut conn = self.pool().acquire().await?;
        sqlx::query(
            r#"
            CREATE TABLE IF NOT EXISTS feeds (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL UNIQUE,
                last_checked TEXT,
                last_success TEXT,
                error_count INTEGER NOT NULL DEFAULT 0
            );

            CREATE TABLE IF NOT EXISTS articles (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                url TEXT NOT NULL,
                normalized_url TEXT NOT NULL UNIQUE,
                title TEXT NOT NULL,
                summary TEXT,
                published_at TEXT,
                posted_at TEXT NOT NULL,
                image_url TEXT,
                message_id INTEGER,
                feed_id INTEGER,
                FOREIGN KEY (feed_id) REFERENCES feeds (id) ON DELETE SET NULL
            );
            CREATE INDEX IF NOT EXISTS idx_articles_posted_at ON articles (posted_at);
            CREATE INDEX IF NOT EXISTS idx_articles_feed_id ON articles (feed_id);

            CREATE TABLE IF NOT EXISTS daily_stats (
                day TEXT PRIMARY KEY,
                checked INTEGER NOT NULL DEFAULT 0,
                posted INTEGER NOT NULL DEFAULT 0,
                failed INTEGER NOT NULL DEFAULT 0,
                skipped INTEGER NOT NULL DEFAULT 0
            );
            "#,
        )
        .execute(&mut *conn)
        .await?;

        info!(target: TARGET_DB, "Database schema initialized");
        Ok(())
    }
}
