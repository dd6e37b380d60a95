use chrono::Utc;
use sqlx::Row;
use tracing::instrument;

use super::core::Database;

/// The four per-day counters tracked for reporting.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DailyCounter {
    Checked,
    Posted,
    Failed,
    Skipped,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct DailyStats {
    pub checked: i64,
    pub posted: i64,
    pub failed: i64,
    pub skipped: i64,
}

impl Database {
    /// Bumps one counter for today's row, creating the row on first use.
    #[instrument(target = "db_query", level = "debug", skip(self))]
    pub async fn increment_daily(&self, counter: DailyCounter) -> Result<(), sqlx::Error> {
        let day = Utc::now().date_naive().to_string();
        // Column names cannot be bound; one statement per counter.
        let query = match counter {
            DailyCounter::Checked => {
                "INSERT INTO daily_stats (day, checked) VALUES (?1, 1)
                 ON CONFLICT(day) DO UPDATE SET checked = checked + 1"
            }
            DailyCounter::Posted => {
                "INSERT INTO daily_stats (day, posted) VALUES (?1, 1)
                 ON CONFLICT(day) DO UPDATE SET posted = posted + 1"
            }
            DailyCounter::Failed => {
                "INSERT INTO daily_stats (day, failed) VALUES (?1, 1)
                 ON CONFLICT(day) DO UPDATE SET failed = failed + 1"
            }
            DailyCounter::Skipped => {
                "INSERT INTO daily_stats (day, skipped) VALUES (?1, 1)
                 ON CONFLICT(day) DO UPDATE SET skipped = skipped + 1"
            }
        };
        sqlx::query(query).bind(&day).execute(self.pool()).await?;
        Ok(())
    }

    pub async fn daily_stats(&self, day: &str) -> Result<DailyStats, sqlx::Error> {
        let row = sqlx::query(
            "SELECT checked, posted, failed, skipped FROM daily_stats WHERE day = ?1",
        )
        .bind(day)
        .fetch_optional(self.pool())
        .await?;

        match row {
            Some(row) => Ok(DailyStats {
                checked: row.try_get("checked")?,
                posted: row.try_get("posted")?,
                failed: row.try_get("failed")?,
                skipped: row.try_get("skipped")?,
            }),
            None => Ok(DailyStats::default()),
        }
    }
}
