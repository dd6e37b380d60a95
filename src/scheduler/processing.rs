//! One posting cycle: intake, ranking, summarization, delivery, bookkeeping.

use anyhow::{anyhow, Result};
use chrono::Utc;
use rand::Rng;
use tokio::time::sleep;
use tracing::{debug, error, info, warn};

use super::Scheduler;
use crate::db::DailyCounter;
use crate::formatter;
use crate::library;
use crate::publisher::ChannelSession;
use crate::scoring;
use crate::summarizer::GenerationBackend;
use crate::TARGET_DB;

impl<S: ChannelSession, B: GenerationBackend> Scheduler<S, B> {
    pub(crate) async fn run_cycle(&mut self) -> Result<()> {
        self.quota.roll_over(Utc::now().date_naive());
        if self.quota.exhausted() {
            info!(
                "Daily post quota reached ({}), skipping cycle",
                self.quota.posts_today()
            );
            return Ok(());
        }

        // One broken feed must not starve the others.
        let mut candidates = Vec::new();
        for feed_url in &self.config.feed_urls {
            match self.intake.fetch_relevant(feed_url).await {
                Ok(mut items) => {
                    self.db.update_feed_checked(feed_url, true).await?;
                    candidates.append(&mut items);
                }
                Err(err) => {
                    warn!("Feed {} failed: {:#}", feed_url, err);
                    self.db.update_feed_checked(feed_url, false).await?;
                }
            }
        }

        for _ in &candidates {
            self.db.increment_daily(DailyCounter::Checked).await?;
        }

        if candidates.is_empty() {
            info!("No fresh candidates this cycle");
            // A failed filler post is not a failed cycle; the next cycle
            // runs on the normal interval.
            if self.config.enable_educational_content {
                if let Err(err) = self.post_educational().await {
                    warn!("Educational post failed: {:#}", err);
                }
            }
            return Ok(());
        }

        let selected = scoring::select_top_n(candidates, self.config.max_news_per_cycle);
        info!("Selected {} candidates for publication", selected.len());

        for scored in selected {
            if self.quota.exhausted() {
                info!("Daily post quota reached mid-cycle, stopping");
                break;
            }
            let candidate = scored.candidate;

            if self.db.already_posted(&candidate.link).await? {
                debug!("Skipping already posted article: {}", candidate.link);
                self.db.increment_daily(DailyCounter::Skipped).await?;
                continue;
            }

            let article_text = candidate.summary.flatten_text();
            let mut payload = match self
                .summarizer
                .summarize(&article_text, &candidate.title, &candidate.link, &mut self.rng)
                .await
            {
                Ok(payload) => payload,
                Err(err) => {
                    warn!("Summarization failed for {}: {:#}", candidate.link, err);
                    self.db.increment_daily(DailyCounter::Failed).await?;
                    continue;
                }
            };

            payload.image_url = match candidate.image_url.clone() {
                Some(url) => Some(url),
                None => self.images.from_page(&candidate.link).await,
            };

            let text = formatter::format_post(&payload, &self.config.channel_link);
            formatter::validate_length(&text, payload.image_url.is_some());

            let handle = match self
                .publisher
                .publish(&text, payload.image_url.as_deref())
                .await
            {
                Ok(handle) => handle,
                Err(err) => {
                    warn!("Failed to publish {}: {}", candidate.link, err);
                    self.db.increment_daily(DailyCounter::Failed).await?;
                    continue;
                }
            };

            // Once the send succeeded the channel is the source of truth; a
            // persistence failure is logged, never resent.
            let feed_id = self.db.feed_id(&candidate.feed_url).await?;
            if let Err(err) = self
                .db
                .record_posted(
                    &candidate.link,
                    &payload.title,
                    &payload.body,
                    candidate.published,
                    payload.image_url.as_deref(),
                    handle.id,
                    feed_id,
                )
                .await
            {
                error!(target: TARGET_DB, "Failed to record posted article {}: {}", candidate.link, err);
            }
            self.db.increment_daily(DailyCounter::Posted).await?;
            self.quota.record_post();
            info!(
                "Posted: {} (score {:.1}, {} today)",
                candidate.title,
                scored.score,
                self.quota.posts_today()
            );

            sleep(self.config.inter_post_delay).await;

            if self.config.enable_educational_content
                && !self.quota.exhausted()
                && self.rng.random::<f64>() < self.config.educational_content_frequency
            {
                if let Err(err) = self.post_educational().await {
                    warn!("Educational post failed: {:#}", err);
                }
                sleep(self.config.inter_post_delay).await;
            }
        }

        Ok(())
    }

    /// Posts one educational item: a generated lesson when the dice and the
    /// backend cooperate, otherwise a static library entry.
    pub(crate) async fn post_educational(&mut self) -> Result<()> {
        if self.quota.exhausted() {
            return Ok(());
        }

        let payload = if library::use_generated(&mut self.rng, self.config.dynamic_content_ratio) {
            let topic = library::pick_topic(&mut self.rng);
            match self.summarizer.summarize_topic(topic).await {
                Ok(payload) => payload,
                Err(err) => {
                    warn!(
                        "Lesson generation for '{}' failed ({:#}), using the static library",
                        topic, err
                    );
                    library::to_payload(self.library.pick_static(&mut self.rng))
                }
            }
        } else {
            library::to_payload(self.library.pick_static(&mut self.rng))
        };

        let text = formatter::format_post(&payload, &self.config.channel_link);
        formatter::validate_length(&text, false);

        self.publisher
            .publish(&text, None)
            .await
            .map_err(|err| anyhow!("educational post failed: {}", err))?;

        self.db.increment_daily(DailyCounter::Posted).await?;
        self.quota.record_post();
        info!("Posted educational content: {}", payload.title);
        Ok(())
    }
}
