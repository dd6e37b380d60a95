//! Cycle orchestrator: drives the fetch, rank, summarize, publish pipeline
//! on a fixed interval until told to stop.

mod processing;
mod quota;

pub use self::quota::DailyQuota;

use anyhow::Result;
use chrono::Utc;
use rand::rngs::StdRng;
use rand::SeedableRng;
use tokio::sync::watch;
use tokio::time::{sleep, Duration};
use tracing::{error, info};

use crate::config::Config;
use crate::db::Database;
use crate::feeds::FeedIntake;
use crate::images::ImageExtractor;
use crate::library::ContentLibrary;
use crate::publisher::{ChannelSession, Publisher};
use crate::summarizer::{GenerationBackend, Summarizer};

/// Idle time after a cycle fails outright, before the next try.
const CYCLE_ERROR_COOLDOWN: Duration = Duration::from_secs(300);

pub struct Scheduler<S: ChannelSession, B: GenerationBackend> {
    config: Config,
    db: Database,
    intake: FeedIntake,
    summarizer: Summarizer<B>,
    publisher: Publisher<S>,
    images: ImageExtractor,
    library: ContentLibrary,
    quota: DailyQuota,
    rng: StdRng,
}

impl<S: ChannelSession, B: GenerationBackend> Scheduler<S, B> {
    pub fn new(
        config: Config,
        db: Database,
        intake: FeedIntake,
        summarizer: Summarizer<B>,
        publisher: Publisher<S>,
        images: ImageExtractor,
    ) -> Self {
        let quota = DailyQuota::new(config.max_posts_per_day, Utc::now().date_naive());
        Scheduler {
            config,
            db,
            intake,
            summarizer,
            publisher,
            images,
            library: ContentLibrary::new(),
            quota,
            rng: StdRng::from_os_rng(),
        }
    }

    /// Registers the configured feeds so per-feed health tracking has rows
    /// to update.
    pub async fn initialize(&self) -> Result<()> {
        for feed_url in &self.config.feed_urls {
            self.db.register_feed(feed_url).await?;
        }
        info!("Registered {} feeds", self.config.feed_urls.len());
        Ok(())
    }

    /// Runs posting cycles until the stop signal fires. A failed cycle is
    /// logged and retried after a cooldown; it never terminates the loop.
    pub async fn run(&mut self, stop: &mut watch::Receiver<bool>) -> Result<()> {
        info!(
            "Scheduler started; checking feeds every {:?}",
            self.config.check_interval
        );

        loop {
            if *stop.borrow() {
                info!("Stop signal received, shutting down");
                return Ok(());
            }

            let idle = match self.run_cycle().await {
                Ok(()) => self.config.check_interval,
                Err(err) => {
                    error!("Posting cycle failed: {:#}", err);
                    CYCLE_ERROR_COOLDOWN
                }
            };

            tokio::select! {
                _ = sleep(idle) => {}
                _ = stop.changed() => {}
            }
        }
    }
}
