use anyhow::Result;
use tokio::signal;
use tokio::sync::watch;
use tracing::{error, info};

use herald::config::Config;
use herald::db::Database;
use herald::feeds::FeedIntake;
use herald::images::ImageExtractor;
use herald::logging::configure_logging;
use herald::publisher::{Publisher, RetryPolicy, TelegramSession};
use herald::scheduler::Scheduler;
use herald::summarizer::{OpenAiBackend, Summarizer};

#[tokio::main]
async fn main() -> Result<()> {
    configure_logging();

    let config = Config::from_env()?;
    info!(
        "Starting herald: {} feeds, {} posts/day max",
        config.feed_urls.len(),
        config.max_posts_per_day
    );

    let db = Database::new(&config.database_path).await?;

    let (stop_tx, mut stop_rx) = watch::channel(false);
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_err() {
            error!("Failed to listen for ctrl-c");
        }
        let _ = stop_tx.send(true);
    });

    let intake = FeedIntake::new(&config)?;
    let summarizer = Summarizer::new(OpenAiBackend::new(&config));
    let publisher = Publisher::new(TelegramSession::new(&config), RetryPolicy::default());
    let images = ImageExtractor::new(&config);

    let mut scheduler = Scheduler::new(config, db, intake, summarizer, publisher, images);
    scheduler.initialize().await?;
    scheduler.run(&mut stop_rx).await?;

    info!("Shutdown complete");
    Ok(())
}
