//! Nexus feed library.
//!
//! A bounded, newest-first live feed of content events plus the pieces that
//! drive and display it:
//! - `feed`: `BoundedLiveFeed`, the capped event list with observers
//! - `source`: event sources (simulated generator, scripted replay)
//! - `pump`: timer task that pulls from a source and pushes into the feed
//! - `recommend`: recommendation batches and the board holding the latest one
//! - `render`: presentation layer turning feed items into display rows
//! - `bus`: broadcast fan-out and batching of accepted events
//! - `config`: JSON configuration with environment overrides
//! - `cli`: command line flags for the `nexus-feed` binary

pub mod bus;
pub mod cli;
pub mod config;
pub mod feed;
pub mod pump;
pub mod recommend;
pub mod render;
pub mod source;

use std::sync::Arc;

use bus::{FeedBatcher, FeedBus};
use cli::CliOptions;
use config::{load_feed_config, FeedConfig};
use feed::BoundedLiveFeed;
use pump::FeedPump;
use recommend::{RecommendationBoard, SimulatedRecommendations};
use render::FeedRenderer;
use source::SimulatedSource;

// ---------------------------------------------------------------------------
// Shared error type
// ---------------------------------------------------------------------------

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error("{0}")]
    Feed(#[from] feed::FeedError),
    #[error("pump task failed: {0}")]
    Join(#[from] tokio::task::JoinError),
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
}

// ---------------------------------------------------------------------------
// Application entry point
// ---------------------------------------------------------------------------

pub fn init_tracing() {
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "nexus_feed_lib=debug,info"
                    .parse()
                    .expect("valid env filter")
            }),
        )
        .init();
}

/// Resolve the effective configuration: file (or defaults), environment,
/// then command line overrides.
pub fn resolve_config(options: &CliOptions) -> Result<FeedConfig, AppError> {
    let mut config = load_feed_config(options.config_path.as_deref())?;
    if let Some(capacity) = options.capacity {
        config.capacity = capacity;
    }
    if let Some(interval_ms) = options.interval_ms {
        config.interval_ms = interval_ms;
    }
    config.validate()?;
    Ok(config)
}

/// Run the simulated feed until Ctrl-C or the tick limit; returns the number
/// of events pushed.
pub async fn run(options: CliOptions) -> Result<usize, AppError> {
    let config = resolve_config(&options)?;
    tracing::info!(
        capacity = config.capacity,
        interval_ms = config.interval_ms,
        "starting nexus feed"
    );

    let feed = Arc::new(BoundedLiveFeed::new(config.capacity)?);
    let renderer = FeedRenderer::from_config(&config).attach(&feed, render::stdout_sink);

    let bus = Arc::new(FeedBus::new());
    let batcher = FeedBatcher::start(bus.subscribe(), |batch| {
        let first = batch.first().map(|e| e.seq).unwrap_or_default();
        tracing::debug!(size = batch.len(), first_seq = first, "feed batch delivered");
    });
    let forwarder = bus.attach(&feed);

    let source = SimulatedSource::from_config(&config)?;
    let mut pump = FeedPump::new(config.interval())?;
    if let Some(ticks) = options.ticks {
        pump = pump.max_events(ticks);
    }
    let mut handle = pump.start(source, feed.clone());

    let board = Arc::new(RecommendationBoard::new());
    let grid = render::watch_recommendations(board.subscribe(), render::stdout_recommendations);
    let recommendations = FeedPump::new(config.recommendation_interval())?
        .start_recommendations(SimulatedRecommendations::from_config(&config), board.clone());

    tokio::select! {
        result = tokio::signal::ctrl_c() => {
            result?;
            tracing::info!("interrupt received, stopping feed");
        }
        _ = handle.finished() => {}
    }

    let pushed = handle.stop().await?;
    let batches = recommendations.stop().await?;
    drop(board);
    grid.await?;
    renderer.unsubscribe();
    forwarder.unsubscribe();
    drop(bus);
    batcher.await?;

    tracing::info!(
        pushed,
        batches,
        retained = feed.len(),
        "nexus feed stopped"
    );
    Ok(pushed)
}

#[cfg(test)]
mod tests;
