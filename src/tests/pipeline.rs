//! Source → pump → feed → renderer/bus scenarios.

#[cfg(test)]
pub mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use pretty_assertions::assert_eq;

    use crate::bus::{FeedBatcher, FeedBus, FeedEnvelope};
    use crate::cli::CliOptions;
    use crate::feed::BoundedLiveFeed;
    use crate::config::FeedConfig;
    use crate::pump::FeedPump;
    use crate::recommend::{RecommendationBoard, SimulatedRecommendations};
    use crate::render::{self, FeedRenderer, RenderedRow};
    use crate::source::ScriptedSource;
    use crate::tests::{content_event, identifiers};

    #[tokio::test(start_paused = true)]
    async fn test_full_pipeline_delivers_rows_and_batches() {
        let feed = Arc::new(BoundedLiveFeed::new(3).unwrap());

        let frames: Arc<Mutex<Vec<Vec<RenderedRow>>>> = Arc::new(Mutex::new(Vec::new()));
        let frame_sink = frames.clone();
        let renderer = FeedRenderer::new(2, vec!["Genesis".to_string()]).attach(&feed, move |rows| {
            frame_sink.lock().unwrap().push(rows.to_vec());
            Ok(())
        });

        let bus = Arc::new(FeedBus::new());
        let delivered: Arc<Mutex<Vec<FeedEnvelope>>> = Arc::new(Mutex::new(Vec::new()));
        let delivered_sink = delivered.clone();
        let batcher = FeedBatcher::start(bus.subscribe(), move |batch| {
            delivered_sink.lock().unwrap().extend(batch);
        });
        let forwarder = bus.attach(&feed);

        let source = ScriptedSource::new(vec![
            content_event("Genesis", 1),
            content_event("Trending", 2),
            content_event("Trending", 3),
            content_event("Meld", 4),
        ]);
        let mut handle = FeedPump::new(Duration::from_secs(3))
            .unwrap()
            .start(source, feed.clone());
        handle.finished().await;
        assert_eq!(handle.stop().await.unwrap(), 4);

        renderer.unsubscribe();
        forwarder.unsubscribe();
        drop(bus);
        batcher.await.unwrap();

        assert_eq!(
            identifiers(&feed.snapshot()),
            vec!["00000004", "00000003", "00000002"]
        );

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 4);
        assert!(frames[0][0].highlighted);
        assert_eq!(frames[3].len(), 2);
        assert_eq!(frames[3][0].text, "[Meld] Content #4 (Hash: 00000004...)");
        assert!(!frames[3][0].highlighted);

        let delivered = delivered.lock().unwrap();
        let seqs: Vec<i64> = delivered.iter().map(|e| e.seq).collect();
        assert_eq!(seqs, vec![0, 1, 2, 3]);
        assert_eq!(delivered[0].event, content_event("Genesis", 1));
    }

    #[tokio::test(start_paused = true)]
    async fn test_recommendations_refresh_alongside_feed() {
        let config = FeedConfig::default();
        let feed = Arc::new(BoundedLiveFeed::new(config.capacity).unwrap());
        let board = Arc::new(RecommendationBoard::new());

        let grids: Arc<Mutex<Vec<Vec<String>>>> = Arc::new(Mutex::new(Vec::new()));
        let grid_sink = grids.clone();
        let grid = render::watch_recommendations(board.subscribe(), move |batch| {
            let lines = batch.iter().map(render::render_recommendation).collect();
            grid_sink.lock().unwrap().push(lines);
        });

        let source = ScriptedSource::new((1..=4).map(|n| content_event("Trending", n)));
        let mut feed_pump = FeedPump::new(config.interval())
            .unwrap()
            .max_events(4)
            .start(source, feed.clone());
        let recommendations = FeedPump::new(config.recommendation_interval())
            .unwrap()
            .start_recommendations(SimulatedRecommendations::from_config(&config), board.clone());

        // The fourth feed push lands at 12s, after recommendation ticks at 5s and 10s.
        feed_pump.finished().await;
        assert_eq!(feed_pump.stop().await.unwrap(), 4);
        assert_eq!(recommendations.stop().await.unwrap(), 2);
        drop(board);
        grid.await.unwrap();

        assert_eq!(feed.len(), 4);
        let grids = grids.lock().unwrap();
        assert!(!grids.is_empty());
        assert_eq!(
            grids[0][0],
            "The Algorithmic Bloom | Relevance: 0.95 | Synthetic Potential: 0.88 | Watch: rec1hash"
        );
    }

    #[tokio::test(start_paused = true)]
    async fn test_run_stops_after_tick_limit() {
        let options = CliOptions {
            ticks: Some(3),
            interval_ms: Some(5),
            ..CliOptions::default()
        };
        let pushed = crate::run(options).await.unwrap();
        assert_eq!(pushed, 3);
    }

    #[test]
    fn test_resolve_config_rejects_zero_capacity_flag() {
        let options = CliOptions {
            capacity: Some(0),
            ..CliOptions::default()
        };
        assert!(matches!(
            crate::resolve_config(&options),
            Err(crate::AppError::Feed(_))
        ));
    }
}
