use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use tokio::sync::{oneshot, watch};
use tokio::task::{JoinError, JoinHandle};
use tokio::time::{self, Instant, MissedTickBehavior};

use crate::feed::{BoundedLiveFeed, FeedError};
use crate::recommend::{RecommendationBoard, RecommendationSource};
use crate::source::EventSource;

/// One pull from a source delivered to its target.
#[async_trait]
trait PumpStep: Send {
    /// `None` once the source is exhausted, otherwise whether the target
    /// accepted what was pulled.
    async fn step(&mut self) -> Option<bool>;
}

struct FeedStep<S> {
    source: S,
    feed: Arc<BoundedLiveFeed>,
}

#[async_trait]
impl<S: EventSource> PumpStep for FeedStep<S> {
    async fn step(&mut self) -> Option<bool> {
        let event = self.source.next_event().await?;
        match self.feed.push(event) {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!("skipping event from source: {e}");
                Some(false)
            }
        }
    }
}

struct BoardStep<S> {
    source: S,
    board: Arc<RecommendationBoard>,
}

#[async_trait]
impl<S: RecommendationSource> PumpStep for BoardStep<S> {
    async fn step(&mut self) -> Option<bool> {
        let batch = self.source.next_batch().await?;
        match self.board.replace(batch) {
            Ok(()) => Some(true),
            Err(e) => {
                tracing::warn!("skipping recommendation batch: {e}");
                Some(false)
            }
        }
    }
}

/// Drives a feed (or the recommendation board) from a source on a fixed
/// interval.
#[derive(Debug, Clone, Copy)]
pub struct FeedPump {
    interval: Duration,
    max_events: Option<usize>,
}

impl FeedPump {
    pub fn new(interval: Duration) -> Result<Self, FeedError> {
        if interval.is_zero() {
            return Err(FeedError::Config(
                "pump interval must be greater than 0".to_string(),
            ));
        }
        Ok(Self {
            interval,
            max_events: None,
        })
    }

    /// Stop on its own after `limit` accepted pushes.
    pub fn max_events(mut self, limit: usize) -> Self {
        self.max_events = Some(limit);
        self
    }

    /// Spawn the pump task. The first event is pulled one interval after
    /// start, then once per interval.
    ///
    /// - Events rejected by the feed are logged and skipped.
    /// - The task ends when the source is exhausted, the event limit is
    ///   reached, `PumpHandle::stop` is called, or the handle is dropped.
    pub fn start<S>(self, source: S, feed: Arc<BoundedLiveFeed>) -> PumpHandle
    where
        S: EventSource + 'static,
    {
        self.spawn("feed", FeedStep { source, feed })
    }

    /// Same schedule as `start`, but each pull is a whole batch that replaces
    /// the board's current list. The event limit counts accepted batches.
    pub fn start_recommendations<S>(
        self,
        source: S,
        board: Arc<RecommendationBoard>,
    ) -> PumpHandle
    where
        S: RecommendationSource + 'static,
    {
        self.spawn("recommendations", BoardStep { source, board })
    }

    fn spawn<T>(self, pump: &'static str, mut step: T) -> PumpHandle
    where
        T: PumpStep + 'static,
    {
        let (shutdown_tx, mut shutdown_rx) = oneshot::channel::<()>();
        let (done_tx, done_rx) = watch::channel(false);
        let interval = self.interval;
        let max_events = self.max_events;

        let task = tokio::spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);
            let mut pushed = 0usize;
            tracing::info!(pump, interval_ms = interval.as_millis() as u64, "pump started");

            loop {
                if max_events.is_some_and(|limit| pushed >= limit) {
                    tracing::info!(pump, pushed, "pump reached event limit");
                    break;
                }
                tokio::select! {
                    _ = &mut shutdown_rx => break,
                    _ = ticker.tick() => {
                        match step.step().await {
                            Some(true) => pushed += 1,
                            Some(false) => {}
                            None => {
                                tracing::info!(pump, "source exhausted");
                                break;
                            }
                        }
                    }
                }
            }

            tracing::info!(pump, pushed, "pump stopped");
            let _ = done_tx.send(true);
            pushed
        });

        PumpHandle {
            shutdown: Some(shutdown_tx),
            done: done_rx,
            task,
        }
    }
}

pub struct PumpHandle {
    shutdown: Option<oneshot::Sender<()>>,
    done: watch::Receiver<bool>,
    task: JoinHandle<usize>,
}

impl PumpHandle {
    /// Resolves once the pump task has ended on its own.
    pub async fn finished(&mut self) {
        // An Err means the task dropped its sender, which also means it ended.
        let _ = self.done.wait_for(|done| *done).await;
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal shutdown and wait for the task; returns the number of events
    /// pushed. Safe to call after the task already ended.
    pub async fn stop(mut self) -> Result<usize, JoinError> {
        if let Some(shutdown) = self.shutdown.take() {
            let _ = shutdown.send(());
        }
        self.task.await
    }

    /// Cancel the task without waiting for the current tick.
    pub fn abort(self) {
        self.task.abort();
    }
}
