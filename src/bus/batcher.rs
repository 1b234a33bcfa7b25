use std::time::Duration;

use tokio::sync::broadcast;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant};

use super::FeedEnvelope;

const DEFAULT_FLUSH_INTERVAL: Duration = Duration::from_millis(100);
const DEFAULT_MAX_BATCH: usize = 50;

pub struct FeedBatcher;

impl FeedBatcher {
    /// Spawn a background task that batches envelopes from the bus and hands
    /// each batch to `sink`.
    ///
    /// - Envelopes are buffered and flushed every 100ms or when the buffer
    ///   reaches 50 envelopes.
    /// - When the bus closes the remainder is flushed and the task exits.
    pub fn start<F>(mut rx: broadcast::Receiver<FeedEnvelope>, mut sink: F) -> JoinHandle<()>
    where
        F: FnMut(Vec<FeedEnvelope>) + Send + 'static,
    {
        tokio::spawn(async move {
            let mut buffer: Vec<FeedEnvelope> = Vec::with_capacity(DEFAULT_MAX_BATCH);
            let mut interval =
                time::interval_at(Instant::now() + DEFAULT_FLUSH_INTERVAL, DEFAULT_FLUSH_INTERVAL);

            loop {
                tokio::select! {
                    result = rx.recv() => {
                        match result {
                            Ok(envelope) => {
                                buffer.push(envelope);
                                if buffer.len() >= DEFAULT_MAX_BATCH {
                                    flush(&mut sink, &mut buffer);
                                }
                            }
                            Err(broadcast::error::RecvError::Lagged(n)) => {
                                tracing::warn!("feed batcher lagged, dropped {n} envelopes");
                            }
                            Err(broadcast::error::RecvError::Closed) => {
                                // Bus shut down: flush remainder and exit.
                                if !buffer.is_empty() {
                                    flush(&mut sink, &mut buffer);
                                }
                                break;
                            }
                        }
                    }
                    _ = interval.tick() => {
                        if !buffer.is_empty() {
                            flush(&mut sink, &mut buffer);
                        }
                    }
                }
            }
        })
    }
}

fn flush<F>(sink: &mut F, buffer: &mut Vec<FeedEnvelope>)
where
    F: FnMut(Vec<FeedEnvelope>),
{
    let batch = std::mem::replace(buffer, Vec::with_capacity(DEFAULT_MAX_BATCH));
    tracing::debug!(size = batch.len(), "flushing feed batch");
    sink(batch);
}
