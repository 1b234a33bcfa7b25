use std::sync::atomic::{AtomicI64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use uuid::Uuid;

use crate::feed::{BoundedLiveFeed, FeedEvent, Subscription};

const BUS_CAPACITY: usize = 1024;

/// An accepted feed event stamped for async consumers.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FeedEnvelope {
    pub id: String,
    pub seq: i64,
    pub event: FeedEvent,
    pub created_at: String,
}

pub struct FeedBus {
    tx: broadcast::Sender<FeedEnvelope>,
    seq: AtomicI64,
}

impl Default for FeedBus {
    fn default() -> Self {
        Self::new()
    }
}

impl FeedBus {
    pub fn new() -> Self {
        let (tx, _) = broadcast::channel(BUS_CAPACITY);
        Self {
            tx,
            seq: AtomicI64::new(0),
        }
    }

    /// Publish a pre-built envelope onto the bus.
    pub fn publish(&self, envelope: FeedEnvelope) {
        if let Err(e) = self.tx.send(envelope) {
            tracing::warn!("feed bus publish failed (no receivers?): {e}");
        }
    }

    /// Convenience: stamp and publish an event in one call.
    pub fn emit(&self, event: FeedEvent) -> FeedEnvelope {
        let seq = self.seq.fetch_add(1, Ordering::Relaxed);
        let envelope = FeedEnvelope {
            id: Uuid::new_v4().to_string(),
            seq,
            event,
            created_at: Utc::now().to_rfc3339(),
        };
        self.publish(envelope.clone());
        envelope
    }

    /// Republish every event `feed` accepts.
    pub fn attach(self: &Arc<Self>, feed: &BoundedLiveFeed) -> Subscription {
        let bus = Arc::downgrade(self);
        feed.subscribe(move |event, _| {
            if let Some(bus) = bus.upgrade() {
                bus.emit(event.clone());
            }
            Ok(())
        })
    }

    /// Get a new receiver for this bus.
    pub fn subscribe(&self) -> broadcast::Receiver<FeedEnvelope> {
        self.tx.subscribe()
    }

    pub fn receiver_count(&self) -> usize {
        self.tx.receiver_count()
    }
}
