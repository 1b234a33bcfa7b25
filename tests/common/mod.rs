// tests/common/mod.rs
//! Shared fixtures for integration tests.

#![allow(dead_code)]

use std::sync::{Arc, Mutex};

use nexus_feed_lib::feed::{BoundedLiveFeed, FeedEvent, Subscription};

pub fn sample_event(label: &str) -> FeedEvent {
    FeedEvent::new("Recently Synthesized", format!("Sample {label}"), label)
}

/// Observer that records the identifier of every notified event.
pub fn record_notifications(feed: &BoundedLiveFeed) -> (Subscription, Arc<Mutex<Vec<String>>>) {
    let seen = Arc::new(Mutex::new(Vec::new()));
    let sink = seen.clone();
    let sub = feed.subscribe(move |event, _| {
        sink.lock().unwrap().push(event.identifier.clone());
        Ok(())
    });
    (sub, seen)
}
