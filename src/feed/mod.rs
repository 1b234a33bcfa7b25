//! Bounded live feed of content events.
//!
//! The feed keeps the most recent `capacity` events newest first and notifies
//! registered observers synchronously on every accepted push:
//! - `BoundedLiveFeed`: owns the items and the observer registry
//! - `Subscription`: handle returned by `subscribe`, removes its observer
//! - `FeedEvent`: the validated record stored by the feed
//!
//! Observer failures (returned errors and panics) are caught per observer and
//! handed to an injected `ErrorReporter`; they never reach `push`'s caller.

mod event;
mod live_feed;


pub use event::FeedEvent;
pub use live_feed::{BoundedLiveFeed, ErrorReporter, ObserverFailure, Subscription};

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum FeedError {
    #[error("invalid event: {field} must not be empty")]
    InvalidEvent { field: &'static str },
    #[error("invalid recommendation: {field} {reason}")]
    InvalidRecommendation {
        field: &'static str,
        reason: &'static str,
    },
    #[error("config error: {0}")]
    Config(String),
}

/// Failure raised by a single observer during notification.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ObserverError {
    #[error("observer failed: {0}")]
    Failed(String),
    #[error("observer panicked: {0}")]
    Panicked(String),
}

impl ObserverError {
    pub fn failed(message: impl Into<String>) -> Self {
        Self::Failed(message.into())
    }
}
