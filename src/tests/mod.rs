//! Cross-module scenario tests.
//!
//! Helpers shared by the scenario files live here.

use crate::feed::FeedEvent;

#[cfg(test)]
mod pipeline;

/// Scripted event whose identifier is `n` as 8 hex digits.
pub fn content_event(category: &str, n: u32) -> FeedEvent {
    FeedEvent::new(category, format!("Content #{n}"), format!("{n:08x}"))
}

pub fn identifiers(items: &[FeedEvent]) -> Vec<String> {
    items.iter().map(|e| e.identifier.clone()).collect()
}
