//! Recommendation stream.
//!
//! Unlike the live feed, recommendations arrive as whole batches that replace
//! the previous list. `RecommendationBoard` holds the current batch behind a
//! `watch` channel so readers always see the latest complete list.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::watch;

use crate::config::FeedConfig;
use crate::feed::FeedError;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recommendation {
    pub title: String,
    pub relevance_score: f64,
    pub synthesis_potential: f64,
    pub content_hash: String,
}

impl Recommendation {
    pub fn new(
        title: impl Into<String>,
        relevance_score: f64,
        synthesis_potential: f64,
        content_hash: impl Into<String>,
    ) -> Self {
        Self {
            title: title.into(),
            relevance_score,
            synthesis_potential,
            content_hash: content_hash.into(),
        }
    }

    /// Title and hash must be non-blank, scores finite and within `0.0..=1.0`.
    pub fn validate(&self) -> Result<(), FeedError> {
        if self.title.trim().is_empty() {
            return Err(FeedError::InvalidRecommendation {
                field: "title",
                reason: "must not be empty",
            });
        }
        if self.content_hash.trim().is_empty() {
            return Err(FeedError::InvalidRecommendation {
                field: "content_hash",
                reason: "must not be empty",
            });
        }
        for (field, score) in [
            ("relevance_score", self.relevance_score),
            ("synthesis_potential", self.synthesis_potential),
        ] {
            if !(0.0..=1.0).contains(&score) {
                return Err(FeedError::InvalidRecommendation {
                    field,
                    reason: "must be between 0 and 1",
                });
            }
        }
        Ok(())
    }
}

#[async_trait]
pub trait RecommendationSource: Send {
    /// Produce the next full batch, or `None` once the source is exhausted.
    async fn next_batch(&mut self) -> Option<Vec<Recommendation>>;
}

/// Serves the same configured batch on every pull.
#[derive(Debug, Clone)]
pub struct SimulatedRecommendations {
    batch: Vec<Recommendation>,
}

impl SimulatedRecommendations {
    pub fn new(batch: Vec<Recommendation>) -> Self {
        Self { batch }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.recommendations.clone())
    }
}

#[async_trait]
impl RecommendationSource for SimulatedRecommendations {
    async fn next_batch(&mut self) -> Option<Vec<Recommendation>> {
        Some(self.batch.clone())
    }
}

/// Latest recommendation batch, replaced wholesale on every update.
#[derive(Debug)]
pub struct RecommendationBoard {
    current: watch::Sender<Vec<Recommendation>>,
}

impl Default for RecommendationBoard {
    fn default() -> Self {
        Self::new()
    }
}

impl RecommendationBoard {
    pub fn new() -> Self {
        let (current, _) = watch::channel(Vec::new());
        Self { current }
    }

    /// Validate every entry, then swap in the batch. A rejected batch leaves
    /// the previous list in place and wakes no subscriber.
    pub fn replace(&self, batch: Vec<Recommendation>) -> Result<(), FeedError> {
        for recommendation in &batch {
            recommendation.validate()?;
        }
        tracing::debug!(size = batch.len(), "recommendations replaced");
        self.current.send_replace(batch);
        Ok(())
    }

    pub fn snapshot(&self) -> Vec<Recommendation> {
        self.current.borrow().clone()
    }

    /// Receiver that wakes on every accepted batch. It reports closed once
    /// the board is dropped.
    pub fn subscribe(&self) -> watch::Receiver<Vec<Recommendation>> {
        self.current.subscribe()
    }
}

pub(crate) fn default_recommendations() -> Vec<Recommendation> {
    vec![
        Recommendation::new("The Algorithmic Bloom", 0.95, 0.88, "rec1hash"),
        Recommendation::new("Echoes of a Forgotten Timeline", 0.89, 0.72, "rec2hash"),
        Recommendation::new("Beyond the Event Horizon", 0.92, 0.91, "rec3hash"),
    ]
}
