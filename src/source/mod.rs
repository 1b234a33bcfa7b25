//! Event sources feeding the live feed.
//!
//! A source is pulled by the pump once per tick. `SimulatedSource` fabricates
//! content notifications from fixed pools, `ScriptedSource` replays a list.

use std::collections::VecDeque;

use async_trait::async_trait;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use rand::{Rng, SeedableRng};

use crate::config::FeedConfig;
use crate::feed::{FeedError, FeedEvent};

/// Number of hex digits in a simulated content identifier.
pub const IDENTIFIER_LEN: usize = 8;

#[async_trait]
pub trait EventSource: Send {
    /// Produce the next event, or `None` once the source is exhausted.
    async fn next_event(&mut self) -> Option<FeedEvent>;
}

pub struct SimulatedSource {
    categories: Vec<String>,
    titles: Vec<String>,
    rng: StdRng,
}

impl SimulatedSource {
    pub fn new(categories: Vec<String>, titles: Vec<String>) -> Result<Self, FeedError> {
        Self::with_rng(categories, titles, StdRng::from_entropy())
    }

    /// Deterministic source for tests and reproducible demos.
    pub fn with_seed(
        categories: Vec<String>,
        titles: Vec<String>,
        seed: u64,
    ) -> Result<Self, FeedError> {
        Self::with_rng(categories, titles, StdRng::seed_from_u64(seed))
    }

    pub fn from_config(config: &FeedConfig) -> Result<Self, FeedError> {
        Self::new(config.categories.clone(), config.titles.clone())
    }

    fn with_rng(
        categories: Vec<String>,
        titles: Vec<String>,
        rng: StdRng,
    ) -> Result<Self, FeedError> {
        let categories = non_blank(categories);
        let titles = non_blank(titles);
        if categories.is_empty() {
            return Err(FeedError::Config(
                "simulated source needs at least one category".to_string(),
            ));
        }
        if titles.is_empty() {
            return Err(FeedError::Config(
                "simulated source needs at least one title".to_string(),
            ));
        }
        Ok(Self {
            categories,
            titles,
            rng,
        })
    }

    /// Synchronous generator behind `next_event`; never exhausts.
    pub fn generate(&mut self) -> FeedEvent {
        let category = self
            .categories
            .choose(&mut self.rng)
            .cloned()
            .unwrap_or_default();
        let title = self.titles.choose(&mut self.rng).cloned().unwrap_or_default();
        let identifier = format!("{:08x}", self.rng.gen::<u32>());
        FeedEvent {
            category,
            title,
            identifier,
        }
    }
}

#[async_trait]
impl EventSource for SimulatedSource {
    async fn next_event(&mut self) -> Option<FeedEvent> {
        Some(self.generate())
    }
}

/// Replays a fixed sequence of events, then reports exhaustion.
#[derive(Debug, Default)]
pub struct ScriptedSource {
    events: VecDeque<FeedEvent>,
}

impl ScriptedSource {
    pub fn new(events: impl IntoIterator<Item = FeedEvent>) -> Self {
        Self {
            events: events.into_iter().collect(),
        }
    }

    pub fn remaining(&self) -> usize {
        self.events.len()
    }
}

#[async_trait]
impl EventSource for ScriptedSource {
    async fn next_event(&mut self) -> Option<FeedEvent> {
        self.events.pop_front()
    }
}

fn non_blank(values: Vec<String>) -> Vec<String> {
    values
        .into_iter()
        .filter(|value| !value.trim().is_empty())
        .collect()
}
