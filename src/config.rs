use std::path::Path;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::feed::FeedError;
use crate::recommend::{default_recommendations, Recommendation};

pub const ENV_CAPACITY: &str = "NEXUS_FEED_CAPACITY";
pub const ENV_INTERVAL_MS: &str = "NEXUS_FEED_INTERVAL_MS";
pub const ENV_MAX_ROWS: &str = "NEXUS_FEED_MAX_ROWS";

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedConfig {
    #[serde(default = "default_capacity")]
    pub capacity: usize,
    #[serde(default = "default_interval_ms")]
    pub interval_ms: u64,
    #[serde(default = "default_max_visible_rows")]
    pub max_visible_rows: usize,
    #[serde(default = "default_categories")]
    pub categories: Vec<String>,
    #[serde(default = "default_titles")]
    pub titles: Vec<String>,
    #[serde(default = "default_highlight_categories")]
    pub highlight_categories: Vec<String>,
    #[serde(default = "default_recommendation_interval_ms")]
    pub recommendation_interval_ms: u64,
    #[serde(default = "default_recommendations")]
    pub recommendations: Vec<Recommendation>,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            capacity: default_capacity(),
            interval_ms: default_interval_ms(),
            max_visible_rows: default_max_visible_rows(),
            categories: default_categories(),
            titles: default_titles(),
            highlight_categories: default_highlight_categories(),
            recommendation_interval_ms: default_recommendation_interval_ms(),
            recommendations: default_recommendations(),
        }
    }
}

impl FeedConfig {
    /// Override numeric settings from the environment. Unparseable values
    /// are ignored with a warning.
    pub fn apply_env_overrides(&mut self) {
        if let Some(value) = env_number::<usize>(ENV_CAPACITY) {
            self.capacity = value;
        }
        if let Some(value) = env_number::<u64>(ENV_INTERVAL_MS) {
            self.interval_ms = value;
        }
        if let Some(value) = env_number::<usize>(ENV_MAX_ROWS) {
            self.max_visible_rows = value;
        }
    }

    pub fn validate(&self) -> Result<(), FeedError> {
        if self.capacity == 0 {
            return Err(FeedError::Config(
                "capacity must be greater than 0".to_string(),
            ));
        }
        if self.interval_ms == 0 {
            return Err(FeedError::Config(
                "intervalMs must be greater than 0".to_string(),
            ));
        }
        if self.max_visible_rows == 0 {
            return Err(FeedError::Config(
                "maxVisibleRows must be greater than 0".to_string(),
            ));
        }
        if self.recommendation_interval_ms == 0 {
            return Err(FeedError::Config(
                "recommendationIntervalMs must be greater than 0".to_string(),
            ));
        }
        for recommendation in &self.recommendations {
            recommendation
                .validate()
                .map_err(|e| FeedError::Config(format!("recommendations: {e}")))?;
        }
        if self.categories.iter().all(|c| c.trim().is_empty()) {
            return Err(FeedError::Config(
                "categories must contain at least one non-empty label".to_string(),
            ));
        }
        if self.titles.iter().all(|t| t.trim().is_empty()) {
            return Err(FeedError::Config(
                "titles must contain at least one non-empty title".to_string(),
            ));
        }
        Ok(())
    }

    pub fn interval(&self) -> Duration {
        Duration::from_millis(self.interval_ms)
    }

    pub fn recommendation_interval(&self) -> Duration {
        Duration::from_millis(self.recommendation_interval_ms)
    }
}

/// Read a JSON config file (or defaults when `path` is `None`), then apply
/// environment overrides and validate.
pub fn load_feed_config(path: Option<&Path>) -> Result<FeedConfig, FeedError> {
    let mut config = match path {
        Some(path) => {
            let raw = std::fs::read_to_string(path).map_err(|error| {
                FeedError::Config(format!(
                    "failed to read config {}: {error}",
                    path.display()
                ))
            })?;
            serde_json::from_str::<FeedConfig>(&raw).map_err(|error| {
                FeedError::Config(format!("invalid feed configuration: {error}"))
            })?
        }
        None => FeedConfig::default(),
    };

    config.apply_env_overrides();
    config.validate()?;
    Ok(config)
}

fn env_number<T: std::str::FromStr>(key: &str) -> Option<T> {
    let raw = std::env::var(key).ok()?;
    match raw.trim().parse::<T>() {
        Ok(value) => Some(value),
        Err(_) => {
            tracing::warn!("ignoring {key}={raw}: not a valid number");
            None
        }
    }
}

fn default_capacity() -> usize {
    20
}

fn default_interval_ms() -> u64 {
    3_000
}

fn default_recommendation_interval_ms() -> u64 {
    5_000
}

fn default_max_visible_rows() -> usize {
    20
}

fn default_categories() -> Vec<String> {
    ["Newly Siphoned", "Recently Synthesized", "Trending", "User Upload"]
        .into_iter()
        .map(String::from)
        .collect()
}

fn default_titles() -> Vec<String> {
    [
        "The Echoing Void (New Genesis)",
        "Chronicles of the Parallel Self (Meld)",
        "Whispers of the Unseen (Synthesized)",
        "User_0xAB12's Dream Archive (Upload)",
    ]
    .into_iter()
    .map(String::from)
    .collect()
}

fn default_highlight_categories() -> Vec<String> {
    ["Genesis", "Meld", "Synthesis"]
        .into_iter()
        .map(String::from)
        .collect()
}
