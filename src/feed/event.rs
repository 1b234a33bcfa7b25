use serde::{Deserialize, Serialize};

use super::FeedError;

/// A single content notification accepted by the feed.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct FeedEvent {
    pub category: String,
    pub title: String,
    pub identifier: String,
}

impl FeedEvent {
    pub fn new(
        category: impl Into<String>,
        title: impl Into<String>,
        identifier: impl Into<String>,
    ) -> Self {
        Self {
            category: category.into(),
            title: title.into(),
            identifier: identifier.into(),
        }
    }

    /// Structural check run by `BoundedLiveFeed::push` before any mutation.
    /// Whitespace-only fields count as empty.
    pub fn validate(&self) -> Result<(), FeedError> {
        for (field, value) in [
            ("category", &self.category),
            ("title", &self.title),
            ("identifier", &self.identifier),
        ] {
            if value.trim().is_empty() {
                return Err(FeedError::InvalidEvent { field });
            }
        }
        Ok(())
    }
}

impl std::fmt::Display for FeedEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}] {} ({})", self.category, self.title, self.identifier)
    }
}
