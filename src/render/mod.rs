//! Presentation layer for the live feed.
//!
//! Rows are rendered as `[category] title (Hash: xxxxxxxx...)`. Highlighting
//! is decided here from the configured category list; the feed itself stores
//! no presentation state. Recommendation batches render one line per entry
//! with scores to two decimals.

use std::io::{self, Write};
use std::sync::Arc;

use serde::Serialize;
use tokio::sync::watch;
use tokio::task::JoinHandle;

use crate::config::FeedConfig;
use crate::feed::{BoundedLiveFeed, FeedEvent, ObserverError, Subscription};
use crate::recommend::Recommendation;

/// Characters of the identifier shown in a row.
pub const IDENTIFIER_PREVIEW_LEN: usize = 8;

const HIGHLIGHT_START: &str = "\x1b[32m";
const HIGHLIGHT_END: &str = "\x1b[0m";

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RenderedRow {
    pub text: String,
    pub highlighted: bool,
}

pub fn render_row(event: &FeedEvent, highlight_categories: &[String]) -> RenderedRow {
    let preview: String = event
        .identifier
        .chars()
        .take(IDENTIFIER_PREVIEW_LEN)
        .collect();
    RenderedRow {
        text: format!("[{}] {} (Hash: {preview}...)", event.category, event.title),
        highlighted: highlight_categories
            .iter()
            .any(|category| *category == event.category),
    }
}

#[derive(Debug, Clone)]
pub struct FeedRenderer {
    max_visible_rows: usize,
    highlight_categories: Arc<[String]>,
}

impl FeedRenderer {
    pub fn new(max_visible_rows: usize, highlight_categories: Vec<String>) -> Self {
        Self {
            max_visible_rows,
            highlight_categories: highlight_categories.into(),
        }
    }

    pub fn from_config(config: &FeedConfig) -> Self {
        Self::new(config.max_visible_rows, config.highlight_categories.clone())
    }

    /// Render the newest `max_visible_rows` items.
    pub fn render(&self, items: &[FeedEvent]) -> Vec<RenderedRow> {
        items
            .iter()
            .take(self.max_visible_rows)
            .map(|event| render_row(event, &self.highlight_categories))
            .collect()
    }

    /// Subscribe to `feed`, handing the rendered rows to `sink` on every push.
    pub fn attach<F>(self, feed: &BoundedLiveFeed, sink: F) -> Subscription
    where
        F: Fn(&[RenderedRow]) -> Result<(), ObserverError> + Send + Sync + 'static,
    {
        feed.subscribe(move |_, items| sink(&self.render(items)))
    }
}

/// Write rows to `out`, wrapping highlighted rows in ANSI green.
pub fn write_rows<W: Write>(out: &mut W, rows: &[RenderedRow]) -> io::Result<()> {
    for row in rows {
        if row.highlighted {
            writeln!(out, "{HIGHLIGHT_START}{}{HIGHLIGHT_END}", row.text)?;
        } else {
            writeln!(out, "{}", row.text)?;
        }
    }
    out.flush()
}

/// Sink for `FeedRenderer::attach` that redraws the whole list on stdout.
pub fn stdout_sink(rows: &[RenderedRow]) -> Result<(), ObserverError> {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    writeln!(out, "--- nexus feed ({} shown) ---", rows.len())
        .and_then(|_| write_rows(&mut out, rows))
        .map_err(|e| ObserverError::failed(format!("stdout write failed: {e}")))
}

pub fn render_recommendation(recommendation: &Recommendation) -> String {
    format!(
        "{} | Relevance: {:.2} | Synthetic Potential: {:.2} | Watch: {}",
        recommendation.title,
        recommendation.relevance_score,
        recommendation.synthesis_potential,
        recommendation.content_hash
    )
}

pub fn write_recommendations<W: Write>(
    out: &mut W,
    recommendations: &[Recommendation],
) -> io::Result<()> {
    for recommendation in recommendations {
        writeln!(out, "{}", render_recommendation(recommendation))?;
    }
    out.flush()
}

/// Hand every new batch on `rx` to `sink` until the board is dropped.
pub fn watch_recommendations<F>(
    mut rx: watch::Receiver<Vec<Recommendation>>,
    mut sink: F,
) -> JoinHandle<()>
where
    F: FnMut(&[Recommendation]) + Send + 'static,
{
    tokio::spawn(async move {
        while rx.changed().await.is_ok() {
            let batch = rx.borrow_and_update().clone();
            sink(&batch);
        }
        tracing::debug!("recommendation board closed");
    })
}

/// Sink for `watch_recommendations` that redraws the grid on stdout.
pub fn stdout_recommendations(recommendations: &[Recommendation]) {
    let stdout = io::stdout();
    let mut out = stdout.lock();
    let written = writeln!(out, "--- recommendations ({}) ---", recommendations.len())
        .and_then(|_| write_recommendations(&mut out, recommendations));
    if let Err(e) = written {
        tracing::warn!("stdout write failed: {e}");
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use pretty_assertions::assert_eq;

    use super::*;
    use crate::recommend::RecommendationBoard;

    fn highlights() -> Vec<String> {
        vec!["Genesis".to_string(), "Meld".to_string()]
    }

    #[test]
    fn test_row_format_truncates_identifier() {
        let event = FeedEvent::new("Trending", "Beyond the Event Horizon", "0123456789abcdef");
        let row = render_row(&event, &highlights());
        assert_eq!(row.text, "[Trending] Beyond the Event Horizon (Hash: 01234567...)");
        assert!(!row.highlighted);
    }

    #[test]
    fn test_short_identifier_shown_whole() {
        let event = FeedEvent::new("Meld", "Parallel Self", "ab12");
        let row = render_row(&event, &highlights());
        assert_eq!(row.text, "[Meld] Parallel Self (Hash: ab12...)");
        assert!(row.highlighted);
    }

    #[test]
    fn test_highlight_requires_exact_category() {
        let event = FeedEvent::new("New Genesis", "x", "00000000");
        assert!(!render_row(&event, &highlights()).highlighted);
    }

    #[test]
    fn test_render_caps_visible_rows() {
        let renderer = FeedRenderer::new(2, Vec::new());
        let items: Vec<FeedEvent> = (0..5)
            .map(|i| FeedEvent::new("Trending", format!("t{i}"), format!("{i:08x}")))
            .collect();
        let rows = renderer.render(&items);
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0].text, "[Trending] t0 (Hash: 00000000...)");
    }

    #[test]
    fn test_attach_renders_on_each_push() {
        let feed = BoundedLiveFeed::new(3).unwrap();
        let frames: Arc<Mutex<Vec<Vec<RenderedRow>>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = frames.clone();
        let _sub = FeedRenderer::new(2, highlights()).attach(&feed, move |rows| {
            sink.lock().unwrap().push(rows.to_vec());
            Ok(())
        });

        feed.push(FeedEvent::new("Genesis", "First", "aaaaaaaa")).unwrap();
        feed.push(FeedEvent::new("Trending", "Second", "bbbbbbbb")).unwrap();
        feed.push(FeedEvent::new("Trending", "Third", "cccccccc")).unwrap();

        let frames = frames.lock().unwrap();
        assert_eq!(frames.len(), 3);
        assert_eq!(frames[0].len(), 1);
        assert!(frames[0][0].highlighted);
        let last: Vec<&str> = frames[2].iter().map(|r| r.text.as_str()).collect();
        assert_eq!(
            last,
            vec![
                "[Trending] Third (Hash: cccccccc...)",
                "[Trending] Second (Hash: bbbbbbbb...)",
            ]
        );
    }

    #[test]
    fn test_recommendation_scores_use_two_decimals() {
        let recommendation = Recommendation::new("The Algorithmic Bloom", 0.95, 0.8, "rec1hash");
        assert_eq!(
            render_recommendation(&recommendation),
            "The Algorithmic Bloom | Relevance: 0.95 | Synthetic Potential: 0.80 | Watch: rec1hash"
        );
    }

    #[test]
    fn test_write_recommendations_one_line_each() {
        let batch = vec![
            Recommendation::new("One", 0.123, 1.0, "h1"),
            Recommendation::new("Two", 0.0, 0.456, "h2"),
        ];
        let mut out = Vec::new();
        write_recommendations(&mut out, &batch).unwrap();
        assert_eq!(
            String::from_utf8(out).unwrap(),
            "One | Relevance: 0.12 | Synthetic Potential: 1.00 | Watch: h1\n\
             Two | Relevance: 0.00 | Synthetic Potential: 0.46 | Watch: h2\n"
        );
    }

    #[tokio::test]
    async fn test_watch_recommendations_delivers_until_board_dropped() {
        let board = RecommendationBoard::new();
        let seen: Arc<Mutex<Vec<usize>>> = Arc::new(Mutex::new(Vec::new()));
        let sink = seen.clone();
        let task = watch_recommendations(board.subscribe(), move |batch| {
            sink.lock().unwrap().push(batch.len());
        });

        board
            .replace(vec![Recommendation::new("Solo", 0.5, 0.5, "solo")])
            .unwrap();
        while seen.lock().unwrap().is_empty() {
            tokio::task::yield_now().await;
        }
        drop(board);
        task.await.unwrap();

        assert_eq!(*seen.lock().unwrap(), vec![1]);
    }

    #[test]
    fn test_write_rows_marks_highlighted() {
        let rows = vec![
            RenderedRow {
                text: "plain".to_string(),
                highlighted: false,
            },
            RenderedRow {
                text: "new".to_string(),
                highlighted: true,
            },
        ];
        let mut out = Vec::new();
        write_rows(&mut out, &rows).unwrap();
        let text = String::from_utf8(out).unwrap();
        assert_eq!(text, "plain\n\x1b[32mnew\x1b[0m\n");
    }
}
