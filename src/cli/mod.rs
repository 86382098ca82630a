//! CLI commands for Lexis.
//!
//! This module provides CLI commands for Lexis, organized into:
//! - **Study commands**: review, queue (also due/status), preview
//! - **Inspection commands**: stats, history
//! - **Catalog commands**: add, remove-word
//!
//! Each command follows the same shape: an `Options` struct, a `run` that
//! returns a serializable `Output`, and `format_output` for JSON or
//! human-readable text.

// Study commands
pub mod preview;
pub mod queue;
pub mod review;

// Inspection commands
pub mod history;
pub mod stats;

// Catalog commands
pub mod add;
pub mod remove_word;

pub use add::AddCommand;
pub use history::HistoryCommand;
pub use preview::PreviewCommand;
pub use queue::QueueCommand;
pub use remove_word::RemoveWordCommand;
pub use review::ReviewCommand;
pub use stats::StatsCommand;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{LearnableItem, LearningStatus};
use crate::error::{exit_codes, ErrorKind};

/// Simplified item info for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemInfo {
    /// Item ID.
    pub id: String,
    /// Owning word.
    pub word_id: String,
    /// Learning status.
    pub status: LearningStatus,
    /// Days until the next review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval: Option<u32>,
    /// Ease factor.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub ease_factor: Option<f64>,
    /// Completed reviews.
    pub review_count: u32,
    /// Next review timestamp.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_review_at: Option<DateTime<Utc>>,
    /// Created timestamp.
    pub created_at: DateTime<Utc>,
}

impl From<&LearnableItem> for ItemInfo {
    fn from(item: &LearnableItem) -> Self {
        Self {
            id: item.id.to_string(),
            word_id: item.word_id.clone(),
            status: item.learning_status(),
            interval: item.interval(),
            ease_factor: item.ease_factor(),
            review_count: item.retention().reviews(),
            next_review_at: item.next_review_at(),
            created_at: item.created_at,
        }
    }
}

impl ItemInfo {
    /// One-line summary used by the human-readable formatters.
    pub fn summary_line(&self) -> String {
        let next = match self.next_review_at {
            Some(at) => format!("next {}", at.format("%Y-%m-%d %H:%M")),
            None => "never reviewed".to_string(),
        };
        let ease = self
            .ease_factor
            .map(|e| format!("{:.2}", e))
            .unwrap_or_else(|| "-".to_string());
        format!(
            "{} [{}] word {} | interval {}d | ease {} | reviews {} | {}",
            self.id,
            self.status,
            self.word_id,
            self.interval.unwrap_or(0),
            ease,
            self.review_count,
            next
        )
    }
}

/// Map a command's failure kind to a process exit code.
pub fn exit_code(error_kind: Option<ErrorKind>) -> i32 {
    match error_kind {
        None => exit_codes::SUCCESS,
        Some(kind) => exit_codes::for_kind(kind),
    }
}

/// Render a failure line for human-readable output.
pub(crate) fn format_failure(action: &str, error: Option<&str>) -> String {
    format!("{} failed: {}\n", action, error.unwrap_or("unknown error"))
}
