//! History command for Lexis.
//!
//! Shows the most recent reviews of one item.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::format_failure;
use crate::core::{ItemId, LearningStatus, OperationContext, ReviewLog};
use crate::error::{ErrorKind, LexisError};
use crate::study::StudyService;

/// Options for the history command.
#[derive(Debug, Clone, Default)]
pub struct HistoryOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of entries (clamped to 1..=100, default 10).
    pub limit: Option<i64>,
}

/// One review, flattened for output.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HistoryEntry {
    pub grade: u8,
    pub reviewed_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<u32>,
    pub status_before: LearningStatus,
    pub status_after: LearningStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub interval_after: Option<u32>,
}

impl From<&ReviewLog> for HistoryEntry {
    fn from(log: &ReviewLog) -> Self {
        Self {
            grade: log.grade.value(),
            reviewed_at: log.reviewed_at,
            duration_ms: log.duration_ms,
            status_before: log.before.learning_status,
            status_after: log.after.learning_status,
            interval_after: log.after.interval,
        }
    }
}

/// Output format for the history command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HistoryOutput {
    /// Whether the history was loaded.
    pub success: bool,
    /// The item asked about.
    pub item_id: String,
    /// Number of entries.
    pub count: usize,
    /// Entries, newest first.
    pub entries: Vec<HistoryEntry>,
    /// Error message if loading failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl HistoryOutput {
    /// Create a successful output.
    pub fn success(item_id: &str, entries: Vec<HistoryEntry>) -> Self {
        Self {
            success: true,
            item_id: item_id.to_string(),
            count: entries.len(),
            entries,
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(item_id: &str, error: &LexisError) -> Self {
        Self {
            success: false,
            item_id: item_id.to_string(),
            count: 0,
            entries: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The history command implementation.
pub struct HistoryCommand {
    service: StudyService,
}

impl HistoryCommand {
    /// Create a new history command.
    pub fn new(service: StudyService) -> Self {
        Self { service }
    }

    /// Run the history command.
    pub fn run(&self, item_id: &str, options: &HistoryOptions) -> HistoryOutput {
        let result = ItemId::parse(item_id).and_then(|id| {
            self.service.history(
                &OperationContext::background(),
                &id,
                options.limit.unwrap_or(0),
            )
        });

        match result {
            Ok(logs) => {
                HistoryOutput::success(item_id, logs.iter().map(HistoryEntry::from).collect())
            }
            Err(e) => HistoryOutput::failure(item_id, &e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &HistoryOutput, options: &HistoryOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &HistoryOutput) -> String {
        if !output.success {
            return format_failure("History", output.error.as_deref());
        }

        if output.entries.is_empty() {
            return format!("No reviews recorded for {}.\n", output.item_id);
        }

        let mut lines = vec![format!(
            "{} review(s) of {}, newest first:\n",
            output.count, output.item_id
        )];
        for entry in &output.entries {
            let duration = entry
                .duration_ms
                .map(|ms| format!(" in {:.1}s", f64::from(ms) / 1000.0))
                .unwrap_or_default();
            lines.push(format!(
                "{}  grade {}{}  {} -> {}  interval {}d",
                entry.reviewed_at.format("%Y-%m-%d %H:%M"),
                entry.grade,
                duration,
                entry.status_before,
                entry.status_after,
                entry.interval_after.unwrap_or(0)
            ));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}
