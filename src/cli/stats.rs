//! Stats command for Lexis.
//!
//! Displays item counts per learning status and the size of the study queue.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cli::format_failure;
use crate::core::{Clock, OperationContext};
use crate::error::{ErrorKind, LexisError};
use crate::study::{StudyService, StudyStats};

/// Options for the stats command.
#[derive(Debug, Clone, Default)]
pub struct StatsOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the stats command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatsOutput {
    /// Whether stats were computed successfully.
    pub success: bool,
    /// The counts.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stats: Option<StudyStats>,
    /// Share of items mastered.
    pub mastery_ratio: f64,
    /// Error message if stats failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl StatsOutput {
    /// Create a successful output.
    pub fn success(stats: StudyStats) -> Self {
        Self {
            success: true,
            mastery_ratio: stats.mastery_ratio(),
            stats: Some(stats),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &LexisError) -> Self {
        Self {
            success: false,
            stats: None,
            mastery_ratio: 0.0,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The stats command implementation.
pub struct StatsCommand {
    service: StudyService,
    clock: Arc<dyn Clock>,
}

impl StatsCommand {
    /// Create a new stats command.
    pub fn new(service: StudyService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Run the stats command.
    pub fn run(&self, _options: &StatsOptions) -> StatsOutput {
        match self
            .service
            .stats(&OperationContext::background(), self.clock.now())
        {
            Ok(stats) => StatsOutput::success(stats),
            Err(e) => StatsOutput::failure(&e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &StatsOutput, options: &StatsOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &StatsOutput) -> String {
        let stats = match (&output.stats, output.success) {
            (Some(stats), true) => stats,
            _ => return format_failure("Stats", output.error.as_deref()),
        };

        let mut lines = Vec::new();
        lines.push("Lexis Study Stats".to_string());
        lines.push("=================".to_string());
        lines.push(String::new());
        lines.push(format!("Words:     {}", stats.total_words));
        lines.push(format!("Items:     {}", stats.total_items));
        lines.push(format!("  New:      {}", stats.new_count));
        lines.push(format!("  Learning: {}", stats.learning_count));
        lines.push(format!("  Review:   {}", stats.review_count));
        lines.push(format!(
            "  Mastered: {} ({:.0}%)",
            stats.mastered_count,
            output.mastery_ratio * 100.0
        ));
        lines.push(String::new());
        lines.push(format!("Ready to study: {}", stats.due_for_review_count));
        lines.push(String::new());
        lines.join("\n")
    }
}
