//! Preview command for Lexis.
//!
//! Shows what each grade would do to an item, without recording anything.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::cli::{format_failure, ItemInfo};
use crate::core::{Clock, ItemId, LearningStatus, OperationContext};
use crate::error::{ErrorKind, LexisError};
use crate::srs::GradePreview;
use crate::study::{ItemPreview, StudyService};

/// Options for the preview command.
#[derive(Debug, Clone, Default)]
pub struct PreviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// The outcome of one grade.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GradeOutcome {
    pub grade: u8,
    pub status: LearningStatus,
    pub status_changed: bool,
    pub interval: u32,
    pub ease_factor: f64,
    pub next_review_at: DateTime<Utc>,
}

impl From<&GradePreview> for GradeOutcome {
    fn from(preview: &GradePreview) -> Self {
        Self {
            grade: preview.grade.value(),
            status: preview.learning_status(),
            status_changed: preview.status_changed,
            interval: preview.state.interval.unwrap_or(0),
            ease_factor: preview.state.ease_factor.unwrap_or_default(),
            next_review_at: preview
                .state
                .next_review_at
                .unwrap_or(DateTime::<Utc>::MIN_UTC),
        }
    }
}

/// Output format for the preview command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PreviewOutput {
    /// Whether the preview was computed.
    pub success: bool,
    /// The item as stored now.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemInfo>,
    /// One entry per grade, ascending.
    pub outcomes: Vec<GradeOutcome>,
    /// Error message if the preview failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl PreviewOutput {
    /// Create a successful output.
    pub fn success(preview: &ItemPreview) -> Self {
        Self {
            success: true,
            item: Some(ItemInfo::from(&preview.item)),
            outcomes: preview.outcomes.iter().map(GradeOutcome::from).collect(),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &LexisError) -> Self {
        Self {
            success: false,
            item: None,
            outcomes: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The preview command implementation.
pub struct PreviewCommand {
    service: StudyService,
    clock: Arc<dyn Clock>,
}

impl PreviewCommand {
    /// Create a new preview command.
    pub fn new(service: StudyService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Run the preview command.
    pub fn run(&self, item_id: &str, _options: &PreviewOptions) -> PreviewOutput {
        let result = ItemId::parse(item_id).and_then(|id| {
            self.service
                .preview(&OperationContext::background(), &id, self.clock.now())
        });

        match result {
            Ok(preview) => PreviewOutput::success(&preview),
            Err(e) => PreviewOutput::failure(&e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &PreviewOutput, options: &PreviewOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &PreviewOutput) -> String {
        let item = match (&output.item, output.success) {
            (Some(item), true) => item,
            _ => return format_failure("Preview", output.error.as_deref()),
        };

        let mut lines = vec![item.summary_line(), String::new()];
        for outcome in &output.outcomes {
            let marker = if outcome.status_changed { " *" } else { "" };
            lines.push(format!(
                "grade {}: {:>5}d  ease {:.2}  {}{}",
                outcome.grade, outcome.interval, outcome.ease_factor, outcome.status, marker
            ));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}
