//! Review command for Lexis.
//!
//! Grades recall of one item and prints its new schedule.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cli::{format_failure, ItemInfo};
use crate::core::{Clock, ItemId, LearningStatus, OperationContext};
use crate::error::{ErrorKind, LexisError};
use crate::study::{ReviewOutcome, StudyService};

/// Options for the review command.
#[derive(Debug, Clone, Default)]
pub struct ReviewOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Time spent answering, in milliseconds.
    pub duration_ms: Option<u32>,
}

/// Output format for the review command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReviewOutput {
    /// Whether the review was recorded.
    pub success: bool,
    /// The item after the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemInfo>,
    /// Status before the review.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub previous_status: Option<LearningStatus>,
    /// Whether the review moved the item to another status.
    pub status_changed: bool,
    /// Error message if the review failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl ReviewOutput {
    /// Create a successful output.
    pub fn success(outcome: &ReviewOutcome) -> Self {
        Self {
            success: true,
            item: Some(ItemInfo::from(&outcome.item)),
            previous_status: Some(outcome.previous_status),
            status_changed: outcome.status_changed,
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &LexisError) -> Self {
        Self {
            success: false,
            item: None,
            previous_status: None,
            status_changed: false,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The review command implementation.
pub struct ReviewCommand {
    service: StudyService,
    clock: Arc<dyn Clock>,
}

impl ReviewCommand {
    /// Create a new review command.
    pub fn new(service: StudyService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Run the review command.
    pub fn run(&self, item_id: &str, grade: i64, options: &ReviewOptions) -> ReviewOutput {
        let result = ItemId::parse(item_id).and_then(|id| {
            self.service.review(
                &OperationContext::background(),
                &id,
                grade,
                options.duration_ms,
                self.clock.now(),
            )
        });

        match result {
            Ok(outcome) => ReviewOutput::success(&outcome),
            Err(e) => ReviewOutput::failure(&e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &ReviewOutput, options: &ReviewOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &ReviewOutput) -> String {
        let item = match (&output.item, output.success) {
            (Some(item), true) => item,
            _ => return format_failure("Review", output.error.as_deref()),
        };

        let mut lines = vec![format!("Reviewed {}", item.id)];
        match output.previous_status {
            Some(previous) if output.status_changed => {
                lines.push(format!("  Status: {} -> {}", previous, item.status));
            }
            _ => lines.push(format!("  Status: {}", item.status)),
        }
        if let Some(interval) = item.interval {
            lines.push(format!("  Interval: {} day(s)", interval));
        }
        if let Some(ease) = item.ease_factor {
            lines.push(format!("  Ease: {:.2}", ease));
        }
        if let Some(next) = item.next_review_at {
            lines.push(format!("  Next review: {}", next.format("%Y-%m-%d %H:%M UTC")));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::add::{AddCommand, AddOptions};
    use crate::cli::testing::{clock, setup, t0};
    use chrono::Duration;

    fn add(service: &StudyService, fixed: &Arc<crate::core::FixedClock>, id: &str) {
        let cmd = AddCommand::new(service.clone(), clock(fixed));
        let options = AddOptions {
            id: Some(id.to_string()),
            ..Default::default()
        };
        assert!(cmd.run("apple", &options).success);
    }

    #[test]
    fn test_review_new_item() {
        let (_dir, service, fixed) = setup();
        add(&service, &fixed, "m1");
        let cmd = ReviewCommand::new(service, clock(&fixed));

        let output = cmd.run("m1", 4, &ReviewOptions::default());

        assert!(output.success);
        assert!(output.status_changed);
        assert_eq!(output.previous_status, Some(LearningStatus::New));
        let item = output.item.unwrap();
        assert_eq!(item.status, LearningStatus::Learning);
        assert_eq!(item.interval, Some(1));
        assert_eq!(item.next_review_at, Some(t0() + Duration::days(1)));
    }

    #[test]
    fn test_review_invalid_grade() {
        let (_dir, service, fixed) = setup();
        add(&service, &fixed, "m1");
        let cmd = ReviewCommand::new(service, clock(&fixed));

        let output = cmd.run("m1", 9, &ReviewOptions::default());
        assert!(!output.success);
        assert_eq!(output.error_kind, Some(ErrorKind::InvalidInput));
        assert!(output.error.unwrap().contains("between 1 and 5"));
    }

    #[test]
    fn test_review_unknown_item() {
        let (_dir, service, fixed) = setup();
        let cmd = ReviewCommand::new(service, clock(&fixed));

        let output = cmd.run("ghost", 4, &ReviewOptions::default());
        assert!(!output.success);
        assert_eq!(output.error_kind, Some(ErrorKind::NotFound));
    }

    #[test]
    fn test_review_uses_clock() {
        let (_dir, service, fixed) = setup();
        add(&service, &fixed, "m1");
        let cmd = ReviewCommand::new(service, clock(&fixed));

        cmd.run("m1", 4, &ReviewOptions::default());
        fixed.advance(Duration::days(1));
        let output = cmd.run("m1", 4, &ReviewOptions::default());

        let item = output.item.unwrap();
        assert_eq!(item.status, LearningStatus::Review);
        assert_eq!(item.next_review_at, Some(t0() + Duration::days(7)));
    }

    #[test]
    fn test_format_human_readable_shows_transition() {
        let (_dir, service, fixed) = setup();
        add(&service, &fixed, "m1");
        let cmd = ReviewCommand::new(service, clock(&fixed));
        let options = ReviewOptions::default();

        let output = cmd.run("m1", 4, &options);
        let formatted = cmd.format_output(&output, &options);

        assert!(formatted.contains("Reviewed m1"));
        assert!(formatted.contains("new -> learning"));
        assert!(formatted.contains("Interval: 1 day(s)"));
    }

    #[test]
    fn test_format_failure() {
        let (_dir, service, fixed) = setup();
        let cmd = ReviewCommand::new(service, clock(&fixed));
        let options = ReviewOptions::default();

        let output = cmd.run("ghost", 4, &options);
        let formatted = cmd.format_output(&output, &options);
        assert!(formatted.starts_with("Review failed:"));
    }
}
