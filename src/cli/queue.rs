//! Queue command for Lexis.
//!
//! Lists items to study. One command backs three CLI verbs:
//! `queue` (new and due items), `due` (reviewed items past due) and
//! `status <status>` (items in one learning status).

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cli::{format_failure, ItemInfo};
use crate::core::{Clock, LearningStatus, OperationContext};
use crate::error::{ErrorKind, LexisError};
use crate::study::StudyService;

/// Which selection to list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum QueueMode {
    /// New items plus due items.
    #[default]
    Study,
    /// Reviewed items whose next review has passed.
    Due,
    /// Items in one learning status.
    Status(LearningStatus),
}

impl QueueMode {
    fn label(&self) -> String {
        match self {
            QueueMode::Study => "study queue".to_string(),
            QueueMode::Due => "due".to_string(),
            QueueMode::Status(status) => format!("status {}", status),
        }
    }
}

/// Options for the queue command.
#[derive(Debug, Clone, Default)]
pub struct QueueOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Maximum number of results (clamped to 1..=100, default 10).
    pub limit: Option<i64>,
    /// Selection to list.
    pub mode: QueueMode,
}

/// Output format for the queue command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QueueOutput {
    /// Whether the listing succeeded.
    pub success: bool,
    /// Which selection was listed.
    pub mode: String,
    /// Number of items.
    pub count: usize,
    /// The items, in study order.
    pub items: Vec<ItemInfo>,
    /// Error message if listing failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl QueueOutput {
    /// Create a successful output.
    pub fn success(mode: String, items: Vec<ItemInfo>) -> Self {
        Self {
            success: true,
            mode,
            count: items.len(),
            items,
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(mode: String, error: &LexisError) -> Self {
        Self {
            success: false,
            mode,
            count: 0,
            items: Vec::new(),
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The queue command implementation.
pub struct QueueCommand {
    service: StudyService,
    clock: Arc<dyn Clock>,
}

impl QueueCommand {
    /// Create a new queue command.
    pub fn new(service: StudyService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Run the queue command.
    pub fn run(&self, options: &QueueOptions) -> QueueOutput {
        let ctx = OperationContext::background();
        let limit = options.limit.unwrap_or(0);
        let now = self.clock.now();

        let result = match options.mode {
            QueueMode::Study => self.service.study_queue(&ctx, limit, now),
            QueueMode::Due => self.service.due_for_review(&ctx, limit, now),
            QueueMode::Status(status) => self.service.by_status(&ctx, status, limit),
        };

        let mode = options.mode.label();
        match result {
            Ok(items) => QueueOutput::success(mode, items.iter().map(ItemInfo::from).collect()),
            Err(e) => QueueOutput::failure(mode, &e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &QueueOutput, options: &QueueOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &QueueOutput) -> String {
        if !output.success {
            return format_failure("Listing", output.error.as_deref());
        }

        if output.items.is_empty() {
            return format!("Nothing to study ({}).\n", output.mode);
        }

        let mut lines = vec![format!("{} item(s) ({}):\n", output.count, output.mode)];
        for (i, item) in output.items.iter().enumerate() {
            lines.push(format!("{}. {}", i + 1, item.summary_line()));
        }
        lines.push(String::new());
        lines.join("\n")
    }
}
