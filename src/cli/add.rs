//! Add command for Lexis.
//!
//! Creates a new, never-reviewed learnable item for a word.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::cli::{format_failure, ItemInfo};
use crate::core::{Clock, ItemId, OperationContext};
use crate::error::{ErrorKind, LexisError};
use crate::study::StudyService;

/// Options for the add command.
#[derive(Debug, Clone, Default)]
pub struct AddOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
    /// Explicit item ID (generated when absent).
    pub id: Option<String>,
}

/// Output format for the add command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddOutput {
    /// Whether the item was created.
    pub success: bool,
    /// The created item.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub item: Option<ItemInfo>,
    /// Error message if creation failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl AddOutput {
    /// Create a successful output.
    pub fn success(item: ItemInfo) -> Self {
        Self {
            success: true,
            item: Some(item),
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(error: &LexisError) -> Self {
        Self {
            success: false,
            item: None,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The add command implementation.
pub struct AddCommand {
    service: StudyService,
    clock: Arc<dyn Clock>,
}

impl AddCommand {
    /// Create a new add command.
    pub fn new(service: StudyService, clock: Arc<dyn Clock>) -> Self {
        Self { service, clock }
    }

    /// Run the add command.
    pub fn run(&self, word_id: &str, options: &AddOptions) -> AddOutput {
        let id = match options.id.as_deref().map(ItemId::parse).transpose() {
            Ok(id) => id,
            Err(e) => return AddOutput::failure(&e),
        };

        match self.service.add_item(
            &OperationContext::background(),
            word_id,
            id,
            self.clock.now(),
        ) {
            Ok(item) => AddOutput::success(ItemInfo::from(&item)),
            Err(e) => AddOutput::failure(&e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &AddOutput, options: &AddOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else {
            self.format_human_readable(output)
        }
    }

    fn format_human_readable(&self, output: &AddOutput) -> String {
        match (&output.item, output.success) {
            (Some(item), true) => format!("Added {} for word {}\n", item.id, item.word_id),
            _ => format_failure("Add", output.error.as_deref()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::{clock, setup, t0};
    use crate::core::LearningStatus;

    #[test]
    fn test_add_with_explicit_id() {
        let (_dir, service, fixed) = setup();
        let cmd = AddCommand::new(service, clock(&fixed));
        let options = AddOptions {
            id: Some("m1".to_string()),
            ..Default::default()
        };

        let output = cmd.run("apple", &options);

        assert!(output.success);
        let item = output.item.unwrap();
        assert_eq!(item.id, "m1");
        assert_eq!(item.word_id, "apple");
        assert_eq!(item.status, LearningStatus::New);
        assert_eq!(item.created_at, t0());
    }

    #[test]
    fn test_add_generates_id() {
        let (_dir, service, fixed) = setup();
        let cmd = AddCommand::new(service, clock(&fixed));

        let output = cmd.run("apple", &AddOptions::default());
        assert!(output.success);
        assert!(!output.item.unwrap().id.is_empty());
    }

    #[test]
    fn test_add_duplicate_id_fails() {
        let (_dir, service, fixed) = setup();
        let cmd = AddCommand::new(service, clock(&fixed));
        let options = AddOptions {
            id: Some("m1".to_string()),
            ..Default::default()
        };

        assert!(cmd.run("apple", &options).success);
        let output = cmd.run("pear", &options);
        assert!(!output.success);
        assert_eq!(output.error_kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_add_invalid_id_fails() {
        let (_dir, service, fixed) = setup();
        let cmd = AddCommand::new(service, clock(&fixed));
        let options = AddOptions {
            id: Some("../escape".to_string()),
            ..Default::default()
        };

        let output = cmd.run("apple", &options);
        assert!(!output.success);
        assert_eq!(output.error_kind, Some(ErrorKind::InvalidInput));
    }

    #[test]
    fn test_format_output_modes() {
        let (_dir, service, fixed) = setup();
        let cmd = AddCommand::new(service, clock(&fixed));
        let options = AddOptions {
            id: Some("m1".to_string()),
            ..Default::default()
        };
        let output = cmd.run("apple", &options);

        let human = cmd.format_output(&output, &options);
        assert!(human.contains("Added m1 for word apple"));

        let json = cmd.format_output(
            &output,
            &AddOptions {
                json: true,
                ..Default::default()
            },
        );
        assert!(json.contains("\"success\": true"));
        assert!(!json.contains("error_kind"));

        let quiet = cmd.format_output(
            &output,
            &AddOptions {
                quiet: true,
                ..Default::default()
            },
        );
        assert!(quiet.is_empty());
    }
}
