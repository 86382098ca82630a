//! Remove-word command for Lexis.
//!
//! Deletes every learnable item that belongs to a word.

use serde::{Deserialize, Serialize};

use crate::cli::format_failure;
use crate::core::OperationContext;
use crate::error::{ErrorKind, LexisError};
use crate::study::StudyService;

/// Options for the remove-word command.
#[derive(Debug, Clone, Default)]
pub struct RemoveWordOptions {
    /// Output as JSON.
    pub json: bool,
    /// Suppress output.
    pub quiet: bool,
}

/// Output format for the remove-word command.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RemoveWordOutput {
    /// Whether the removal ran.
    pub success: bool,
    /// The word removed.
    pub word_id: String,
    /// Number of items deleted.
    pub removed: usize,
    /// Error message if removal failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// Failure classification, for the exit code.
    #[serde(skip)]
    pub error_kind: Option<ErrorKind>,
}

impl RemoveWordOutput {
    /// Create a successful output.
    pub fn success(word_id: &str, removed: usize) -> Self {
        Self {
            success: true,
            word_id: word_id.to_string(),
            removed,
            error: None,
            error_kind: None,
        }
    }

    /// Create a failed output.
    pub fn failure(word_id: &str, error: &LexisError) -> Self {
        Self {
            success: false,
            word_id: word_id.to_string(),
            removed: 0,
            error: Some(error.to_string()),
            error_kind: Some(error.kind()),
        }
    }
}

/// The remove-word command implementation.
pub struct RemoveWordCommand {
    service: StudyService,
}

impl RemoveWordCommand {
    /// Create a new remove-word command.
    pub fn new(service: StudyService) -> Self {
        Self { service }
    }

    /// Run the remove-word command.
    pub fn run(&self, word_id: &str, _options: &RemoveWordOptions) -> RemoveWordOutput {
        let word_id = word_id.trim();
        match self
            .service
            .remove_word(&OperationContext::background(), word_id)
        {
            Ok(removed) => RemoveWordOutput::success(word_id, removed),
            Err(e) => RemoveWordOutput::failure(word_id, &e),
        }
    }

    /// Format output based on options.
    pub fn format_output(&self, output: &RemoveWordOutput, options: &RemoveWordOptions) -> String {
        if options.quiet {
            return String::new();
        }

        if options.json {
            serde_json::to_string_pretty(output).unwrap_or_else(|_| "{}".to_string())
        } else if !output.success {
            format_failure("Remove", output.error.as_deref())
        } else if output.removed == 0 {
            format!("No items found for word {}.\n", output.word_id)
        } else {
            format!(
                "Removed {} item(s) for word {}.\n",
                output.removed, output.word_id
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::testing::setup;
    use crate::core::Clock;

    #[test]
    fn test_remove_word_cascades() {
        let (_dir, service, fixed) = setup();
        let ctx = OperationContext::background();
        service.add_item(&ctx, "apple", None, fixed.now()).unwrap();
        service.add_item(&ctx, "apple", None, fixed.now()).unwrap();
        service.add_item(&ctx, "pear", None, fixed.now()).unwrap();

        let cmd = RemoveWordCommand::new(service.clone());
        let output = cmd.run("apple", &RemoveWordOptions::default());

        assert!(output.success);
        assert_eq!(output.removed, 2);
        assert_eq!(service.store().aggregate(fixed.now()).unwrap().items, 1);
    }

    #[test]
    fn test_format_output_nothing_removed() {
        let (_dir, service, _fixed) = setup();
        let cmd = RemoveWordCommand::new(service);
        let options = RemoveWordOptions::default();

        let output = cmd.run("ghost", &options);
        assert!(output.success);
        assert_eq!(
            cmd.format_output(&output, &options),
            "No items found for word ghost.\n"
        );
    }

    #[test]
    fn test_format_output_json() {
        let (_dir, service, _fixed) = setup();
        let cmd = RemoveWordCommand::new(service);
        let options = RemoveWordOptions {
            json: true,
            ..Default::default()
        };

        let output = cmd.run("ghost", &options);
        assert!(cmd.format_output(&output, &options).contains("\"removed\": 0"));
    }
}
