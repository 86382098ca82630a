//! Lexis - spaced-repetition scheduling for vocabulary learning
//!
//! CLI entry point with global panic handler.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use clap::{Parser, Subcommand, ValueEnum};
use tracing_subscriber::EnvFilter;

use lexis::cli;
use lexis::config::{lexis_home, Config};
use lexis::core::{Clock, LearningStatus, SystemClock};
use lexis::error::exit_codes;
use lexis::srs::Sm2Strategy;
use lexis::storage::FileItemStore;
use lexis::study::StudyService;

// =============================================================================
// CLI Definition
// =============================================================================

/// Lexis - spaced-repetition scheduling for vocabulary learning
#[derive(Parser)]
#[command(name = "lexis")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add a new learnable item for a word
    Add {
        /// The word the item belongs to
        word_id: String,
        /// Use this item ID instead of generating one
        #[arg(long)]
        id: Option<String>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Grade a review of an item (1-5)
    Review {
        /// Item ID
        item_id: String,
        /// Recall quality, 1 (forgot) to 5 (perfect)
        #[arg(allow_negative_numbers = true)]
        grade: i64,
        /// Time spent answering, in milliseconds
        #[arg(long, short)]
        duration_ms: Option<u32>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List the study queue: new items, then due items
    Queue {
        /// Maximum number of results
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List reviewed items whose next review has passed
    Due {
        /// Maximum number of results
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// List items in one learning status
    Status {
        /// The status to list
        #[arg(value_enum)]
        status: StatusArg,
        /// Maximum number of results
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show what each grade would do to an item
    Preview {
        /// Item ID
        item_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Display study statistics
    Stats {
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Show recent reviews of an item
    History {
        /// Item ID
        item_id: String,
        /// Maximum number of entries
        #[arg(long, short, allow_negative_numbers = true)]
        limit: Option<i64>,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },

    /// Delete every item of a word
    RemoveWord {
        /// The word to remove
        word_id: String,
        /// Output as JSON
        #[arg(long, short)]
        json: bool,
        /// Suppress output
        #[arg(long, short)]
        quiet: bool,
    },
}

/// Learning status as a CLI value.
#[derive(Clone, Copy, Debug, ValueEnum)]
enum StatusArg {
    New,
    Learning,
    Review,
    Mastered,
}

impl From<StatusArg> for LearningStatus {
    fn from(arg: StatusArg) -> Self {
        match arg {
            StatusArg::New => LearningStatus::New,
            StatusArg::Learning => LearningStatus::Learning,
            StatusArg::Review => LearningStatus::Review,
            StatusArg::Mastered => LearningStatus::Mastered,
        }
    }
}

// =============================================================================
// Main Entry Point
// =============================================================================

fn main() -> ExitCode {
    setup_panic_handler();
    setup_logging();

    match run() {
        Ok(code) => code,
        Err(e) => {
            eprintln!("lexis error: {}", e);
            ExitCode::from(exit_codes::ERROR as u8)
        }
    }
}

/// Set up the global panic handler.
///
/// On panic, appends to $LEXIS_HOME/crash.log and exits with the generic
/// error code.
fn setup_panic_handler() {
    std::panic::set_hook(Box::new(|info| {
        eprintln!("lexis panic: {}", info);

        if let Some(home) = lexis_home() {
            let crash_log = home.join("crash.log");
            if let Ok(mut file) = std::fs::OpenOptions::new()
                .create(true)
                .append(true)
                .open(&crash_log)
            {
                let timestamp = chrono::Utc::now().format("%Y-%m-%d %H:%M:%S UTC");
                let _ = writeln!(file, "[{}] {}", timestamp, info);
            }
        }

        std::process::exit(exit_codes::ERROR);
    }));
}

/// Log to stderr, filtered by `LEXIS_LOG` (default `warn`).
fn setup_logging() {
    let filter = EnvFilter::try_from_env("LEXIS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .with_ansi(false)
        .init();
}

/// Run the CLI and return the exit code.
fn run() -> Result<ExitCode, Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    let config = Config::load();
    config.validate()?;

    let store = FileItemStore::from_config(&config)?;
    let service = StudyService::new(Arc::new(store), Arc::new(Sm2Strategy::new(config.srs)));
    let clock: Arc<dyn Clock> = Arc::new(SystemClock);

    let code = match cli.command {
        Commands::Add {
            word_id,
            id,
            json,
            quiet,
        } => {
            let cmd = cli::AddCommand::new(service, clock);
            let options = cli::add::AddOptions { json, quiet, id };
            let output = cmd.run(&word_id, &options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
        Commands::Review {
            item_id,
            grade,
            duration_ms,
            json,
            quiet,
        } => {
            let cmd = cli::ReviewCommand::new(service, clock);
            let options = cli::review::ReviewOptions {
                json,
                quiet,
                duration_ms,
            };
            let output = cmd.run(&item_id, grade, &options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
        Commands::Queue { limit, json, quiet } => {
            run_queue(service, clock, cli::queue::QueueMode::Study, limit, json, quiet)
        }
        Commands::Due { limit, json, quiet } => {
            run_queue(service, clock, cli::queue::QueueMode::Due, limit, json, quiet)
        }
        Commands::Status {
            status,
            limit,
            json,
            quiet,
        } => run_queue(
            service,
            clock,
            cli::queue::QueueMode::Status(status.into()),
            limit,
            json,
            quiet,
        ),
        Commands::Preview {
            item_id,
            json,
            quiet,
        } => {
            let cmd = cli::PreviewCommand::new(service, clock);
            let options = cli::preview::PreviewOptions { json, quiet };
            let output = cmd.run(&item_id, &options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
        Commands::Stats { json, quiet } => {
            let cmd = cli::StatsCommand::new(service, clock);
            let options = cli::stats::StatsOptions { json, quiet };
            let output = cmd.run(&options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
        Commands::History {
            item_id,
            limit,
            json,
            quiet,
        } => {
            let cmd = cli::HistoryCommand::new(service);
            let options = cli::history::HistoryOptions { json, quiet, limit };
            let output = cmd.run(&item_id, &options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
        Commands::RemoveWord {
            word_id,
            json,
            quiet,
        } => {
            let cmd = cli::RemoveWordCommand::new(service);
            let options = cli::remove_word::RemoveWordOptions { json, quiet };
            let output = cmd.run(&word_id, &options);
            emit(cmd.format_output(&output, &options), output.error_kind)
        }
    };

    Ok(code)
}

// =============================================================================
// Command Implementations
// =============================================================================

fn run_queue(
    service: StudyService,
    clock: Arc<dyn Clock>,
    mode: cli::queue::QueueMode,
    limit: Option<i64>,
    json: bool,
    quiet: bool,
) -> ExitCode {
    let cmd = cli::QueueCommand::new(service, clock);
    let options = cli::queue::QueueOptions {
        json,
        quiet,
        limit,
        mode,
    };
    let output = cmd.run(&options);
    emit(cmd.format_output(&output, &options), output.error_kind)
}

/// Print formatted output and map the failure kind to an exit code.
fn emit(formatted: String, error_kind: Option<lexis::error::ErrorKind>) -> ExitCode {
    if !formatted.is_empty() {
        println!("{}", formatted);
    }
    ExitCode::from(cli::exit_code(error_kind) as u8)
}
