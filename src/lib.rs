//! Lexis - spaced-repetition scheduling for vocabulary learning
//!
//! Lexis tracks learnable items for words and schedules their reviews with
//! the SM-2 algorithm. Items live in a pluggable store; the study service
//! grades reviews, builds study queues and reports progress.

pub mod cli;
pub mod config;
pub mod core;
pub mod error;
pub mod srs;
pub mod storage;
pub mod study;

pub use config::{Config, SrsConfig, StorageConfig};
pub use core::{
    CancellationToken, Clock, FixedClock, Grade, ItemId, LearnableItem, LearningStatus,
    OperationContext, RetentionState, ReviewLog, SystemClock,
};
pub use error::{ErrorKind, LexisError, Result};
pub use srs::{preview, GradePreview, Sm2Strategy, SrsStrategy};
pub use storage::{FileItemStore, ItemStore, MemoryItemStore, StoreAggregate};
pub use study::{clamp_limit, ItemPreview, ReviewOutcome, StudyService, StudyStats};

// CLI commands
pub use cli::{
    AddCommand, HistoryCommand, PreviewCommand, QueueCommand, RemoveWordCommand, ReviewCommand,
    StatsCommand,
};
