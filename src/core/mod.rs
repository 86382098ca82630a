//! Core domain types for Lexis.
//!
//! - [`item`]: learnable items, retention state, grades and review logs
//! - [`clock`]: injectable time sources
//! - [`context`]: per-request cancellation and deadlines

pub mod clock;
pub mod context;
pub mod item;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{CancellationToken, OperationContext};
pub use item::{
    Grade, ItemId, LearnableItem, LearningStatus, RetentionState, ReviewLog, SrsUpdate,
    DEFAULT_EASE_FACTOR, DEFAULT_EASE_FLOOR,
};
