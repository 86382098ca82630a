//! Spaced-repetition scheduling strategies.
//!
//! A strategy is a pure function from `(retention state, grade, now)` to the
//! next retention state. It performs no I/O and cannot fail: grades are
//! validated when the [`Grade`] is constructed.

pub mod sm2;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{Grade, LearningStatus, RetentionState};

pub use sm2::Sm2Strategy;

/// A pluggable scheduling algorithm.
pub trait SrsStrategy: Send + Sync {
    /// Short identifier used in logs.
    fn name(&self) -> &'static str;

    /// Compute the retention state after a review graded `grade` at `now`.
    fn compute(&self, state: &RetentionState, grade: Grade, now: DateTime<Utc>) -> RetentionState;
}

/// What one grade would do to an item.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GradePreview {
    pub grade: Grade,
    pub state: RetentionState,
    pub status_changed: bool,
}

impl GradePreview {
    /// The status the item would end up in.
    pub fn learning_status(&self) -> LearningStatus {
        self.state.learning_status
    }
}

/// Outcome of every grade for `state`, ascending by grade.
///
/// Nothing is persisted; this answers "what would each answer do".
pub fn preview(
    strategy: &dyn SrsStrategy,
    state: &RetentionState,
    now: DateTime<Utc>,
) -> Vec<GradePreview> {
    Grade::all()
        .map(|grade| {
            let next = strategy.compute(state, grade, now);
            GradePreview {
                grade,
                status_changed: next.learning_status != state.learning_status,
                state: next,
            }
        })
        .collect()
}
