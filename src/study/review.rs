//! Grading an item.
//!
//! A review is one read, one pure computation and one conditional write:
//! 1. Validate the grade (no store call on failure)
//! 2. Load the item and remember its version
//! 3. Compute the next retention state with the strategy
//! 4. Compare-and-swap the SRS fields plus a review log entry

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{
    Grade, ItemId, LearnableItem, LearningStatus, OperationContext, ReviewLog, SrsUpdate,
};
use crate::error::{LexisError, Result};
use crate::study::StudyService;

/// Result of a successful review.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ReviewOutcome {
    /// The item with its new schedule.
    pub item: LearnableItem,
    pub previous_status: LearningStatus,
    pub status_changed: bool,
}

impl StudyService {
    /// Record a review of `item_id` graded `grade` at `now`.
    ///
    /// # Errors
    ///
    /// - `InvalidGrade` if `grade` is outside `[1, 5]`, before touching the store
    /// - `NotFound` if the item does not exist (or vanished mid-review)
    /// - `Conflict` if another writer updated the item first
    /// - `Cancelled` / `DeadlineExceeded` from the context
    pub fn review(
        &self,
        ctx: &OperationContext,
        item_id: &ItemId,
        grade: i64,
        duration_ms: Option<u32>,
        now: DateTime<Utc>,
    ) -> Result<ReviewOutcome> {
        let grade = Grade::new(grade)?;

        ctx.check()?;
        let item = self
            .store()
            .get(item_id)?
            .ok_or_else(|| LexisError::not_found(item_id.as_str()))?;

        let before = item.retention().clone();
        let after = self.strategy().compute(&before, grade, now);

        let update = SrsUpdate {
            id: item.id.clone(),
            expected_version: item.version(),
            retention: after.clone(),
            updated_at: now,
            log: ReviewLog {
                item_id: item.id.clone(),
                grade,
                duration_ms,
                reviewed_at: now,
                before: before.clone(),
                after,
            },
        };

        ctx.check()?;
        let stored = match self.store().update_srs(&update) {
            Ok(stored) => stored,
            Err(e @ LexisError::Conflict { .. }) => {
                tracing::warn!(item_id = %item.id, error = %e, "review lost a concurrent update");
                return Err(e);
            }
            Err(e) => return Err(e),
        };

        let previous_status = before.learning_status;
        let status_changed = stored.learning_status() != previous_status;

        tracing::info!(
            item_id = %stored.id,
            grade = grade.value(),
            strategy = self.strategy().name(),
            from = %previous_status,
            to = %stored.learning_status(),
            interval = stored.interval(),
            "review recorded"
        );

        Ok(ReviewOutcome {
            item: stored,
            previous_status,
            status_changed,
        })
    }
}
