//! Aggregate study statistics.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::core::{LearningStatus, OperationContext};
use crate::error::Result;
use crate::storage::StoreAggregate;
use crate::study::StudyService;

/// Counts across the whole store at one point in time.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StudyStats {
    /// Distinct owning words.
    pub total_words: usize,
    pub total_items: usize,
    pub new_count: usize,
    pub learning_count: usize,
    pub review_count: usize,
    pub mastered_count: usize,
    /// New plus overdue items, i.e. the study queue's size without a limit.
    pub due_for_review_count: usize,
}

impl StudyStats {
    /// Share of items that reached Mastered, in `[0, 1]`.
    pub fn mastery_ratio(&self) -> f64 {
        if self.total_items == 0 {
            0.0
        } else {
            self.mastered_count as f64 / self.total_items as f64
        }
    }
}

impl From<StoreAggregate> for StudyStats {
    fn from(aggregate: StoreAggregate) -> Self {
        Self {
            total_words: aggregate.distinct_words,
            total_items: aggregate.items,
            new_count: aggregate.count(LearningStatus::New),
            learning_count: aggregate.count(LearningStatus::Learning),
            review_count: aggregate.count(LearningStatus::Review),
            mastered_count: aggregate.count(LearningStatus::Mastered),
            due_for_review_count: aggregate.queued,
        }
    }
}

impl StudyService {
    /// Aggregate counts as of `now`.
    pub fn stats(&self, ctx: &OperationContext, now: DateTime<Utc>) -> Result<StudyStats> {
        ctx.check()?;
        let stats = StudyStats::from(self.store().aggregate(now)?);
        tracing::debug!(
            total_items = stats.total_items,
            due = stats.due_for_review_count,
            "stats aggregated"
        );
        Ok(stats)
    }
}
