//! Read-only selections of items to study.

use chrono::{DateTime, Utc};

use crate::core::{LearnableItem, LearningStatus, OperationContext};
use crate::error::Result;
use crate::study::{clamp_limit, StudyService};

impl StudyService {
    /// Reviewed items whose next review is strictly before `now`, earliest first.
    pub fn due_for_review(
        &self,
        ctx: &OperationContext,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<LearnableItem>> {
        let limit = clamp_limit(limit);
        ctx.check()?;
        let items = self.store().list_due(now, limit)?;
        tracing::debug!(limit, returned = items.len(), "due items listed");
        Ok(items)
    }

    /// Items in `status`, oldest first.
    pub fn by_status(
        &self,
        ctx: &OperationContext,
        status: LearningStatus,
        limit: i64,
    ) -> Result<Vec<LearnableItem>> {
        let limit = clamp_limit(limit);
        ctx.check()?;
        let items = self.store().list_by_status(status, limit)?;
        tracing::debug!(%status, limit, returned = items.len(), "items listed by status");
        Ok(items)
    }

    /// New items plus due items, ordered by next review (creation time for
    /// new items).
    pub fn study_queue(
        &self,
        ctx: &OperationContext,
        limit: i64,
        now: DateTime<Utc>,
    ) -> Result<Vec<LearnableItem>> {
        let limit = clamp_limit(limit);
        ctx.check()?;
        let items = self.store().list_study_queue(now, limit)?;
        tracing::debug!(limit, returned = items.len(), "study queue listed");
        Ok(items)
    }
}
