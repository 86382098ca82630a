//! Per-item review history.

use crate::core::{ItemId, OperationContext, ReviewLog};
use crate::error::Result;
use crate::study::{clamp_limit, StudyService};

impl StudyService {
    /// The item's most recent reviews, newest first.
    ///
    /// Fails with `NotFound` for an unknown item.
    pub fn history(
        &self,
        ctx: &OperationContext,
        item_id: &ItemId,
        limit: i64,
    ) -> Result<Vec<ReviewLog>> {
        let limit = clamp_limit(limit);
        ctx.check()?;
        self.store().review_history(item_id, limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LexisError;
    use crate::study::testing::{memory_service, t0};
    use chrono::Duration;

    #[test]
    fn test_history_newest_first() {
        let (service, _store) = memory_service();
        let ctx = OperationContext::background();
        let id = ItemId::parse("m1").unwrap();
        service.add_item(&ctx, "apple", Some(id.clone()), t0()).unwrap();

        for (day, grade) in [(0, 4), (1, 2), (2, 5)] {
            service
                .review(&ctx, &id, grade, Some(1000), t0() + Duration::days(day))
                .unwrap();
        }

        let history = service.history(&ctx, &id, 10).unwrap();
        let grades: Vec<u8> = history.iter().map(|l| l.grade.value()).collect();
        assert_eq!(grades, vec![5, 2, 4]);

        let latest = service.history(&ctx, &id, 1).unwrap();
        assert_eq!(latest.len(), 1);
        assert_eq!(latest[0].reviewed_at, t0() + Duration::days(2));
    }

    #[test]
    fn test_history_of_unreviewed_item_is_empty() {
        let (service, _store) = memory_service();
        let ctx = OperationContext::background();
        let item = service.add_item(&ctx, "apple", None, t0()).unwrap();
        assert!(service.history(&ctx, &item.id, 0).unwrap().is_empty());
    }

    #[test]
    fn test_history_unknown_item() {
        let (service, _store) = memory_service();
        let err = service
            .history(
                &OperationContext::background(),
                &ItemId::parse("ghost").unwrap(),
                10,
            )
            .unwrap_err();
        assert!(matches!(err, LexisError::NotFound { .. }));
    }
}
