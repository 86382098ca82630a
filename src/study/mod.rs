//! The study engine.
//!
//! [`StudyService`] ties a store to a scheduling strategy. It owns no mutable
//! state: every call is an independent request that checks its
//! [`OperationContext`] before each store call and takes `now` explicitly.
//!
//! - [`review`]: grade an item and persist the new schedule
//! - [`queue`]: due, per-status and study-queue listings
//! - [`stats`]: aggregate counts
//! - [`history`]: per-item review log

pub mod history;
pub mod queue;
pub mod review;
pub mod stats;

use std::sync::Arc;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::core::{ItemId, LearnableItem, OperationContext};
use crate::error::{LexisError, Result};
use crate::srs::{preview, GradePreview, SrsStrategy};
use crate::storage::ItemStore;

pub use review::ReviewOutcome;
pub use stats::StudyStats;

/// Limit used when the caller passes zero or a negative number.
pub const DEFAULT_LIMIT: usize = 10;

/// Largest page any listing returns.
pub const MAX_LIMIT: usize = 100;

/// Normalize a caller-supplied limit: `<= 0` becomes the default, anything
/// above the maximum is capped.
pub fn clamp_limit(limit: i64) -> usize {
    if limit <= 0 {
        DEFAULT_LIMIT
    } else {
        usize::try_from(limit).map_or(MAX_LIMIT, |l| l.min(MAX_LIMIT))
    }
}

/// An item together with the outcome of every possible grade.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ItemPreview {
    pub item: LearnableItem,
    pub outcomes: Vec<GradePreview>,
}

/// Spaced-repetition engine over an item store.
#[derive(Clone)]
pub struct StudyService {
    store: Arc<dyn ItemStore>,
    strategy: Arc<dyn SrsStrategy>,
}

impl std::fmt::Debug for StudyService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StudyService")
            .field("strategy", &self.strategy.name())
            .finish_non_exhaustive()
    }
}

impl StudyService {
    pub fn new(store: Arc<dyn ItemStore>, strategy: Arc<dyn SrsStrategy>) -> Self {
        Self { store, strategy }
    }

    pub fn store(&self) -> &dyn ItemStore {
        self.store.as_ref()
    }

    pub fn strategy(&self) -> &dyn SrsStrategy {
        self.strategy.as_ref()
    }

    /// Create a new, never-reviewed item for `word_id`.
    ///
    /// Generates an id when none is given.
    pub fn add_item(
        &self,
        ctx: &OperationContext,
        word_id: &str,
        id: Option<ItemId>,
        now: DateTime<Utc>,
    ) -> Result<LearnableItem> {
        let word_id = word_id.trim();
        if word_id.is_empty() {
            return Err(LexisError::invalid_input("word id must not be empty"));
        }

        let item = LearnableItem::new(id.unwrap_or_else(ItemId::generate), word_id, now);

        ctx.check()?;
        self.store.insert(&item)?;

        tracing::info!(item_id = %item.id, word_id = %item.word_id, "learnable item added");
        Ok(item)
    }

    /// Delete every item belonging to `word_id`.
    pub fn remove_word(&self, ctx: &OperationContext, word_id: &str) -> Result<usize> {
        let word_id = word_id.trim();
        if word_id.is_empty() {
            return Err(LexisError::invalid_input("word id must not be empty"));
        }

        ctx.check()?;
        let removed = self.store.delete_word(word_id)?;
        tracing::info!(word_id, removed, "word removed");
        Ok(removed)
    }

    /// What each grade would do to the item, without persisting anything.
    pub fn preview(
        &self,
        ctx: &OperationContext,
        id: &ItemId,
        now: DateTime<Utc>,
    ) -> Result<ItemPreview> {
        ctx.check()?;
        let item = self
            .store
            .get(id)?
            .ok_or_else(|| LexisError::not_found(id.as_str()))?;

        let outcomes = preview(self.strategy.as_ref(), item.retention(), now);
        Ok(ItemPreview { item, outcomes })
    }
}
