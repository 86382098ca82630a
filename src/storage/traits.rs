//! Item storage traits for Lexis.
//!
//! This module defines the `ItemStore` trait, the boundary between the
//! scheduling engine and whatever persists learnable items.

use std::sync::Arc;

use chrono::{DateTime, Utc};

use crate::core::{ItemId, LearnableItem, LearningStatus, ReviewLog, SrsUpdate};
use crate::error::Result;
use crate::storage::StoreAggregate;

/// Trait for learnable-item storage backends.
///
/// Listing methods receive an already clamped `limit`. Implementations must
/// apply `update_srs` atomically with its version check and log entry.
pub trait ItemStore: Send + Sync {
    /// Retrieve an item by ID.
    ///
    /// Returns `Ok(None)` if the item doesn't exist.
    fn get(&self, id: &ItemId) -> Result<Option<LearnableItem>>;

    /// Store a newly created item.
    ///
    /// Fails with `InvalidInput` if the id is taken.
    fn insert(&self, item: &LearnableItem) -> Result<()>;

    /// Persist new SRS fields and the matching review log entry.
    ///
    /// Fails with `NotFound` if the item vanished and `Conflict` if its
    /// version is no longer `update.expected_version`. Returns the stored item.
    fn update_srs(&self, update: &SrsUpdate) -> Result<LearnableItem>;

    /// Items with `next_review_at` strictly before `now`, earliest first.
    fn list_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>>;

    /// Items in `status`, oldest first.
    fn list_by_status(&self, status: LearningStatus, limit: usize) -> Result<Vec<LearnableItem>>;

    /// New or due items, by next review falling back to creation time.
    fn list_study_queue(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>>;

    /// Counts from a single consistent read.
    fn aggregate(&self, now: DateTime<Utc>) -> Result<StoreAggregate>;

    /// Up to `limit` review log entries for an item, newest first.
    ///
    /// Fails with `NotFound` if the item doesn't exist.
    fn review_history(&self, id: &ItemId, limit: usize) -> Result<Vec<ReviewLog>>;

    /// Delete every item owned by `word_id`. Returns how many were removed.
    fn delete_word(&self, word_id: &str) -> Result<usize>;

    /// Check if an item exists.
    fn exists(&self, id: &ItemId) -> Result<bool> {
        Ok(self.get(id)?.is_some())
    }
}

/// Blanket implementation of ItemStore for Arc-wrapped stores.
///
/// This allows using `Arc<T>` where `T: ItemStore` is expected,
/// which is useful for sharing stores between tests and services.
impl<T: ItemStore + ?Sized> ItemStore for Arc<T> {
    fn get(&self, id: &ItemId) -> Result<Option<LearnableItem>> {
        (**self).get(id)
    }

    fn insert(&self, item: &LearnableItem) -> Result<()> {
        (**self).insert(item)
    }

    fn update_srs(&self, update: &SrsUpdate) -> Result<LearnableItem> {
        (**self).update_srs(update)
    }

    fn list_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        (**self).list_due(now, limit)
    }

    fn list_by_status(&self, status: LearningStatus, limit: usize) -> Result<Vec<LearnableItem>> {
        (**self).list_by_status(status, limit)
    }

    fn list_study_queue(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        (**self).list_study_queue(now, limit)
    }

    fn aggregate(&self, now: DateTime<Utc>) -> Result<StoreAggregate> {
        (**self).aggregate(now)
    }

    fn review_history(&self, id: &ItemId, limit: usize) -> Result<Vec<ReviewLog>> {
        (**self).review_history(id, limit)
    }

    fn delete_word(&self, word_id: &str) -> Result<usize> {
        (**self).delete_word(word_id)
    }
}
