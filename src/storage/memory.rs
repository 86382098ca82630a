//! In-memory item storage.
//!
//! A thread-safe implementation of the ItemStore trait, used by tests and by
//! embedders that keep items elsewhere and only need the engine.

use std::collections::HashMap;
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use chrono::{DateTime, Utc};

use crate::core::{ItemId, LearnableItem, LearningStatus, ReviewLog, SrsUpdate};
use crate::error::{LexisError, Result};
use crate::storage::query::{select_by_status, select_due, select_study_queue};
use crate::storage::{ItemRecord, ItemStore, StoreAggregate, DEFAULT_HISTORY_LIMIT};

/// In-memory item store.
///
/// Thread-safe implementation using `RwLock<HashMap>`. Updates run under
/// the write guard, so the version check and write are one step.
#[derive(Debug)]
pub struct MemoryItemStore {
    records: RwLock<HashMap<ItemId, ItemRecord>>,
    history_limit: usize,
}

impl Default for MemoryItemStore {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryItemStore {
    /// Create a new empty in-memory store.
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            history_limit: DEFAULT_HISTORY_LIMIT,
        }
    }

    /// Keep at most `limit` review log entries per item.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Get the number of items in the store.
    pub fn len(&self) -> usize {
        self.read().len()
    }

    /// Check if the store is empty.
    pub fn is_empty(&self) -> bool {
        self.read().is_empty()
    }

    fn read(&self) -> RwLockReadGuard<'_, HashMap<ItemId, ItemRecord>> {
        self.records.read().unwrap_or_else(|e| e.into_inner())
    }

    fn write(&self) -> RwLockWriteGuard<'_, HashMap<ItemId, ItemRecord>> {
        self.records.write().unwrap_or_else(|e| e.into_inner())
    }
}

impl ItemStore for MemoryItemStore {
    fn get(&self, id: &ItemId) -> Result<Option<LearnableItem>> {
        Ok(self.read().get(id).map(|r| r.item.clone()))
    }

    fn insert(&self, item: &LearnableItem) -> Result<()> {
        let mut records = self.write();
        if records.contains_key(&item.id) {
            return Err(LexisError::invalid_input(format!(
                "learnable item {} already exists",
                item.id
            )));
        }
        records.insert(item.id.clone(), ItemRecord::new(item.clone()));
        Ok(())
    }

    fn update_srs(&self, update: &SrsUpdate) -> Result<LearnableItem> {
        let mut records = self.write();
        let record = records
            .get_mut(&update.id)
            .ok_or_else(|| LexisError::not_found(update.id.as_str()))?;
        record.apply_update(update, self.history_limit)?;
        Ok(record.item.clone())
    }

    fn list_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = self.read();
        Ok(select_due(records.values().map(|r| &r.item), now, limit))
    }

    fn list_by_status(&self, status: LearningStatus, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = self.read();
        Ok(select_by_status(
            records.values().map(|r| &r.item),
            status,
            limit,
        ))
    }

    fn list_study_queue(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = self.read();
        Ok(select_study_queue(
            records.values().map(|r| &r.item),
            now,
            limit,
        ))
    }

    fn aggregate(&self, now: DateTime<Utc>) -> Result<StoreAggregate> {
        let records = self.read();
        Ok(StoreAggregate::from_items(
            records.values().map(|r| &r.item),
            now,
        ))
    }

    fn review_history(&self, id: &ItemId, limit: usize) -> Result<Vec<ReviewLog>> {
        self.read()
            .get(id)
            .map(|r| r.recent_history(limit))
            .ok_or_else(|| LexisError::not_found(id.as_str()))
    }

    fn delete_word(&self, word_id: &str) -> Result<usize> {
        let mut records = self.write();
        let before = records.len();
        records.retain(|_, r| r.item.word_id != word_id);
        Ok(before - records.len())
    }
}
