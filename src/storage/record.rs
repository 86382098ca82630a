//! Stored form of an item: the item plus its bounded review log.

use serde::{Deserialize, Serialize};

use crate::core::{LearnableItem, ReviewLog, SrsUpdate};
use crate::error::{LexisError, Result};

/// An item and its review history, oldest entry first.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ItemRecord {
    pub item: LearnableItem,
    #[serde(default)]
    pub history: Vec<ReviewLog>,
}

impl ItemRecord {
    pub fn new(item: LearnableItem) -> Self {
        Self {
            item,
            history: Vec::new(),
        }
    }

    /// Compare-and-swap the SRS fields and append the log entry.
    ///
    /// Leaves the record untouched on a version mismatch. At most
    /// `history_limit` entries are kept.
    pub fn apply_update(&mut self, update: &SrsUpdate, history_limit: usize) -> Result<()> {
        if self.item.version() != update.expected_version {
            return Err(LexisError::conflict(
                update.id.as_str(),
                update.expected_version,
                self.item.version(),
            ));
        }

        self.item.apply(update);
        self.history.push(update.log.clone());
        if self.history.len() > history_limit {
            let excess = self.history.len() - history_limit;
            self.history.drain(..excess);
        }
        Ok(())
    }

    /// Up to `limit` log entries, newest first.
    pub fn recent_history(&self, limit: usize) -> Vec<ReviewLog> {
        self.history.iter().rev().take(limit).cloned().collect()
    }
}
