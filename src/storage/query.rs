//! Selection, ordering and aggregation shared by the reference stores.
//!
//! Every listing is a filter, a stable sort and a truncation. Ties on the
//! primary timestamp break on `created_at`, then on id, so two stores holding
//! the same items return them in the same order.

use std::cmp::Ordering;
use std::collections::HashSet;

use chrono::{DateTime, Utc};

use crate::core::{LearnableItem, LearningStatus};

/// Counts a store reports from one consistent read.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreAggregate {
    /// Distinct owning words.
    pub distinct_words: usize,
    pub items: usize,
    /// Items per status, indexed in [`LearningStatus::ALL`] order.
    pub by_status: [usize; 4],
    /// Items the study queue would include at the aggregation time.
    pub queued: usize,
}

impl StoreAggregate {
    /// Aggregate a snapshot of items.
    pub fn from_items<'a>(
        items: impl IntoIterator<Item = &'a LearnableItem>,
        now: DateTime<Utc>,
    ) -> Self {
        let mut words = HashSet::new();
        let mut aggregate = StoreAggregate::default();

        for item in items {
            words.insert(item.word_id.as_str());
            aggregate.items += 1;
            aggregate.by_status[status_index(item.learning_status())] += 1;
            if item.is_queued(now) {
                aggregate.queued += 1;
            }
        }

        aggregate.distinct_words = words.len();
        aggregate
    }

    /// Number of items in `status`.
    pub fn count(&self, status: LearningStatus) -> usize {
        self.by_status[status_index(status)]
    }
}

fn status_index(status: LearningStatus) -> usize {
    match status {
        LearningStatus::New => 0,
        LearningStatus::Learning => 1,
        LearningStatus::Review => 2,
        LearningStatus::Mastered => 3,
    }
}

/// Items due strictly before `now`, earliest first.
pub fn select_due<'a>(
    items: impl IntoIterator<Item = &'a LearnableItem>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<LearnableItem> {
    select(
        items,
        |item| item.retention().is_due(now),
        by_effective_due,
        limit,
    )
}

/// Items in `status`, oldest first.
pub fn select_by_status<'a>(
    items: impl IntoIterator<Item = &'a LearnableItem>,
    status: LearningStatus,
    limit: usize,
) -> Vec<LearnableItem> {
    select(
        items,
        |item| item.learning_status() == status,
        by_created,
        limit,
    )
}

/// New items plus due items, by next review (creation time for new items).
pub fn select_study_queue<'a>(
    items: impl IntoIterator<Item = &'a LearnableItem>,
    now: DateTime<Utc>,
    limit: usize,
) -> Vec<LearnableItem> {
    select(items, |item| item.is_queued(now), by_effective_due, limit)
}

fn select<'a>(
    items: impl IntoIterator<Item = &'a LearnableItem>,
    keep: impl Fn(&LearnableItem) -> bool,
    order: fn(&LearnableItem, &LearnableItem) -> Ordering,
    limit: usize,
) -> Vec<LearnableItem> {
    let mut selected: Vec<&LearnableItem> = items.into_iter().filter(|item| keep(item)).collect();
    selected.sort_by(|a, b| order(a, b));
    selected.into_iter().take(limit).cloned().collect()
}

fn by_effective_due(a: &LearnableItem, b: &LearnableItem) -> Ordering {
    a.effective_due_at()
        .cmp(&b.effective_due_at())
        .then_with(|| by_created(a, b))
}

fn by_created(a: &LearnableItem, b: &LearnableItem) -> Ordering {
    a.created_at
        .cmp(&b.created_at)
        .then_with(|| a.id.cmp(&b.id))
}
