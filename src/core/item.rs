//! Learnable item types for Lexis.
//!
//! A [`LearnableItem`] is the unit under spaced repetition: one per
//! word-meaning or card. Its scheduling fields are grouped as a
//! [`RetentionState`], which is exactly what an SRS strategy consumes and
//! produces. The retention state is not publicly mutable; the only way to
//! change it is applying an [`SrsUpdate`] produced by a review.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{LexisError, Result};

/// Lowest ease factor an item can reach.
pub const DEFAULT_EASE_FLOOR: f64 = 1.3;

/// Ease factor assigned to newly created items.
pub const DEFAULT_EASE_FACTOR: f64 = 2.5;

/// Maximum length of an item identifier.
pub const MAX_ID_LEN: usize = 128;

/// Stable identifier of a learnable item.
///
/// Restricted to ASCII alphanumerics, `-` and `_` so it can double as a file
/// name in the file store. Letters are lowercased on parse, so `A1` and `a1`
/// are the same item, also on case-insensitive file systems.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct ItemId(String);

impl ItemId {
    /// Parse and validate an identifier.
    pub fn parse(value: impl Into<String>) -> Result<Self> {
        let value = value.into();
        if value.is_empty() || value.len() > MAX_ID_LEN {
            return Err(LexisError::invalid_input(format!(
                "item id must be 1..={} characters, got {}",
                MAX_ID_LEN,
                value.len()
            )));
        }
        if let Some(bad) = value
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '-' || *c == '_'))
        {
            return Err(LexisError::invalid_input(format!(
                "item id '{}' contains invalid character '{}'",
                value, bad
            )));
        }
        Ok(Self(value.to_ascii_lowercase()))
    }

    /// Generate a fresh random identifier.
    pub fn generate() -> Self {
        Self(uuid::Uuid::new_v4().to_string())
    }

    /// The identifier as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for ItemId {
    type Error = LexisError;

    fn try_from(value: String) -> Result<Self> {
        Self::parse(value)
    }
}

impl From<ItemId> for String {
    fn from(id: ItemId) -> Self {
        id.0
    }
}

impl FromStr for ItemId {
    type Err = LexisError;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}

/// Learning status of an item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum LearningStatus {
    /// Never reviewed.
    #[default]
    New,
    /// Recently introduced or recently failed.
    Learning,
    /// Graduated out of the initial learning phase.
    Review,
    /// Durably learned.
    Mastered,
}

impl LearningStatus {
    /// All statuses, in lifecycle order.
    pub const ALL: [LearningStatus; 4] = [
        LearningStatus::New,
        LearningStatus::Learning,
        LearningStatus::Review,
        LearningStatus::Mastered,
    ];

    /// Lowercase name used in config, CLI and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            LearningStatus::New => "new",
            LearningStatus::Learning => "learning",
            LearningStatus::Review => "review",
            LearningStatus::Mastered => "mastered",
        }
    }
}

impl fmt::Display for LearningStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for LearningStatus {
    type Err = LexisError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "new" => Ok(LearningStatus::New),
            "learning" => Ok(LearningStatus::Learning),
            "review" => Ok(LearningStatus::Review),
            "mastered" => Ok(LearningStatus::Mastered),
            other => Err(LexisError::invalid_input(format!(
                "unknown learning status '{}' (expected new, learning, review or mastered)",
                other
            ))),
        }
    }
}

/// A validated recall grade.
///
/// 1 means forgotten, 5 means perfect recall. Values outside `[1, 5]` cannot
/// be constructed, so strategies never see an invalid grade.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(try_from = "i64", into = "u8")]
pub struct Grade(u8);

impl Grade {
    /// Lowest valid grade.
    pub const MIN: u8 = 1;
    /// Highest valid grade.
    pub const MAX: u8 = 5;
    /// Lowest grade that counts as a successful recall.
    pub const PASSING: u8 = 3;

    /// Validate a raw grade.
    pub fn new(value: i64) -> Result<Self> {
        if (i64::from(Self::MIN)..=i64::from(Self::MAX)).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(LexisError::invalid_grade(value))
        }
    }

    /// Every valid grade, ascending.
    pub fn all() -> impl Iterator<Item = Grade> {
        (Self::MIN..=Self::MAX).map(Grade)
    }

    /// The numeric value.
    pub fn value(self) -> u8 {
        self.0
    }

    /// Whether this grade counts as a successful recall.
    pub fn is_passing(self) -> bool {
        self.0 >= Self::PASSING
    }
}

impl TryFrom<i64> for Grade {
    type Error = LexisError;

    fn try_from(value: i64) -> Result<Self> {
        Self::new(value)
    }
}

impl From<Grade> for u8 {
    fn from(grade: Grade) -> Self {
        grade.0
    }
}

impl fmt::Display for Grade {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The spaced-repetition fields of an item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetentionState {
    pub learning_status: LearningStatus,
    /// Days until the next review. `None` only while new.
    pub interval: Option<u32>,
    pub ease_factor: Option<f64>,
    pub review_count: Option<u32>,
    pub next_review_at: Option<DateTime<Utc>>,
}

impl Default for RetentionState {
    fn default() -> Self {
        Self::new_item()
    }
}

impl RetentionState {
    /// State of a freshly created item.
    pub fn new_item() -> Self {
        Self {
            learning_status: LearningStatus::New,
            interval: None,
            ease_factor: Some(DEFAULT_EASE_FACTOR),
            review_count: None,
            next_review_at: None,
        }
    }

    /// Review count with unset treated as zero.
    pub fn reviews(&self) -> u32 {
        self.review_count.unwrap_or(0)
    }

    /// Whether the item has ever been reviewed.
    pub fn is_reviewed(&self) -> bool {
        self.reviews() > 0
    }

    /// Whether the item is due strictly before `now`.
    pub fn is_due(&self, now: DateTime<Utc>) -> bool {
        self.next_review_at.is_some_and(|at| at < now)
    }

    /// Check the data-model invariants against the given ease floor.
    ///
    /// Returns a description of the first violation found.
    pub fn check_invariants(&self, ease_floor: f64) -> std::result::Result<(), String> {
        if let Some(ease) = self.ease_factor {
            if !ease.is_finite() || ease < ease_floor {
                return Err(format!("ease factor {} is below floor {}", ease, ease_floor));
            }
        }
        let never_reviewed =
            self.learning_status == LearningStatus::New && self.review_count.is_none();
        if never_reviewed != self.next_review_at.is_none() {
            return Err(format!(
                "next_review_at must be unset exactly when never reviewed (status {}, review_count {:?})",
                self.learning_status, self.review_count
            ));
        }
        if self.is_reviewed() && self.interval.is_none() {
            return Err("interval must be set once reviewed".to_string());
        }
        Ok(())
    }
}

/// A learnable item under spaced repetition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LearnableItem {
    pub id: ItemId,
    /// Owning word/card. Deleting it cascades to its items.
    pub word_id: String,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    /// Bumped on every SRS update; used for compare-and-swap.
    pub(crate) version: u64,
    #[serde(flatten)]
    pub(crate) retention: RetentionState,
}

impl LearnableItem {
    /// Create a new, never-reviewed item.
    pub fn new(id: ItemId, word_id: impl Into<String>, created_at: DateTime<Utc>) -> Self {
        Self {
            id,
            word_id: word_id.into(),
            created_at,
            updated_at: created_at,
            version: 0,
            retention: RetentionState::new_item(),
        }
    }

    /// Rebuild an item from persisted fields.
    ///
    /// For store implementations that keep items outside this crate.
    pub fn restore(
        id: ItemId,
        word_id: impl Into<String>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: u64,
        retention: RetentionState,
    ) -> Self {
        Self {
            id,
            word_id: word_id.into(),
            created_at,
            updated_at,
            version,
            retention,
        }
    }

    pub fn retention(&self) -> &RetentionState {
        &self.retention
    }

    pub fn learning_status(&self) -> LearningStatus {
        self.retention.learning_status
    }

    pub fn interval(&self) -> Option<u32> {
        self.retention.interval
    }

    pub fn ease_factor(&self) -> Option<f64> {
        self.retention.ease_factor
    }

    pub fn review_count(&self) -> Option<u32> {
        self.retention.review_count
    }

    pub fn next_review_at(&self) -> Option<DateTime<Utc>> {
        self.retention.next_review_at
    }

    pub fn version(&self) -> u64 {
        self.version
    }

    /// Timestamp the study queue orders by: next review, else creation.
    pub fn effective_due_at(&self) -> DateTime<Utc> {
        self.retention.next_review_at.unwrap_or(self.created_at)
    }

    /// Whether this item belongs in the study queue at `now`.
    pub fn is_queued(&self, now: DateTime<Utc>) -> bool {
        self.retention.learning_status == LearningStatus::New || self.retention.is_due(now)
    }

    /// Apply a persisted SRS update. Only stores call this.
    pub(crate) fn apply(&mut self, update: &SrsUpdate) {
        self.retention = update.retention.clone();
        self.updated_at = update.updated_at;
        self.version = update.expected_version + 1;
    }
}

/// The only write the engine performs: new SRS fields for one item.
///
/// Stores must apply it atomically and only if the stored version still
/// equals `expected_version`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SrsUpdate {
    pub id: ItemId,
    pub expected_version: u64,
    pub retention: RetentionState,
    pub updated_at: DateTime<Utc>,
    /// History entry written in the same atomic step.
    pub log: ReviewLog,
}

/// One completed review.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ReviewLog {
    pub item_id: ItemId,
    pub grade: Grade,
    #[serde(skip_serializing_if = "Option::is_none", default)]
    pub duration_ms: Option<u32>,
    pub reviewed_at: DateTime<Utc>,
    pub before: RetentionState,
    pub after: RetentionState,
}
