//! File-based item storage for Lexis.
//!
//! Each item is stored with its review log as one JSON file in
//! `~/.lexis/items/` (or the configured data directory). Atomic writes are
//! achieved via temp file + rename.
//!
//! Every read-check-write of one item runs while holding `.{id}.lock`, a
//! lock file created exclusively with `create_new`. The file system arbitrates
//! that creation, so separate store instances and separate processes on the
//! same directory serialize their writes to an item. A lock file older than
//! [`STALE_LOCK_AGE`] is assumed to belong to a crashed writer and is removed.

use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};
use std::sync::{Mutex, MutexGuard};
use std::thread;
use std::time::{Duration, Instant, SystemTime};

use chrono::{DateTime, Utc};

use crate::config::{items_dir, Config};
use crate::core::{ItemId, LearnableItem, LearningStatus, ReviewLog, SrsUpdate};
use crate::error::{LexisError, Result};
use crate::storage::query::{select_by_status, select_due, select_study_queue};
use crate::storage::{ItemRecord, ItemStore, StoreAggregate, DEFAULT_HISTORY_LIMIT};

/// How long a writer waits for an item lock before giving up.
pub const DEFAULT_LOCK_TIMEOUT: Duration = Duration::from_secs(5);

/// Age after which an item lock is treated as abandoned.
pub const STALE_LOCK_AGE: Duration = Duration::from_secs(30);

const LOCK_POLL_INTERVAL: Duration = Duration::from_millis(2);

/// Exclusive hold on one item's lock file. Removed on drop.
#[derive(Debug)]
struct ItemLock {
    path: PathBuf,
}

impl ItemLock {
    fn acquire(path: PathBuf, timeout: Duration) -> Result<Self> {
        let started = Instant::now();
        loop {
            match fs::OpenOptions::new()
                .write(true)
                .create_new(true)
                .open(&path)
            {
                Ok(mut file) => {
                    let _ = writeln!(file, "{}", std::process::id());
                    return Ok(Self { path });
                }
                Err(e) if e.kind() == io::ErrorKind::AlreadyExists => {
                    if lock_is_stale(&path) {
                        tracing::warn!(path = %path.display(), "removing stale item lock");
                        let _ = fs::remove_file(&path);
                        continue;
                    }
                    if started.elapsed() >= timeout {
                        return Err(LexisError::storage(
                            &path,
                            io::Error::new(
                                io::ErrorKind::TimedOut,
                                "item is locked by another writer",
                            ),
                        ));
                    }
                    thread::sleep(LOCK_POLL_INTERVAL);
                }
                Err(e) => return Err(LexisError::storage(&path, e)),
            }
        }
    }
}

impl Drop for ItemLock {
    fn drop(&mut self) {
        let _ = fs::remove_file(&self.path);
    }
}

fn lock_is_stale(path: &Path) -> bool {
    fs::metadata(path)
        .and_then(|m| m.modified())
        .ok()
        .and_then(|modified| SystemTime::now().duration_since(modified).ok())
        .is_some_and(|age| age > STALE_LOCK_AGE)
}

/// File-based item storage.
///
/// Stores items as JSON files in a configurable directory.
/// Uses atomic writes via temp file + rename pattern.
#[derive(Debug)]
pub struct FileItemStore {
    /// Directory where item files are stored.
    items_dir: PathBuf,
    history_limit: usize,
    lock_timeout: Duration,
    lock: Mutex<()>,
}

impl FileItemStore {
    /// Create a file item store in the default directory.
    ///
    /// Uses `~/.lexis/items/` or `$LEXIS_HOME/items/`.
    pub fn new() -> Result<Self> {
        let dir = items_dir().ok_or_else(|| {
            LexisError::config("could not determine items directory (no home directory)")
        })?;
        Self::with_dir(dir)
    }

    /// Create a file item store from loaded configuration.
    pub fn from_config(config: &Config) -> Result<Self> {
        let dir = config.data_dir().ok_or_else(|| {
            LexisError::config("could not determine items directory (no home directory)")
        })?;
        Ok(Self::with_dir(dir)?.with_history_limit(config.storage.history_limit))
    }

    /// Create a file item store with a custom directory.
    pub fn with_dir(items_dir: impl Into<PathBuf>) -> Result<Self> {
        let items_dir = items_dir.into();

        if !items_dir.exists() {
            fs::create_dir_all(&items_dir).map_err(|e| LexisError::storage(&items_dir, e))?;
        }

        Ok(Self {
            items_dir,
            history_limit: DEFAULT_HISTORY_LIMIT,
            lock_timeout: DEFAULT_LOCK_TIMEOUT,
            lock: Mutex::new(()),
        })
    }

    /// Keep at most `limit` review log entries per item.
    pub fn with_history_limit(mut self, limit: usize) -> Self {
        self.history_limit = limit;
        self
    }

    /// Wait at most `timeout` for another writer to release an item.
    pub fn with_lock_timeout(mut self, timeout: Duration) -> Self {
        self.lock_timeout = timeout;
        self
    }

    /// The directory holding item files.
    pub fn dir(&self) -> &Path {
        &self.items_dir
    }

    fn item_path(&self, id: &ItemId) -> PathBuf {
        self.items_dir.join(format!("{}.json", id))
    }

    fn lock_path(&self, id: &ItemId) -> PathBuf {
        self.items_dir.join(format!(".{}.lock", id))
    }

    /// A temp path no other writer uses.
    fn temp_path(&self, id: &ItemId) -> PathBuf {
        self.items_dir.join(format!(
            ".{}.{}.{}.json.tmp",
            id,
            std::process::id(),
            uuid::Uuid::new_v4().simple()
        ))
    }

    fn guard(&self) -> MutexGuard<'_, ()> {
        self.lock.lock().unwrap_or_else(|e| e.into_inner())
    }

    fn lock_item(&self, id: &ItemId) -> Result<ItemLock> {
        ItemLock::acquire(self.lock_path(id), self.lock_timeout)
    }

    fn read_record(&self, id: &ItemId) -> Result<Option<ItemRecord>> {
        let path = self.item_path(id);

        if !path.exists() {
            return Ok(None);
        }

        let content = fs::read_to_string(&path).map_err(|e| LexisError::storage(&path, e))?;
        let record: ItemRecord = serde_json::from_str(&content)
            .map_err(|e| LexisError::serde(format!("{}: {}", path.display(), e)))?;

        Ok(Some(record))
    }

    /// Write a record atomically using temp file + rename.
    fn atomic_write(&self, record: &ItemRecord) -> Result<()> {
        let final_path = self.item_path(&record.item.id);
        let temp_path = self.temp_path(&record.item.id);

        let json = serde_json::to_string_pretty(record)?;

        {
            let mut file =
                fs::File::create(&temp_path).map_err(|e| LexisError::storage(&temp_path, e))?;
            file.write_all(json.as_bytes())
                .map_err(|e| LexisError::storage(&temp_path, e))?;
            file.sync_all()
                .map_err(|e| LexisError::storage(&temp_path, e))?;
        }

        // Rename temp file to final path (atomic on POSIX)
        if let Err(e) = fs::rename(&temp_path, &final_path) {
            let _ = fs::remove_file(&temp_path);
            return Err(LexisError::storage(&final_path, e));
        }

        Ok(())
    }

    /// Read every parseable record. Corrupt files are skipped with a warning.
    fn load_all(&self) -> Result<Vec<ItemRecord>> {
        if !self.items_dir.exists() {
            return Ok(Vec::new());
        }

        let entries =
            fs::read_dir(&self.items_dir).map_err(|e| LexisError::storage(&self.items_dir, e))?;

        let mut records = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|e| LexisError::storage(&self.items_dir, e))?;
            let path = entry.path();

            // Skip non-JSON files and temp files
            if path.extension().map(|e| e != "json").unwrap_or(true) {
                continue;
            }
            if path
                .file_name()
                .map(|n| n.to_string_lossy().starts_with('.'))
                .unwrap_or(true)
            {
                continue;
            }

            let content = match fs::read_to_string(&path) {
                Ok(content) => content,
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping unreadable item file");
                    continue;
                }
            };
            match serde_json::from_str::<ItemRecord>(&content) {
                Ok(record) => records.push(record),
                Err(e) => {
                    tracing::warn!(path = %path.display(), error = %e, "skipping corrupt item file");
                }
            }
        }

        Ok(records)
    }
}

impl ItemStore for FileItemStore {
    fn get(&self, id: &ItemId) -> Result<Option<LearnableItem>> {
        Ok(self.read_record(id)?.map(|r| r.item))
    }

    fn insert(&self, item: &LearnableItem) -> Result<()> {
        let _guard = self.guard();
        let _lock = self.lock_item(&item.id)?;
        if self.item_path(&item.id).exists() {
            return Err(LexisError::invalid_input(format!(
                "learnable item {} already exists",
                item.id
            )));
        }
        self.atomic_write(&ItemRecord::new(item.clone()))
    }

    fn update_srs(&self, update: &SrsUpdate) -> Result<LearnableItem> {
        let _guard = self.guard();
        let _lock = self.lock_item(&update.id)?;
        let mut record = self
            .read_record(&update.id)?
            .ok_or_else(|| LexisError::not_found(update.id.as_str()))?;
        record.apply_update(update, self.history_limit)?;
        self.atomic_write(&record)?;
        Ok(record.item)
    }

    fn list_due(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = {
            let _guard = self.guard();
            self.load_all()?
        };
        Ok(select_due(records.iter().map(|r| &r.item), now, limit))
    }

    fn list_by_status(&self, status: LearningStatus, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = {
            let _guard = self.guard();
            self.load_all()?
        };
        Ok(select_by_status(
            records.iter().map(|r| &r.item),
            status,
            limit,
        ))
    }

    fn list_study_queue(&self, now: DateTime<Utc>, limit: usize) -> Result<Vec<LearnableItem>> {
        let records = {
            let _guard = self.guard();
            self.load_all()?
        };
        Ok(select_study_queue(
            records.iter().map(|r| &r.item),
            now,
            limit,
        ))
    }

    fn aggregate(&self, now: DateTime<Utc>) -> Result<StoreAggregate> {
        let records = {
            let _guard = self.guard();
            self.load_all()?
        };
        Ok(StoreAggregate::from_items(
            records.iter().map(|r| &r.item),
            now,
        ))
    }

    fn review_history(&self, id: &ItemId, limit: usize) -> Result<Vec<ReviewLog>> {
        self.read_record(id)?
            .map(|r| r.recent_history(limit))
            .ok_or_else(|| LexisError::not_found(id.as_str()))
    }

    fn delete_word(&self, word_id: &str) -> Result<usize> {
        let _guard = self.guard();
        let mut removed = 0;
        for record in self.load_all()? {
            if record.item.word_id != word_id {
                continue;
            }
            let _lock = self.lock_item(&record.item.id)?;
            let path = self.item_path(&record.item.id);
            match fs::remove_file(&path) {
                Ok(()) => removed += 1,
                // Another instance deleted it first
                Err(e) if e.kind() == io::ErrorKind::NotFound => {}
                Err(e) => return Err(LexisError::storage(&path, e)),
            }
        }
        Ok(removed)
    }
}
