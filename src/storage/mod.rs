//! Item storage for Lexis.
//!
//! This module defines the store contract the engine consumes and provides
//! file-based and in-memory reference implementations.

pub mod file;
pub mod memory;
pub mod query;
pub mod record;
pub mod traits;

pub use file::FileItemStore;
pub use memory::MemoryItemStore;
pub use query::StoreAggregate;
pub use record::ItemRecord;
pub use traits::ItemStore;

/// Review log entries kept per item unless configured otherwise.
pub const DEFAULT_HISTORY_LIMIT: usize = 100;
