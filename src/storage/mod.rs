//! Append-only stores for daily entries. The tracker only sees the [`RecordStore`] trait.

mod memory;
mod sqlite;

pub use memory::InMemoryStore;
pub use sqlite::SqliteStore;

use crate::config::{StoreKind, TrackerConfig};
use crate::error::StoreError;
use crate::tracker::DailyEntry;
use std::sync::Arc;

pub trait RecordStore: Send + Sync {
    fn append(&self, entry: &DailyEntry) -> Result<(), StoreError>;

    /// All entries in insertion order.
    fn all(&self) -> Result<Vec<DailyEntry>, StoreError>;
}

/// Open the store selected by config.
pub fn open_store(config: &TrackerConfig) -> Result<Arc<dyn RecordStore>, StoreError> {
    Ok(match config.store {
        StoreKind::Memory => Arc::new(InMemoryStore::default()),
        StoreKind::Sqlite => Arc::new(SqliteStore::open(&config.sqlite_path)?),
    })
}
