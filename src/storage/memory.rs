use super::RecordStore;
use crate::error::StoreError;
use crate::tracker::DailyEntry;
use std::sync::Mutex;

/// Process-lifetime store; entries are lost on exit.
#[derive(Default)]
pub struct InMemoryStore {
    entries: Mutex<Vec<DailyEntry>>,
}

impl RecordStore for InMemoryStore {
    fn append(&self, entry: &DailyEntry) -> Result<(), StoreError> {
        self.entries
            .lock()
            .map_err(|_| StoreError::Poisoned)?
            .push(entry.clone());
        Ok(())
    }

    fn all(&self) -> Result<Vec<DailyEntry>, StoreError> {
        Ok(self.entries.lock().map_err(|_| StoreError::Poisoned)?.clone())
    }
}
