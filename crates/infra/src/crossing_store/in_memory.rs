use std::collections::HashMap;
use std::sync::RwLock;

use bordertally_core::{CrossingId, SubjectId};

use super::r#trait::{CrossingRecord, CrossingStore, CrossingStoreError};

/// In-memory crossing store keyed by subject.
///
/// Intended for tests/dev and the report tool.
#[derive(Debug, Default)]
pub struct InMemoryCrossingStore {
    logs: RwLock<HashMap<SubjectId, Vec<CrossingRecord>>>,
}

impl InMemoryCrossingStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> CrossingStoreError {
        CrossingStoreError::Storage("lock poisoned".to_string())
    }
}

impl CrossingStore for InMemoryCrossingStore {
    fn append(&self, record: CrossingRecord) -> Result<CrossingRecord, CrossingStoreError> {
        let mut logs = self.logs.write().map_err(|_| Self::poisoned())?;

        // Ids are unique across subjects, not just within one log.
        if logs.values().flatten().any(|r| r.id == record.id) {
            return Err(CrossingStoreError::AlreadyExists(record.id));
        }

        logs.entry(record.subject_id).or_default().push(record.clone());
        Ok(record)
    }

    fn list(&self, subject_id: SubjectId) -> Result<Vec<CrossingRecord>, CrossingStoreError> {
        let logs = self.logs.read().map_err(|_| Self::poisoned())?;
        Ok(logs.get(&subject_id).cloned().unwrap_or_default())
    }

    fn delete(&self, subject_id: SubjectId, id: CrossingId) -> Result<(), CrossingStoreError> {
        let mut logs = self.logs.write().map_err(|_| Self::poisoned())?;
        let log = logs
            .get_mut(&subject_id)
            .ok_or(CrossingStoreError::NotFound(id))?;

        let position = log
            .iter()
            .position(|r| r.id == id)
            .ok_or(CrossingStoreError::NotFound(id))?;
        log.remove(position);
        Ok(())
    }
}
