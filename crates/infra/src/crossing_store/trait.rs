use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use bordertally_core::{CrossingId, SubjectId};
use bordertally_presence::CrossingEvent;

use std::sync::Arc;

/// A validated crossing as persisted for one subject.
///
/// Serializes flat: the crossing's own fields (`type`, `date`,
/// `portOfEntry`, ...) sit next to the record metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CrossingRecord {
    pub id: CrossingId,
    pub subject_id: SubjectId,
    #[serde(flatten)]
    pub crossing: CrossingEvent,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl CrossingRecord {
    /// New record with a fresh id, stamped at `now`.
    pub fn new(subject_id: SubjectId, crossing: CrossingEvent, now: DateTime<Utc>) -> Self {
        Self {
            id: CrossingId::new(),
            subject_id,
            crossing,
            created_at: now,
            updated_at: now,
        }
    }
}

/// Crossing store abstraction (one log per subject).
///
/// Implementations return a subject's records in insertion order; ordering by
/// time is the accounting engine's job.
pub trait CrossingStore: Send + Sync {
    /// Append a record to its subject's log.
    fn append(&self, record: CrossingRecord) -> Result<CrossingRecord, CrossingStoreError>;

    /// Snapshot of a subject's log. Unknown subjects have an empty log.
    fn list(&self, subject_id: SubjectId) -> Result<Vec<CrossingRecord>, CrossingStoreError>;

    /// Remove one record from a subject's log.
    fn delete(&self, subject_id: SubjectId, id: CrossingId) -> Result<(), CrossingStoreError>;
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum CrossingStoreError {
    #[error("crossing not found: {0}")]
    NotFound(CrossingId),

    #[error("crossing already exists: {0}")]
    AlreadyExists(CrossingId),

    #[error("storage error: {0}")]
    Storage(String),
}

impl<S> CrossingStore for Arc<S>
where
    S: CrossingStore + ?Sized,
{
    fn append(&self, record: CrossingRecord) -> Result<CrossingRecord, CrossingStoreError> {
        (**self).append(record)
    }

    fn list(&self, subject_id: SubjectId) -> Result<Vec<CrossingRecord>, CrossingStoreError> {
        (**self).list(subject_id)
    }

    fn delete(&self, subject_id: SubjectId, id: CrossingId) -> Result<(), CrossingStoreError> {
        (**self).delete(subject_id, id)
    }
}
