//! Residency service: store snapshot → engine → stats.

use thiserror::Error;

use bordertally_core::{CrossingId, DomainError, SubjectId};
use bordertally_presence::{CrossingEvent, DayAccount, NewCrossing, ResidencyStats};

use crate::clock::Clock;
use crate::config::ResidencyConfig;
use crate::crossing_store::{CrossingRecord, CrossingStore, CrossingStoreError};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ServiceError {
    #[error(transparent)]
    Domain(#[from] DomainError),

    #[error(transparent)]
    Store(#[from] CrossingStoreError),
}

/// Wires a crossing store and a clock to the day-accounting engine.
///
/// Holds no per-subject state: every accounting call loads a fresh snapshot.
#[derive(Debug)]
pub struct ResidencyService<S, C> {
    store: S,
    clock: C,
    config: ResidencyConfig,
}

impl<S, C> ResidencyService<S, C>
where
    S: CrossingStore,
    C: Clock,
{
    pub fn new(store: S, clock: C, config: ResidencyConfig) -> Self {
        Self {
            store,
            clock,
            config,
        }
    }

    /// Validate and store a submitted crossing.
    pub fn record_crossing(
        &self,
        subject_id: SubjectId,
        input: NewCrossing,
    ) -> Result<CrossingRecord, ServiceError> {
        let crossing = input.validate().inspect_err(|e| {
            tracing::info!(subject_id = %subject_id, "rejected crossing: {e}");
        })?;

        let record = self
            .store
            .append(CrossingRecord::new(subject_id, crossing, self.clock.now()))?;

        tracing::info!(
            subject_id = %subject_id,
            crossing_id = %record.id,
            kind = ?record.crossing.kind,
            "recorded crossing"
        );
        Ok(record)
    }

    /// The subject's crossings, as stored.
    pub fn crossings(&self, subject_id: SubjectId) -> Result<Vec<CrossingRecord>, ServiceError> {
        let records = self.store.list(subject_id)?;
        tracing::debug!(subject_id = %subject_id, "loaded {} crossings", records.len());
        Ok(records)
    }

    pub fn delete_crossing(&self, subject_id: SubjectId, id: CrossingId) -> Result<(), ServiceError> {
        self.store.delete(subject_id, id)?;
        tracing::info!(subject_id = %subject_id, crossing_id = %id, "deleted crossing");
        Ok(())
    }

    /// Full accounting trace as of the clock's current local date.
    pub fn account(&self, subject_id: SubjectId) -> Result<DayAccount, ServiceError> {
        let events: Vec<CrossingEvent> = self
            .store
            .list(subject_id)?
            .into_iter()
            .map(|r| r.crossing)
            .collect();

        let today = self.config.zone.local_day(self.clock.now());
        let account = self.config.accountant().account(&events, today);

        tracing::debug!(
            subject_id = %subject_id,
            total_days = account.total_days,
            stays = account.stays.len(),
            ignored = account.ignored.len(),
            open_entry = ?account.open_entry,
            "accounted crossings as of {today}"
        );
        Ok(account)
    }

    /// Progress toward the configured threshold.
    pub fn stats(&self, subject_id: SubjectId) -> Result<ResidencyStats, ServiceError> {
        let account = self.account(subject_id)?;
        let stats = ResidencyStats::from_total(account.total_days, self.config.target_days);

        tracing::info!(
            subject_id = %subject_id,
            total_days = stats.total_days,
            remaining_days = stats.remaining_days,
            "computed residency stats"
        );
        Ok(stats)
    }
}
