use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard};

use chrono::NaiveDate;

use super::domain::{SubmissionRecord, UserId, UserProgress};

/// Snapshot returned by [`ProgressStore::load`]: the record plus the version
/// that a later [`ProgressStore::commit_if_unchanged`] must present.
#[derive(Debug, Clone)]
pub struct VersionedProgress {
    pub version: u64,
    pub progress: UserProgress,
}

/// Error enumeration for storage failures.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    AlreadyExists,
    #[error("record not found")]
    NotFound,
    #[error("record changed since read")]
    VersionMismatch,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage seam for the one mutable record per user. Implementations must
/// guarantee all-or-nothing commits; the engine performs read-compute-retry
/// itself, so no server-side merge primitives are required.
pub trait ProgressStore: Send + Sync {
    /// Insert a brand-new record; fails with `AlreadyExists` on collision.
    fn create(&self, progress: UserProgress) -> Result<(), StoreError>;

    fn load(&self, user: &UserId) -> Result<Option<VersionedProgress>, StoreError>;

    /// Replace the record only if its version still equals `expected_version`;
    /// fails with `VersionMismatch` when another writer got there first.
    fn commit_if_unchanged(
        &self,
        expected_version: u64,
        progress: UserProgress,
    ) -> Result<(), StoreError>;
}

/// Storage seam for the append-only submission ledger. Records are immutable;
/// reads are snapshot reads and tolerate eventual consistency.
pub trait SubmissionLedger: Send + Sync {
    fn append(&self, record: SubmissionRecord) -> Result<(), StoreError>;

    fn for_date(&self, date: NaiveDate) -> Result<Vec<SubmissionRecord>, StoreError>;

    /// All records with `leaderboard_date` in `[start, end]`, bounds inclusive.
    fn for_range(&self, start: NaiveDate, end: NaiveDate)
        -> Result<Vec<SubmissionRecord>, StoreError>;
}

/// Mutex-guarded reference implementation backing tests and embedders that
/// have not wired a durable store yet.
#[derive(Debug, Default)]
pub struct MemoryProgressStore {
    records: Mutex<HashMap<UserId, (u64, UserProgress)>>,
}

impl MemoryProgressStore {
    fn guard(&self) -> Result<MutexGuard<'_, HashMap<UserId, (u64, UserProgress)>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("progress store mutex poisoned".to_string()))
    }
}

impl ProgressStore for MemoryProgressStore {
    fn create(&self, progress: UserProgress) -> Result<(), StoreError> {
        let mut records = self.guard()?;
        if records.contains_key(&progress.user_id) {
            return Err(StoreError::AlreadyExists);
        }
        records.insert(progress.user_id.clone(), (1, progress));
        Ok(())
    }

    fn load(&self, user: &UserId) -> Result<Option<VersionedProgress>, StoreError> {
        let records = self.guard()?;
        Ok(records.get(user).map(|(version, progress)| VersionedProgress {
            version: *version,
            progress: progress.clone(),
        }))
    }

    fn commit_if_unchanged(
        &self,
        expected_version: u64,
        progress: UserProgress,
    ) -> Result<(), StoreError> {
        let mut records = self.guard()?;
        match records.get_mut(&progress.user_id) {
            None => Err(StoreError::NotFound),
            Some((version, stored)) => {
                if *version != expected_version {
                    return Err(StoreError::VersionMismatch);
                }
                *version += 1;
                *stored = progress;
                Ok(())
            }
        }
    }
}

/// Append-only in-memory ledger counterpart to [`MemoryProgressStore`].
#[derive(Debug, Default)]
pub struct MemorySubmissionLedger {
    records: Mutex<Vec<SubmissionRecord>>,
}

impl MemorySubmissionLedger {
    fn guard(&self) -> Result<MutexGuard<'_, Vec<SubmissionRecord>>, StoreError> {
        self.records
            .lock()
            .map_err(|_| StoreError::Unavailable("submission ledger mutex poisoned".to_string()))
    }
}

impl SubmissionLedger for MemorySubmissionLedger {
    fn append(&self, record: SubmissionRecord) -> Result<(), StoreError> {
        self.guard()?.push(record);
        Ok(())
    }

    fn for_date(&self, date: NaiveDate) -> Result<Vec<SubmissionRecord>, StoreError> {
        let records = self.guard()?;
        Ok(records
            .iter()
            .filter(|record| record.leaderboard_date == date)
            .cloned()
            .collect())
    }

    fn for_range(
        &self,
        start: NaiveDate,
        end: NaiveDate,
    ) -> Result<Vec<SubmissionRecord>, StoreError> {
        let records = self.guard()?;
        Ok(records
            .iter()
            .filter(|record| record.leaderboard_date >= start && record.leaderboard_date <= end)
            .cloned()
            .collect())
    }
}
