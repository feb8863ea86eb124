use std::sync::atomic::{AtomicU32, Ordering};
use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};

use crate::clock::ManualClock;
use crate::config::EngineConfig;
use crate::leaderboard::RankProvider;
use crate::perks::PerksEvaluator;
use crate::progress::{
    MemoryProgressStore, ProgressStore, StoreError, UserId, UserProgress, VersionedProgress,
};

pub(super) fn user() -> UserId {
    UserId("ava".to_string())
}

pub(super) fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).expect("valid date")
}

pub(super) fn noon(day: NaiveDate) -> DateTime<Utc> {
    Utc.from_utc_datetime(&day.and_time(NaiveTime::from_hms_opt(12, 0, 0).expect("valid time")))
}

/// No ranking data for any date.
pub(super) struct NoRanking;

impl RankProvider for NoRanking {
    fn rank_on(&self, _date: NaiveDate, _user: &UserId) -> Result<Option<u32>, StoreError> {
        Ok(None)
    }
}

/// Same rank for every date, for driving the top-3 rule directly.
pub(super) struct FixedRanking(pub u32);

impl RankProvider for FixedRanking {
    fn rank_on(&self, _date: NaiveDate, _user: &UserId) -> Result<Option<u32>, StoreError> {
        Ok(Some(self.0))
    }
}

/// Ranking source that is down.
pub(super) struct FailingRanking;

impl RankProvider for FailingRanking {
    fn rank_on(&self, _date: NaiveDate, _user: &UserId) -> Result<Option<u32>, StoreError> {
        Err(StoreError::Unavailable("ranking service offline".to_string()))
    }
}

/// Store decorator injecting a fixed number of commit conflicts before
/// delegating, to exercise the optimistic retry loop.
pub(super) struct ContendedStore {
    inner: MemoryProgressStore,
    remaining_conflicts: AtomicU32,
}

impl ContendedStore {
    pub(super) fn conflicts(count: u32) -> Self {
        Self {
            inner: MemoryProgressStore::default(),
            remaining_conflicts: AtomicU32::new(count),
        }
    }
}

impl ProgressStore for ContendedStore {
    fn create(&self, progress: UserProgress) -> Result<(), StoreError> {
        self.inner.create(progress)
    }

    fn load(&self, user: &UserId) -> Result<Option<VersionedProgress>, StoreError> {
        self.inner.load(user)
    }

    fn commit_if_unchanged(
        &self,
        expected_version: u64,
        progress: UserProgress,
    ) -> Result<(), StoreError> {
        let remaining = self.remaining_conflicts.load(Ordering::SeqCst);
        if remaining > 0 {
            self.remaining_conflicts.store(remaining - 1, Ordering::SeqCst);
            return Err(StoreError::VersionMismatch);
        }
        self.inner.commit_if_unchanged(expected_version, progress)
    }
}

pub(super) fn store_with(progress: UserProgress) -> Arc<MemoryProgressStore> {
    let store = Arc::new(MemoryProgressStore::default());
    store.create(progress).expect("seed progress");
    store
}

pub(super) fn evaluator<S, R>(
    store: Arc<S>,
    ranks: Arc<R>,
    now: DateTime<Utc>,
) -> PerksEvaluator<S, R>
where
    S: ProgressStore,
    R: RankProvider,
{
    PerksEvaluator::new(
        store,
        ranks,
        Arc::new(ManualClock::at(now)),
        &EngineConfig::default(),
    )
}

pub(super) fn loaded(store: &MemoryProgressStore) -> UserProgress {
    store
        .load(&user())
        .expect("load")
        .expect("progress present")
        .progress
}
