//! Point-for-feature purchases and "is this feature currently active"
//! queries, sharing the evaluator's transactional discipline against the
//! progress store.

use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use tracing::debug;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::progress::{FeatureId, ProgressStore, StoreError, UserId};

/// Result of a successful spend.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpendReceipt {
    pub feature: FeatureId,
    pub remaining_points: u32,
    pub activated_at: DateTime<Utc>,
    pub message: String,
}

/// Answer to a feature-activity query. A pure read; nothing is mutated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FeatureStatus {
    pub active: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hours_remaining: Option<i64>,
}

/// Records point-for-feature purchases on the progress record.
pub struct FeatureLedger<S> {
    store: Arc<S>,
    clock: Arc<dyn Clock>,
    max_commit_attempts: u32,
}

impl<S: ProgressStore> FeatureLedger<S> {
    pub fn new(store: Arc<S>, clock: Arc<dyn Clock>, config: &EngineConfig) -> Self {
        Self {
            store,
            clock,
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    /// Atomically decrement the balance by `cost` and stamp the feature's
    /// last-purchase instant. Fails with `InsufficientPoints` before touching
    /// the record; retries transparently on write conflicts.
    pub fn spend_points(
        &self,
        user_id: &UserId,
        cost: u32,
        feature: FeatureId,
    ) -> Result<SpendReceipt, EngineError> {
        let mut attempts = 0;
        while attempts < self.max_commit_attempts {
            attempts += 1;

            let snapshot = self
                .store
                .load(user_id)?
                .ok_or_else(|| EngineError::UnknownUser(user_id.clone()))?;
            let mut progress = snapshot.progress;

            if progress.points < cost {
                return Err(EngineError::InsufficientPoints {
                    available: progress.points,
                    required: cost,
                });
            }

            let now = self.clock.now();
            progress.points -= cost;
            progress.feature_activations.insert(feature, now);
            let remaining_points = progress.points;

            match self.store.commit_if_unchanged(snapshot.version, progress) {
                Ok(()) => {
                    return Ok(SpendReceipt {
                        feature,
                        remaining_points,
                        activated_at: now,
                        message: format!(
                            "{} activated for {} hours",
                            feature.label(),
                            feature.window_hours()
                        ),
                    })
                }
                Err(StoreError::VersionMismatch) => {
                    debug!(user = %user_id, attempt = attempts, "progress record moved under us, retrying spend");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(EngineError::Conflict { attempts })
    }

    /// Whether the feature's last purchase is still inside its expiry window,
    /// and if so how many whole hours remain (rounded up).
    pub fn feature_status(
        &self,
        user_id: &UserId,
        feature: FeatureId,
    ) -> Result<FeatureStatus, EngineError> {
        let snapshot = self
            .store
            .load(user_id)?
            .ok_or_else(|| EngineError::UnknownUser(user_id.clone()))?;

        let Some(activated_at) = snapshot.progress.feature_activations.get(&feature).copied()
        else {
            return Ok(FeatureStatus {
                active: false,
                hours_remaining: None,
            });
        };

        let remaining = feature.window() - self.clock.now().signed_duration_since(activated_at);
        if remaining > Duration::zero() {
            let seconds = remaining.num_seconds();
            Ok(FeatureStatus {
                active: true,
                hours_remaining: Some((seconds + 3599) / 3600),
            })
        } else {
            Ok(FeatureStatus {
                active: false,
                hours_remaining: None,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    use crate::clock::ManualClock;
    use crate::progress::{MemoryProgressStore, UserProgress};

    fn user() -> UserId {
        UserId("ava".to_string())
    }

    fn ledger_at(
        store: Arc<MemoryProgressStore>,
        clock: &ManualClock,
    ) -> FeatureLedger<MemoryProgressStore> {
        FeatureLedger::new(store, Arc::new(clock.clone()), &EngineConfig::default())
    }

    fn seeded(points: u32) -> Arc<MemoryProgressStore> {
        let store = Arc::new(MemoryProgressStore::default());
        store
            .create(UserProgress::register(user(), points))
            .expect("seed progress");
        store
    }

    #[test]
    fn spend_decrements_points_and_stamps_the_activation() {
        let store = seeded(25);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store.clone(), &clock);

        let receipt = ledger
            .spend_points(&user(), 10, FeatureId::StreakShield)
            .expect("spend succeeds");
        assert_eq!(receipt.remaining_points, 15);
        assert_eq!(receipt.activated_at, clock.now());
        assert!(receipt.message.contains("streak_shield"));

        let stored = store.load(&user()).expect("load").expect("present");
        assert_eq!(stored.progress.points, 15);
        assert_eq!(
            stored
                .progress
                .feature_activations
                .get(&FeatureId::StreakShield),
            Some(&clock.now())
        );
    }

    #[test]
    fn overdrawn_spend_fails_and_leaves_points_unchanged() {
        let store = seeded(5);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store.clone(), &clock);

        let err = ledger
            .spend_points(&user(), 10, FeatureId::StreakShield)
            .expect_err("overdrawn spend rejected");
        assert!(matches!(
            err,
            EngineError::InsufficientPoints {
                available: 5,
                required: 10
            }
        ));

        let stored = store.load(&user()).expect("load").expect("present");
        assert_eq!(stored.progress.points, 5);
        assert!(stored.progress.feature_activations.is_empty());
    }

    #[test]
    fn status_reports_hours_remaining_inside_the_window() {
        let store = seeded(50);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store.clone(), &clock);
        ledger
            .spend_points(&user(), 10, FeatureId::StreakShield)
            .expect("spend succeeds");

        clock.advance(Duration::hours(47));
        let status = ledger
            .feature_status(&user(), FeatureId::StreakShield)
            .expect("status read");
        assert!(status.active);
        assert_eq!(status.hours_remaining, Some(1));
    }

    #[test]
    fn status_is_inactive_exactly_at_the_window_edge() {
        let store = seeded(50);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store.clone(), &clock);
        ledger
            .spend_points(&user(), 10, FeatureId::AiPowerup)
            .expect("spend succeeds");

        clock.advance(Duration::hours(24));
        let status = ledger
            .feature_status(&user(), FeatureId::AiPowerup)
            .expect("status read");
        assert!(!status.active);
        assert_eq!(status.hours_remaining, None);
    }

    #[test]
    fn status_without_any_purchase_is_inactive() {
        let store = seeded(50);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store, &clock);

        let status = ledger
            .feature_status(&user(), FeatureId::ProfileBoost)
            .expect("status read");
        assert!(!status.active);
        assert_eq!(status.hours_remaining, None);
    }

    #[test]
    fn unknown_user_is_surfaced_on_both_paths() {
        let store = seeded(50);
        let clock = ManualClock::at(Utc.with_ymd_and_hms(2024, 5, 1, 9, 0, 0).unwrap());
        let ledger = ledger_at(store, &clock);

        let stranger = UserId("nobody".to_string());
        assert!(matches!(
            ledger.spend_points(&stranger, 1, FeatureId::AiPowerup),
            Err(EngineError::UnknownUser(_))
        ));
        assert!(matches!(
            ledger.feature_status(&stranger, FeatureId::AiPowerup),
            Err(EngineError::UnknownUser(_))
        ));
    }
}
