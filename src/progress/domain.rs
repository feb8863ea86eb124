use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use chrono::{DateTime, Duration, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::Badge;

/// Identifier wrapper for account holders.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct UserId(pub String);

impl fmt::Display for UserId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Identifier wrapper for submission events.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SubmissionId(pub String);

/// Purchasable, time-limited features tracked on the progress record. Each
/// carries its own expiry window measured from the purchase instant.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum FeatureId {
    StreakShield,
    AiPowerup,
    ProfileBoost,
}

impl FeatureId {
    pub const fn label(self) -> &'static str {
        match self {
            FeatureId::StreakShield => "streak_shield",
            FeatureId::AiPowerup => "ai_powerup",
            FeatureId::ProfileBoost => "profile_boost",
        }
    }

    pub const fn window_hours(self) -> i64 {
        match self {
            FeatureId::StreakShield => 48,
            FeatureId::AiPowerup => 24,
            FeatureId::ProfileBoost => 168,
        }
    }

    pub fn window(self) -> Duration {
        Duration::hours(self.window_hours())
    }
}

/// Mutable per-user gamification record, owned exclusively by this engine.
/// `points` rises only through reward rules and falls only through an
/// explicit spend; `badges` grows and never shrinks.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UserProgress {
    pub user_id: UserId,
    pub points: u32,
    pub badges: BTreeSet<Badge>,
    pub current_streak: u32,
    pub last_submission_date: Option<NaiveDate>,
    pub last_top3_bonus_date: Option<NaiveDate>,
    pub feature_activations: BTreeMap<FeatureId, DateTime<Utc>>,
}

impl UserProgress {
    /// Fresh record created at account creation: zeroed apart from the
    /// starting point grant.
    pub fn register(user_id: UserId, starting_points: u32) -> Self {
        Self {
            user_id,
            points: starting_points,
            badges: BTreeSet::new(),
            current_streak: 0,
            last_submission_date: None,
            last_top3_bonus_date: None,
            feature_activations: BTreeMap::new(),
        }
    }

    pub fn holds(&self, badge: Badge) -> bool {
        self.badges.contains(&badge)
    }

    /// Whether a purchased feature is still inside its expiry window at `now`.
    pub fn feature_active_at(&self, feature: FeatureId, now: DateTime<Utc>) -> bool {
        match self.feature_activations.get(&feature) {
            Some(activated_at) => now.signed_duration_since(*activated_at) < feature.window(),
            None => false,
        }
    }
}

/// Immutable outfit-rating event appended by the submission pipeline. The
/// caller guarantees at most one record per (user, leaderboard date); the
/// engine never mutates or deletes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SubmissionRecord {
    pub submission_id: SubmissionId,
    pub user_id: UserId,
    pub rating: f64,
    pub leaderboard_date: NaiveDate,
    pub submitted_at: DateTime<Utc>,
    /// Opaque object-storage pointer; the engine never dereferences it.
    pub photo_url: String,
}
