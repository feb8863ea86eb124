//! Gamification and leaderboard consistency engine for a daily outfit-rating
//! community.
//!
//! A submission event (user, rating, calendar date) is appended to the
//! [`progress::SubmissionLedger`] by the submission pipeline and then handed
//! to the [`perks::PerksEvaluator`], which computes the full set of rewards
//! (points, badges, streak) and commits them to the
//! [`progress::ProgressStore`] in a single optimistic transaction. The
//! [`leaderboard::LeaderboardService`] and [`leaderboard::WeeklyAggregator`]
//! are independent read paths over the same stores; they never mutate state.
//! Point-for-feature purchases go through the [`features::FeatureLedger`].
//!
//! The engine is a library boundary: no network or CLI protocol is defined
//! here. Outer request-handling code wires the services to real storage by
//! implementing the traits in [`progress::store`].

pub mod catalog;
pub mod clock;
pub mod config;
pub mod error;
pub mod features;
pub mod leaderboard;
pub mod perks;
pub mod progress;
pub mod telemetry;

pub use catalog::{Badge, BadgeDefinition};
pub use clock::{Clock, ManualClock, SystemClock};
pub use config::EngineConfig;
pub use error::EngineError;
pub use features::{FeatureLedger, FeatureStatus, SpendReceipt};
pub use leaderboard::{
    current_week_start, DailyLeaderboard, LeaderboardEntry, LeaderboardService, ProfileSnapshot,
    ProfileSource, RankProvider, ReleaseState, WeeklyAggregator, WeeklyEntry, WeeklyLeaderboard,
};
pub use perks::{PerkOutcome, PerksEvaluator, RewardComponent, RewardRule};
pub use progress::{
    FeatureId, MemoryProgressStore, MemorySubmissionLedger, ProgressStore, StoreError,
    SubmissionId, SubmissionLedger, SubmissionRecord, UserId, UserProgress, VersionedProgress,
};
