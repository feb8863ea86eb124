//! Turns one outfit-rating event into durable, correct updates to a user's
//! points, badges, and streak.

mod rules;

#[cfg(test)]
mod tests;

pub use rules::{RewardComponent, RewardRule};

use std::sync::Arc;

use chrono::NaiveDate;
use serde::Serialize;
use tracing::{debug, warn};

use crate::catalog::Badge;
use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::leaderboard::RankProvider;
use crate::progress::{ProgressStore, StoreError, UserId};

/// Rewards committed for one submission, plus an audit trail of the rules
/// that fired.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerkOutcome {
    pub user_id: UserId,
    pub points_awarded: u32,
    pub badges_awarded: Vec<Badge>,
    pub new_streak: u32,
    pub components: Vec<RewardComponent>,
}

/// Transactional evaluator applying the reward rules to a user's progress
/// record under optimistic concurrency.
pub struct PerksEvaluator<S, R> {
    store: Arc<S>,
    ranks: Arc<R>,
    clock: Arc<dyn Clock>,
    max_commit_attempts: u32,
}

impl<S, R> PerksEvaluator<S, R>
where
    S: ProgressStore,
    R: RankProvider,
{
    pub fn new(
        store: Arc<S>,
        ranks: Arc<R>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            store,
            ranks,
            clock,
            max_commit_attempts: config.max_commit_attempts,
        }
    }

    /// Apply every reward rule for one submission and commit the updated
    /// record atomically. Retries transparently on write conflicts up to the
    /// configured bound, then surfaces `Conflict`. Every rule's guard is
    /// state-based (badge membership, date equality), so re-running the call
    /// against unchanged state is a no-op apart from the read.
    pub fn apply_submission_perks(
        &self,
        user_id: &UserId,
        rating: f64,
        submission_date: NaiveDate,
    ) -> Result<PerkOutcome, EngineError> {
        if !rating.is_finite() || !(0.0..=10.0).contains(&rating) {
            return Err(EngineError::InvalidArgument(format!(
                "rating {rating} outside the 0..=10 scale"
            )));
        }

        let mut attempts = 0;
        while attempts < self.max_commit_attempts {
            attempts += 1;

            let snapshot = self
                .store
                .load(user_id)?
                .ok_or_else(|| EngineError::UnknownUser(user_id.clone()))?;
            let mut progress = snapshot.progress;

            let yesterday_rank = self.yesterday_rank(&progress, user_id, submission_date);
            let context = rules::SubmissionContext {
                rating,
                date: submission_date,
                now: self.clock.now(),
            };
            let outcome = rules::apply_rewards(&mut progress, &context, yesterday_rank);

            match self.store.commit_if_unchanged(snapshot.version, progress) {
                Ok(()) => return Ok(outcome),
                Err(StoreError::VersionMismatch) => {
                    debug!(user = %user_id, attempt = attempts, "progress record moved under us, retrying");
                }
                Err(err) => return Err(err.into()),
            }
        }

        Err(EngineError::Conflict { attempts })
    }

    /// Yesterday's finalized rank, when the retroactive bonus has not already
    /// been paid for that date. A failing lookup degrades to "no bonus"; the
    /// surrounding transaction must stay available.
    fn yesterday_rank(
        &self,
        progress: &crate::progress::UserProgress,
        user_id: &UserId,
        submission_date: NaiveDate,
    ) -> Option<(NaiveDate, u32)> {
        let yesterday = submission_date.pred_opt()?;
        if progress.last_top3_bonus_date == Some(yesterday) {
            return None;
        }
        match self.ranks.rank_on(yesterday, user_id) {
            Ok(Some(rank)) => Some((yesterday, rank)),
            Ok(None) => None,
            Err(err) => {
                warn!(
                    user = %user_id,
                    date = %yesterday,
                    error = %err,
                    "ranking lookup unavailable, skipping top-3 bonus"
                );
                None
            }
        }
    }
}
