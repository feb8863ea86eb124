//! Read-only ranked views over the submission ledger: the gated daily
//! leaderboard and the seven-day rollup.

mod weekly;

pub use weekly::{current_week_start, WeeklyAggregator, WeeklyEntry, WeeklyLeaderboard};

use std::sync::Arc;

use chrono::{DateTime, NaiveDate, NaiveTime, TimeZone, Utc};
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::clock::Clock;
use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::progress::{ProgressStore, StoreError, SubmissionLedger, SubmissionRecord, UserId};

/// External identity data joined onto leaderboard rows. The join is best
/// effort: a failing or empty source degrades to neutral defaults.
pub trait ProfileSource: Send + Sync {
    fn profile(&self, user: &UserId) -> Result<Option<ProfileSnapshot>, StoreError>;
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub username: String,
    pub avatar_url: Option<String>,
    pub social_links: Vec<String>,
}

/// Rank lookup consumed by the retroactive top-3 bonus rule. Always the
/// finalized ordering for the date, regardless of release gating.
pub trait RankProvider: Send + Sync {
    fn rank_on(&self, date: NaiveDate, user: &UserId) -> Result<Option<u32>, StoreError>;
}

/// One enriched row of a daily leaderboard.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LeaderboardEntry {
    pub rank: u32,
    pub user_id: UserId,
    pub rating: f64,
    pub submitted_at: DateTime<Utc>,
    pub photo_url: String,
    pub username: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub avatar_url: Option<String>,
    pub social_links: Vec<String>,
    pub points: u32,
    pub current_streak: u32,
}

/// Visibility of the requested day's ranking.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum ReleaseState {
    Released,
    WaitingForRelease { seconds_until_release: i64 },
}

/// Ranked view for one date. While the requested date is still gated, the
/// previous day's finalized entries are served instead.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DailyLeaderboard {
    pub requested_date: NaiveDate,
    pub served_date: NaiveDate,
    pub release: ReleaseState,
    pub entries: Vec<LeaderboardEntry>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub notice: Option<String>,
}

impl DailyLeaderboard {
    pub fn is_waiting_for_release(&self) -> bool {
        matches!(self.release, ReleaseState::WaitingForRelease { .. })
    }
}

/// Service producing daily ranked views, enriched with live user data and
/// gated by the configured release hour.
pub struct LeaderboardService<L, S, P> {
    ledger: Arc<L>,
    progress: Arc<S>,
    profiles: Arc<P>,
    clock: Arc<dyn Clock>,
    release_hour: u32,
}

impl<L, S, P> LeaderboardService<L, S, P>
where
    L: SubmissionLedger,
    S: ProgressStore,
    P: ProfileSource,
{
    pub fn new(
        ledger: Arc<L>,
        progress: Arc<S>,
        profiles: Arc<P>,
        clock: Arc<dyn Clock>,
        config: &EngineConfig,
    ) -> Self {
        Self {
            ledger,
            progress,
            profiles,
            clock,
            release_hour: config.release_hour,
        }
    }

    /// Ranked view for `date`. Before the date's release instant the previous
    /// day's entries are substituted and the waiting state reports the time
    /// remaining; at or after the instant the requested day is served.
    pub fn daily(&self, date: NaiveDate) -> Result<DailyLeaderboard, EngineError> {
        let now = self.clock.now();
        let release_at = release_instant(date, self.release_hour);

        let (served_date, release) = if now >= release_at {
            (date, ReleaseState::Released)
        } else {
            let fallback = date.pred_opt().ok_or_else(|| {
                EngineError::InvalidArgument("date precedes the supported calendar".to_string())
            })?;
            let waiting = ReleaseState::WaitingForRelease {
                seconds_until_release: (release_at - now).num_seconds(),
            };
            (fallback, waiting)
        };

        let entries = self.ranked_entries(served_date)?;
        let notice = entries
            .is_empty()
            .then(|| "no submissions yet for this day".to_string());

        Ok(DailyLeaderboard {
            requested_date: date,
            served_date,
            release,
            entries,
            notice,
        })
    }

    fn ranked_submissions(&self, date: NaiveDate) -> Result<Vec<SubmissionRecord>, StoreError> {
        let mut submissions = self.ledger.for_date(date)?;
        submissions.sort_by(|a, b| {
            b.rating
                .total_cmp(&a.rating)
                .then_with(|| a.submitted_at.cmp(&b.submitted_at))
        });
        Ok(submissions)
    }

    fn ranked_entries(&self, date: NaiveDate) -> Result<Vec<LeaderboardEntry>, EngineError> {
        let submissions = self.ranked_submissions(date)?;
        Ok(submissions
            .into_iter()
            .enumerate()
            .map(|(index, record)| self.enrich(index as u32 + 1, record))
            .collect())
    }

    fn enrich(&self, rank: u32, record: SubmissionRecord) -> LeaderboardEntry {
        let (points, current_streak) = match self.progress.load(&record.user_id) {
            Ok(Some(snapshot)) => (snapshot.progress.points, snapshot.progress.current_streak),
            Ok(None) => (0, 0),
            Err(err) => {
                warn!(user = %record.user_id, error = %err, "progress enrichment unavailable, serving defaults");
                (0, 0)
            }
        };

        let profile = match self.profiles.profile(&record.user_id) {
            Ok(profile) => profile,
            Err(err) => {
                warn!(user = %record.user_id, error = %err, "profile enrichment unavailable, serving defaults");
                None
            }
        };
        let (username, avatar_url, social_links) = match profile {
            Some(snapshot) => (snapshot.username, snapshot.avatar_url, snapshot.social_links),
            None => (record.user_id.0.clone(), None, Vec::new()),
        };

        LeaderboardEntry {
            rank,
            user_id: record.user_id,
            rating: record.rating,
            submitted_at: record.submitted_at,
            photo_url: record.photo_url,
            username,
            avatar_url,
            social_links,
            points,
            current_streak,
        }
    }
}

impl<L, S, P> RankProvider for LeaderboardService<L, S, P>
where
    L: SubmissionLedger,
    S: ProgressStore,
    P: ProfileSource,
{
    fn rank_on(&self, date: NaiveDate, user: &UserId) -> Result<Option<u32>, StoreError> {
        let submissions = self.ranked_submissions(date)?;
        Ok(submissions
            .iter()
            .position(|record| &record.user_id == user)
            .map(|index| index as u32 + 1))
    }
}

fn release_instant(date: NaiveDate, hour: u32) -> DateTime<Utc> {
    // Config validates the hour; midnight is a harmless fallback that keeps
    // this total.
    let time = NaiveTime::from_hms_opt(hour, 0, 0).unwrap_or(NaiveTime::MIN);
    Utc.from_utc_datetime(&date.and_time(time))
}
