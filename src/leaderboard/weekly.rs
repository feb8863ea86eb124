use std::collections::BTreeMap;
use std::sync::Arc;

use chrono::{Datelike, Duration, NaiveDate};
use serde::Serialize;

use crate::error::EngineError;
use crate::progress::{SubmissionLedger, UserId};

/// Seven-day rollup for one user. `total_points` is a week-scoped derived
/// score, distinct from the persisted point balance.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyEntry {
    pub user_id: UserId,
    pub total_submissions: u32,
    pub avg_rating: f64,
    pub best_rating: f64,
    pub total_points: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WeeklyLeaderboard {
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub entries: Vec<WeeklyEntry>,
}

/// Read path grouping a week's submissions per user. `week_start` is a Monday
/// by caller convention; it is not normalized here.
pub struct WeeklyAggregator<L> {
    ledger: Arc<L>,
}

impl<L: SubmissionLedger> WeeklyAggregator<L> {
    pub fn new(ledger: Arc<L>) -> Self {
        Self { ledger }
    }

    pub fn weekly(&self, week_start: NaiveDate) -> Result<WeeklyLeaderboard, EngineError> {
        let week_end = week_start + Duration::days(6);
        let records = self.ledger.for_range(week_start, week_end)?;

        let mut ratings_by_user: BTreeMap<UserId, Vec<f64>> = BTreeMap::new();
        for record in records {
            ratings_by_user
                .entry(record.user_id)
                .or_default()
                .push(record.rating);
        }

        let mut entries: Vec<WeeklyEntry> = ratings_by_user
            .into_iter()
            .map(|(user_id, ratings)| {
                let total_submissions = ratings.len() as u32;
                let best_rating = ratings.iter().copied().reduce(f64::max).unwrap_or(0.0);
                let avg_rating =
                    round_one_decimal(ratings.iter().sum::<f64>() / ratings.len() as f64);
                let total_points = (avg_rating * f64::from(total_submissions) * 10.0
                    + best_rating * 5.0)
                    .round() as u32;
                WeeklyEntry {
                    user_id,
                    total_submissions,
                    avg_rating,
                    best_rating,
                    total_points,
                }
            })
            .collect();

        entries.sort_by(|a, b| {
            b.total_points
                .cmp(&a.total_points)
                .then_with(|| b.best_rating.total_cmp(&a.best_rating))
        });

        Ok(WeeklyLeaderboard {
            week_start,
            week_end,
            entries,
        })
    }
}

/// Monday of the week containing `today`. Sundays step back six days to the
/// Monday that opened the week, never forward.
pub fn current_week_start(today: NaiveDate) -> NaiveDate {
    let days_back = i64::from(today.weekday().num_days_from_monday());
    today - Duration::days(days_back)
}

fn round_one_decimal(value: f64) -> f64 {
    (value * 10.0).round() / 10.0
}
