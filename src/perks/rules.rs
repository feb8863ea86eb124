use chrono::{DateTime, Datelike, NaiveDate, Utc, Weekday};
use serde::Serialize;

use super::PerkOutcome;
use crate::catalog::{self, Badge};
use crate::progress::{FeatureId, UserProgress};

/// Inputs for one reward pass.
pub(crate) struct SubmissionContext {
    pub rating: f64,
    pub date: NaiveDate,
    pub now: DateTime<Utc>,
}

/// Which rule produced a reward component, allowing transparent audits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RewardRule {
    BadgeUnlock,
    DailySubmission,
    WeekendBonus,
    TopThreeBonus,
}

/// Discrete contribution to a reward pass.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RewardComponent {
    pub rule: RewardRule,
    pub points: u32,
    pub note: String,
}

struct RewardPass<'a> {
    progress: &'a mut UserProgress,
    components: Vec<RewardComponent>,
    badges_awarded: Vec<Badge>,
    points_awarded: u32,
}

impl<'a> RewardPass<'a> {
    fn new(progress: &'a mut UserProgress) -> Self {
        Self {
            progress,
            components: Vec::new(),
            badges_awarded: Vec::new(),
            points_awarded: 0,
        }
    }

    fn grant_points(&mut self, rule: RewardRule, points: u32, note: String) {
        self.progress.points += points;
        self.points_awarded += points;
        self.components.push(RewardComponent { rule, points, note });
    }

    /// Idempotent by construction: held badges are never re-granted and never
    /// re-pay their unlock reward.
    fn grant_badge(&mut self, badge: Badge) {
        if self.progress.holds(badge) {
            return;
        }
        let definition = catalog::definition(badge);
        self.progress.points += definition.point_reward;
        self.points_awarded += definition.point_reward;
        self.progress.badges.insert(badge);
        self.badges_awarded.push(badge);
        self.components.push(RewardComponent {
            rule: RewardRule::BadgeUnlock,
            points: definition.point_reward,
            note: format!("unlocked {}", definition.display_name),
        });
    }
}

/// Run every reward rule, in order, against the in-transaction record. Later
/// rules see the running point total left by earlier ones.
pub(crate) fn apply_rewards(
    progress: &mut UserProgress,
    context: &SubmissionContext,
    yesterday_rank: Option<(NaiveDate, u32)>,
) -> PerkOutcome {
    let mut pass = RewardPass::new(progress);

    pass.grant_badge(Badge::FirstSubmission);
    if context.rating >= 10.0 {
        pass.grant_badge(Badge::PerfectScore);
    }
    update_streak(&mut pass, context);
    top_three_bonus(&mut pass, yesterday_rank);
    point_milestones(&mut pass);

    PerkOutcome {
        user_id: pass.progress.user_id.clone(),
        points_awarded: pass.points_awarded,
        badges_awarded: pass.badges_awarded,
        new_streak: pass.progress.current_streak,
        components: pass.components,
    }
}

/// Streak continuity, the flat daily point, and the weekend bonus. Only the
/// first submission counted for a date runs this rule.
fn update_streak(pass: &mut RewardPass<'_>, context: &SubmissionContext) {
    if pass.progress.last_submission_date == Some(context.date) {
        return;
    }

    let next_streak = match pass.progress.last_submission_date {
        None => 1,
        Some(previous) => {
            let gap = (context.date - previous).num_days();
            if gap == 1 {
                pass.progress.current_streak + 1
            } else if gap == 2
                && pass
                    .progress
                    .feature_active_at(FeatureId::StreakShield, context.now)
            {
                // The shield forgives exactly one missed day and is spent.
                pass.progress
                    .feature_activations
                    .remove(&FeatureId::StreakShield);
                pass.progress.current_streak + 1
            } else {
                // Longer gap, or clock skew putting the date at or before the
                // previous one: fresh start.
                1
            }
        }
    };
    pass.progress.current_streak = next_streak;

    pass.grant_points(
        RewardRule::DailySubmission,
        1,
        format!("first submission counted for {}", context.date),
    );

    if matches!(context.date.weekday(), Weekday::Sat | Weekday::Sun) {
        pass.grant_points(RewardRule::WeekendBonus, 1, "weekend submission".to_string());
        pass.grant_badge(Badge::WeekendWarrior);
    }

    pass.progress.last_submission_date = Some(context.date);

    if next_streak >= 3 {
        pass.grant_badge(Badge::StreakStarter3);
    }
    if next_streak >= 7 {
        pass.grant_badge(Badge::StreakKeeper7);
    }
}

/// Retroactive reward for yesterday's podium. The caller only supplies a rank
/// when the bonus for that date has not been paid yet.
fn top_three_bonus(pass: &mut RewardPass<'_>, yesterday_rank: Option<(NaiveDate, u32)>) {
    let Some((yesterday, rank)) = yesterday_rank else {
        return;
    };
    let bonus = match rank {
        1 => 5,
        2 => 3,
        3 => 2,
        _ => return,
    };
    pass.grant_points(
        RewardRule::TopThreeBonus,
        bonus,
        format!("finished #{rank} on {yesterday}"),
    );
    pass.grant_badge(Badge::Top3Finisher);
    pass.progress.last_top3_bonus_date = Some(yesterday);
}

/// Cumulative milestones on the running total; only the highest unearned
/// badge is granted per pass.
fn point_milestones(pass: &mut RewardPass<'_>) {
    let points = pass.progress.points;
    if points >= 250 && !pass.progress.holds(Badge::LegendStatus) {
        pass.grant_badge(Badge::LegendStatus);
    } else if points >= 100 && !pass.progress.holds(Badge::CenturyClub) {
        pass.grant_badge(Badge::CenturyClub);
    } else if points >= 15 && !pass.progress.holds(Badge::StyleRookie) {
        // StyleRookie carries its +1 unlock bonus in the catalog, applied as
        // part of the grant.
        pass.grant_badge(Badge::StyleRookie);
    }
}
