use serde::{Deserialize, Serialize};

/// Closed set of achievement badges. Guard checks in the perks evaluator and
/// catalog lookups for presentation share this one source of truth; badge
/// identifiers never appear as loose string literals elsewhere.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[serde(rename_all = "snake_case")]
pub enum Badge {
    FirstSubmission,
    PerfectScore,
    WeekendWarrior,
    #[serde(rename = "streak_starter_3")]
    StreakStarter3,
    #[serde(rename = "streak_keeper_7")]
    StreakKeeper7,
    #[serde(rename = "top_3_finisher")]
    Top3Finisher,
    StyleRookie,
    CenturyClub,
    LegendStatus,
}

impl Badge {
    pub const ALL: [Badge; 9] = [
        Badge::FirstSubmission,
        Badge::PerfectScore,
        Badge::WeekendWarrior,
        Badge::StreakStarter3,
        Badge::StreakKeeper7,
        Badge::Top3Finisher,
        Badge::StyleRookie,
        Badge::CenturyClub,
        Badge::LegendStatus,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Badge::FirstSubmission => "first_submission",
            Badge::PerfectScore => "perfect_score",
            Badge::WeekendWarrior => "weekend_warrior",
            Badge::StreakStarter3 => "streak_starter_3",
            Badge::StreakKeeper7 => "streak_keeper_7",
            Badge::Top3Finisher => "top_3_finisher",
            Badge::StyleRookie => "style_rookie",
            Badge::CenturyClub => "century_club",
            Badge::LegendStatus => "legend_status",
        }
    }
}

/// Static description of a badge and its one-time unlock reward.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct BadgeDefinition {
    pub badge: Badge,
    pub display_name: &'static str,
    pub description: &'static str,
    pub point_reward: u32,
}

// Ordered to match the enum so `definition` can index directly.
const CATALOG: [BadgeDefinition; 9] = [
    BadgeDefinition {
        badge: Badge::FirstSubmission,
        display_name: "First Fit",
        description: "Submitted an outfit for the very first time.",
        point_reward: 3,
    },
    BadgeDefinition {
        badge: Badge::PerfectScore,
        display_name: "Perfect Ten",
        description: "Scored a flawless 10 on a submission.",
        point_reward: 5,
    },
    BadgeDefinition {
        badge: Badge::WeekendWarrior,
        display_name: "Weekend Warrior",
        description: "Submitted an outfit on a Saturday or Sunday.",
        point_reward: 0,
    },
    BadgeDefinition {
        badge: Badge::StreakStarter3,
        display_name: "Streak Starter",
        description: "Reached a three-day submission streak.",
        point_reward: 2,
    },
    BadgeDefinition {
        badge: Badge::StreakKeeper7,
        display_name: "Streak Keeper",
        description: "Held a submission streak for a full week.",
        point_reward: 5,
    },
    BadgeDefinition {
        badge: Badge::Top3Finisher,
        display_name: "Podium Finish",
        description: "Placed in the top three of a daily leaderboard.",
        point_reward: 0,
    },
    BadgeDefinition {
        badge: Badge::StyleRookie,
        display_name: "Style Rookie",
        description: "Collected 15 career points.",
        point_reward: 1,
    },
    BadgeDefinition {
        badge: Badge::CenturyClub,
        display_name: "Century Club",
        description: "Collected 100 career points.",
        point_reward: 0,
    },
    BadgeDefinition {
        badge: Badge::LegendStatus,
        display_name: "Legend Status",
        description: "Collected 250 career points.",
        point_reward: 0,
    },
];

/// Every badge the engine can award, in declaration order.
pub fn all() -> &'static [BadgeDefinition] {
    &CATALOG
}

/// Catalog entry for a badge.
pub fn definition(badge: Badge) -> &'static BadgeDefinition {
    &CATALOG[badge as usize]
}
