//! Progression systems

pub mod xp;
pub mod rewards;
pub mod achievements;

pub use xp::{
    BASE_XP_PER_LEVEL, XP_MULTIPLIER, LevelCurve, LevelProgress,
    calculate_level, calculate_required_xp, calculate_level_progress, xp_from_f64, level_title,
};
pub use rewards::{LevelReward, RewardKind, grant_rewards, pending_rewards};
pub use achievements::{
    all_achievements, check_achievements, find_achievement, Achievement, AchievementTrigger,
};
