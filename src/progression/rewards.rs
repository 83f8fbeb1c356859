//! Level rewards
//!
//! Rewards configured per level, paid out once when a member reaches it.

use serde::{Deserialize, Serialize};

use crate::store::MemberRecord;

/// What a level reward grants
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum RewardKind {
    /// A Discord role, assigned by the gateway side
    Role(String),
    /// Points added to the member's balance
    Points(u64),
    /// A profile card background
    Cosmetic(String),
}

/// Reward granted on reaching `level`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelReward {
    pub level: u64,
    pub kind: RewardKind,
}

/// Rewards in `(old_level, new_level]` whose level has not been claimed yet
pub fn pending_rewards<'a>(
    rewards: &'a [LevelReward],
    record: &MemberRecord,
    old_level: u64,
    new_level: u64,
) -> Vec<&'a LevelReward> {
    rewards
        .iter()
        .filter(|r| r.level > old_level && r.level <= new_level)
        .filter(|r| !record.claimed_rewards.contains(&r.level))
        .collect()
}

/// Grant every pending reward and mark its level claimed.
///
/// Levels skipped by a large XP jump still pay out. Returns what was granted
/// so the caller can assign roles and announce the level-up.
pub fn grant_rewards(
    rewards: &[LevelReward],
    record: &mut MemberRecord,
    old_level: u64,
    new_level: u64,
) -> Vec<LevelReward> {
    let granted: Vec<LevelReward> = pending_rewards(rewards, record, old_level, new_level)
        .into_iter()
        .cloned()
        .collect();

    for reward in &granted {
        match &reward.kind {
            RewardKind::Role(role) => {
                record.roles.insert(role.clone());
            }
            RewardKind::Points(points) => {
                record.points = record.points.saturating_add(*points);
            }
            RewardKind::Cosmetic(background) => {
                record.card.unlocked.insert(background.clone());
            }
        }
        record.claimed_rewards.insert(reward.level);
        log::debug!("Granted level {} reward {:?}", reward.level, reward.kind);
    }

    granted
}
