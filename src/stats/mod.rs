//! Stats read API
//!
//! What the dashboard and profile cards display: level, progress bar and
//! rank within the guild.

use serde::Serialize;

use crate::progression::xp::{level_title, LevelProgress};
use crate::store::{GuildId, MemberRecord, MemberStore, UserId};

/// Display-ready stats for one member
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MemberStats {
    pub user: UserId,
    pub xp: u64,
    pub level: u64,
    pub title: &'static str,
    pub progress: LevelProgress,
    /// 1-based position on the guild leaderboard
    pub rank: usize,
    pub points: u64,
    pub message_count: u64,
    pub voice_minutes: u64,
    pub achievements: usize,
    pub background: String,
    pub accent_color: String,
}

impl MemberStats {
    fn from_record(user: UserId, record: &MemberRecord, rank: usize) -> Self {
        Self {
            user,
            xp: record.xp,
            level: record.level,
            title: level_title(record.level),
            progress: record.progress(),
            rank,
            points: record.points,
            message_count: record.message_count,
            voice_minutes: record.voice_minutes(),
            achievements: record.achievements.len(),
            background: record.card.background.clone(),
            accent_color: record.card.accent_color.clone(),
        }
    }
}

/// Guild members ordered by XP (highest first), ties broken by user id
fn ranked(store: &MemberStore, guild: GuildId) -> Vec<(UserId, MemberRecord)> {
    let mut members = store.guild_members(guild);
    members.sort_by(|(a_user, a), (b_user, b)| b.xp.cmp(&a.xp).then(a_user.cmp(b_user)));
    members
}

/// Top `limit` members of a guild
pub fn leaderboard(store: &MemberStore, guild: GuildId, limit: usize) -> Vec<MemberStats> {
    ranked(store, guild)
        .iter()
        .take(limit)
        .enumerate()
        .map(|(i, (user, record))| MemberStats::from_record(*user, record, i + 1))
        .collect()
}

/// Stats for a single member, if they have a record in the guild
pub fn member_stats(store: &MemberStore, guild: GuildId, user: UserId) -> Option<MemberStats> {
    ranked(store, guild)
        .iter()
        .enumerate()
        .find(|(_, (u, _))| *u == user)
        .map(|(i, (_, record))| MemberStats::from_record(user, record, i + 1))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemberKey;

    fn store() -> MemberStore {
        let store = MemberStore::new();
        store.update(MemberKey::new(1, 30), |record| record.add_xp(500));
        store.update(MemberKey::new(1, 10), |record| record.add_xp(120));
        store.update(MemberKey::new(1, 20), |record| record.add_xp(500));
        store.update(MemberKey::new(2, 40), |record| record.add_xp(9_000));
        store
    }

    #[test]
    fn test_leaderboard_order_and_ranks() {
        let board = leaderboard(&store(), 1, 10);
        let order: Vec<(UserId, usize)> = board.iter().map(|s| (s.user, s.rank)).collect();
        assert_eq!(order, vec![(20, 1), (30, 2), (10, 3)]);
    }

    #[test]
    fn test_leaderboard_limit() {
        let board = leaderboard(&store(), 1, 2);
        assert_eq!(board.len(), 2);
        assert!(leaderboard(&store(), 3, 5).is_empty());
    }

    #[test]
    fn test_member_stats_progress() {
        let stats = member_stats(&store(), 1, 10).unwrap();
        assert_eq!(stats.rank, 3);
        assert_eq!(stats.level, 2);
        assert_eq!(stats.title, "Newcomer");
        // 120 XP: 20 into the 100..229 band
        assert_eq!(stats.progress.current_xp, 20);
        assert_eq!(stats.progress.required_xp, 129);
        assert_eq!(stats.progress.percentage, 15);
    }

    #[test]
    fn test_member_stats_unknown_user() {
        assert!(member_stats(&store(), 1, 99).is_none());
        assert!(member_stats(&store(), 2, 10).is_none());
    }

    #[test]
    fn test_stats_serialize_for_dashboard() {
        let stats = member_stats(&store(), 2, 40).unwrap();
        let json = serde_json::to_value(&stats).unwrap();
        assert_eq!(json["rank"], 1);
        assert_eq!(json["progress"]["required_xp"], stats.progress.required_xp);
    }
}
