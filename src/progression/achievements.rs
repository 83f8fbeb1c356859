//! Achievements
//!
//! Milestones unlocked from a member's running totals.

use serde::{Deserialize, Serialize};

use crate::store::MemberRecord;

/// Condition that unlocks an achievement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AchievementTrigger {
    MessagesSent(u64),
    VoiceMinutes(u64),
    ReachedLevel(u64),
}

impl AchievementTrigger {
    pub fn is_met(&self, record: &MemberRecord) -> bool {
        match *self {
            AchievementTrigger::MessagesSent(n) => record.message_count >= n,
            AchievementTrigger::VoiceMinutes(n) => record.voice_minutes() >= n,
            AchievementTrigger::ReachedLevel(n) => record.level >= n,
        }
    }
}

/// Achievement definition
#[derive(Debug, Clone)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub hidden: bool,
    pub trigger: AchievementTrigger,
}

/// Unlock every achievement `record` now satisfies. Returns the new ones.
pub fn check_achievements(record: &mut MemberRecord) -> Vec<Achievement> {
    let mut unlocked = Vec::new();
    for achievement in all_achievements() {
        if achievement.trigger.is_met(record) && record.unlock_achievement(achievement.id) {
            unlocked.push(achievement);
        }
    }
    unlocked
}

/// Look up an achievement by id
pub fn find_achievement(id: &str) -> Option<Achievement> {
    all_achievements().into_iter().find(|a| a.id == id)
}

/// Get all achievement definitions
pub fn all_achievements() -> Vec<Achievement> {
    use AchievementTrigger::*;

    vec![
        // Message achievements
        Achievement {
            id: "first_message",
            name: "Hello There",
            description: "Send your first message",
            hidden: false,
            trigger: MessagesSent(1),
        },
        Achievement {
            id: "messages_100",
            name: "Chatterbox",
            description: "Send 100 messages",
            hidden: false,
            trigger: MessagesSent(100),
        },
        Achievement {
            id: "messages_1000",
            name: "Town Crier",
            description: "Send 1,000 messages",
            hidden: false,
            trigger: MessagesSent(1000),
        },
        // Voice achievements
        Achievement {
            id: "voice_60",
            name: "Tuned In",
            description: "Spend an hour in voice channels",
            hidden: false,
            trigger: VoiceMinutes(60),
        },
        Achievement {
            id: "voice_600",
            name: "On Air",
            description: "Spend ten hours in voice channels",
            hidden: false,
            trigger: VoiceMinutes(600),
        },
        // Level achievements
        Achievement {
            id: "level_5",
            name: "Settling In",
            description: "Reach level 5",
            hidden: false,
            trigger: ReachedLevel(5),
        },
        Achievement {
            id: "level_10",
            name: "Regular",
            description: "Reach level 10",
            hidden: false,
            trigger: ReachedLevel(10),
        },
        Achievement {
            id: "level_25",
            name: "Pillar of the Community",
            description: "Reach level 25",
            hidden: false,
            trigger: ReachedLevel(25),
        },
        // Hidden achievements
        Achievement {
            id: "level_50",
            name: "Lives Here",
            description: "Reach level 50",
            hidden: true,
            trigger: ReachedLevel(50),
        },
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_ids_are_unique() {
        let mut ids: Vec<&str> = all_achievements().iter().map(|a| a.id).collect();
        let total = ids.len();
        ids.sort_unstable();
        ids.dedup();
        assert_eq!(ids.len(), total);
    }

    #[test]
    fn test_first_message_unlocks_once() {
        let mut record = MemberRecord::new();
        assert!(check_achievements(&mut record).is_empty());

        record.message_count = 1;
        let unlocked = check_achievements(&mut record);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(unlocked[0].id, "first_message");
        assert!(check_achievements(&mut record).is_empty());
    }

    #[test]
    fn test_level_and_voice_triggers() {
        let mut record = MemberRecord::new();
        record.voice_seconds = 3_600;
        record.set_xp(2_000);
        assert!(record.level >= 10);

        let ids: Vec<&str> = check_achievements(&mut record).iter().map(|a| a.id).collect();
        assert!(ids.contains(&"voice_60"));
        assert!(ids.contains(&"level_5"));
        assert!(ids.contains(&"level_10"));
        assert!(!ids.contains(&"level_25"));
    }

    #[test]
    fn test_find_achievement() {
        assert_eq!(find_achievement("voice_600").map(|a| a.name), Some("On Air"));
        assert!(find_achievement("nope").is_none());
    }
}
