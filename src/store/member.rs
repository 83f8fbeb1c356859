//! Per-member records
//!
//! Everything persisted for one user in one guild.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::error::BotError;
use crate::progression::xp::{LevelCurve, LevelProgress};

/// Discord guild snowflake
pub type GuildId = u64;
/// Discord user snowflake
pub type UserId = u64;

/// Store key: one record per user per guild
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct MemberKey {
    pub guild: GuildId,
    pub user: UserId,
}

impl MemberKey {
    pub fn new(guild: GuildId, user: UserId) -> Self {
        Self { guild, user }
    }
}

/// Background every member starts with
pub const DEFAULT_BACKGROUND: &str = "default";
/// Accent color every member starts with
pub const DEFAULT_ACCENT: &str = "#5865f2";

/// Profile card cosmetics
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProfileCard {
    /// Selected background id
    pub background: String,
    /// Accent color as `#rrggbb`
    pub accent_color: String,
    /// Backgrounds this member may select
    pub unlocked: BTreeSet<String>,
}

impl Default for ProfileCard {
    fn default() -> Self {
        Self {
            background: DEFAULT_BACKGROUND.to_string(),
            accent_color: DEFAULT_ACCENT.to_string(),
            unlocked: BTreeSet::from([DEFAULT_BACKGROUND.to_string()]),
        }
    }
}

impl ProfileCard {
    /// Switch to an unlocked background
    pub fn select_background(&mut self, background: &str) -> Result<(), BotError> {
        if !self.unlocked.contains(background) {
            return Err(BotError::CosmeticLocked(background.to_string()));
        }
        self.background = background.to_string();
        Ok(())
    }

    /// Set the accent color, accepting `#rrggbb` only
    pub fn set_accent_color(&mut self, color: &str) -> Result<(), BotError> {
        let hex = color.strip_prefix('#').unwrap_or("");
        if hex.len() != 6 || !hex.chars().all(|c| c.is_ascii_hexdigit()) {
            return Err(BotError::InvalidColor(color.to_string()));
        }
        self.accent_color = color.to_ascii_lowercase();
        Ok(())
    }
}

/// Persistent member record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MemberRecord {
    /// Cumulative experience
    pub xp: u64,
    /// Cached level, always `calculate_level(xp)` after an update
    pub level: u64,
    /// Points granted by level rewards
    #[serde(default)]
    pub points: u64,
    /// Messages seen, including ones inside the cooldown
    #[serde(default)]
    pub message_count: u64,
    /// Total time spent in voice channels
    #[serde(default)]
    pub voice_seconds: u64,
    /// Unix time of the last message that earned XP
    #[serde(default)]
    pub last_message_at: Option<u64>,
    /// Unlocked achievement ids
    #[serde(default)]
    pub achievements: BTreeSet<String>,
    /// Levels whose rewards were already granted
    #[serde(default)]
    pub claimed_rewards: BTreeSet<u64>,
    /// Roles granted by level rewards
    #[serde(default)]
    pub roles: BTreeSet<String>,
    #[serde(default)]
    pub card: ProfileCard,
}

impl Default for MemberRecord {
    fn default() -> Self {
        Self {
            xp: 0,
            level: 1,
            points: 0,
            message_count: 0,
            voice_seconds: 0,
            last_message_at: None,
            achievements: BTreeSet::new(),
            claimed_rewards: BTreeSet::new(),
            roles: BTreeSet::new(),
            card: ProfileCard::default(),
        }
    }
}

impl MemberRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Set XP and recompute the cached level. Returns the previous level.
    ///
    /// Rewards for levels crossed here are paid by `LevelingService`.
    pub(crate) fn set_xp(&mut self, xp: u64) -> u64 {
        let old_level = self.level;
        self.xp = xp;
        self.level = LevelCurve::DEFAULT.level_for_xp(xp);
        old_level
    }

    /// Add XP (saturating) and recompute the level. Returns the previous level.
    pub(crate) fn add_xp(&mut self, amount: u64) -> u64 {
        self.set_xp(self.xp.saturating_add(amount))
    }

    /// Progress through the current level band
    pub fn progress(&self) -> LevelProgress {
        // level is kept >= 1 by set_xp and on load
        LevelCurve::DEFAULT
            .progress(self.xp, self.level.max(1))
            .unwrap_or(LevelProgress { current_xp: 0, required_xp: 0, percentage: 0 })
    }

    pub fn voice_minutes(&self) -> u64 {
        self.voice_seconds / 60
    }

    /// Check if an achievement is unlocked
    pub fn has_achievement(&self, achievement_id: &str) -> bool {
        self.achievements.contains(achievement_id)
    }

    /// Unlock an achievement, returning false if it was already unlocked
    pub fn unlock_achievement(&mut self, achievement_id: &str) -> bool {
        if self.achievements.insert(achievement_id.to_string()) {
            log::info!("Achievement unlocked: {}", achievement_id);
            true
        } else {
            false
        }
    }
}
