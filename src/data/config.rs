//! Guild configuration
//!
//! Admin-tunable activity rates and level rewards. The level curve itself is
//! not configurable here; it lives in `progression::xp`.

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::progression::rewards::{LevelReward, RewardKind};

/// Message XP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MessageConfig {
    /// Smallest XP roll per message
    pub min_xp: u64,
    /// Largest XP roll per message
    pub max_xp: u64,
    /// Seconds after an XP-earning message during which messages earn nothing
    pub cooldown_secs: u64,
    /// Messages shorter than this (in chars) earn nothing
    pub min_length: usize,
}

impl Default for MessageConfig {
    fn default() -> Self {
        Self {
            min_xp: 15,
            max_xp: 25,
            cooldown_secs: 60,
            min_length: 1,
        }
    }
}

/// Voice XP settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct VoiceConfig {
    /// XP per completed tick in a voice channel
    pub xp_per_tick: u64,
    /// Tick length in seconds
    pub tick_secs: u64,
}

impl Default for VoiceConfig {
    fn default() -> Self {
        Self {
            xp_per_tick: 10,
            tick_secs: 60,
        }
    }
}

/// Complete guild configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GuildConfig {
    pub message: MessageConfig,
    pub voice: VoiceConfig,
    /// Scales every XP award (double-XP weekends and the like)
    pub xp_multiplier: f32,
    /// Rewards granted on reaching a level
    pub rewards: Vec<LevelReward>,
    pub achievements_enabled: bool,
}

impl Default for GuildConfig {
    fn default() -> Self {
        Self {
            message: MessageConfig::default(),
            voice: VoiceConfig::default(),
            xp_multiplier: 1.0,
            rewards: default_rewards(),
            achievements_enabled: true,
        }
    }
}

impl GuildConfig {
    /// Reject settings the activity handlers cannot work with
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.message.min_xp > self.message.max_xp {
            return Err(ConfigError::Invalid(format!(
                "message.min_xp ({}) exceeds message.max_xp ({})",
                self.message.min_xp, self.message.max_xp
            )));
        }
        if self.voice.tick_secs == 0 {
            return Err(ConfigError::Invalid("voice.tick_secs must be positive".to_string()));
        }
        if !self.xp_multiplier.is_finite() || self.xp_multiplier < 0.0 {
            return Err(ConfigError::Invalid(format!(
                "xp_multiplier must be finite and non-negative, got {}",
                self.xp_multiplier
            )));
        }
        if let Some(reward) = self.rewards.iter().find(|r| r.level < 2) {
            return Err(ConfigError::Invalid(format!(
                "reward at level {} can never be reached",
                reward.level
            )));
        }
        Ok(())
    }

    /// Apply the guild multiplier to a base award
    pub fn scale_xp(&self, base_xp: u64) -> u64 {
        let scaled = base_xp as f64 * f64::from(self.xp_multiplier);
        scaled.round() as u64
    }
}

/// Rewards shipped with a fresh install
pub fn default_rewards() -> Vec<LevelReward> {
    vec![
        LevelReward { level: 2, kind: RewardKind::Points(50) },
        LevelReward { level: 5, kind: RewardKind::Role("Active".to_string()) },
        LevelReward { level: 5, kind: RewardKind::Cosmetic("sunset".to_string()) },
        LevelReward { level: 10, kind: RewardKind::Points(250) },
        LevelReward { level: 10, kind: RewardKind::Cosmetic("nebula".to_string()) },
        LevelReward { level: 20, kind: RewardKind::Role("Veteran".to_string()) },
        LevelReward { level: 30, kind: RewardKind::Cosmetic("aurora".to_string()) },
    ]
}
