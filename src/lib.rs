//! Guildxp - activity tracking and leveling for Discord communities
//!
//! Members earn XP from messages and voice time, climb a shared level
//! curve, and collect rewards, achievements and profile cosmetics.

pub mod error;
pub mod progression;
pub mod activity;
pub mod store;
pub mod data;
pub mod service;
pub mod stats;

// Re-export commonly used types
pub use error::{BotError, ConfigError, LevelError, StoreError};
pub use progression::{
    calculate_level, calculate_level_progress, calculate_required_xp, LevelCurve, LevelProgress,
    BASE_XP_PER_LEVEL, XP_MULTIPLIER,
};
pub use activity::ActivityEvent;
pub use data::GuildConfig;
pub use service::{LevelUp, LevelingService, Outcome};
pub use store::{MemberKey, MemberRecord, MemberStore};
