//! Guild configuration data
//!
//! This module handles loading admin settings from external RON files,
//! so rates and rewards can change without a rebuild.

pub mod config;
pub mod loader;

pub use config::{GuildConfig, MessageConfig, VoiceConfig};
pub use loader::{
    export_default_config, load_config, load_config_or_default, parse_config, DEFAULT_CONFIG_PATH,
};
