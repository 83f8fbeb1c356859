//! RON config loader
//!
//! Loads the guild config from a RON file, with fallback to hardcoded defaults.

use std::fs;
use std::path::Path;

use super::config::GuildConfig;
use crate::error::ConfigError;

/// Default location of the guild config
pub const DEFAULT_CONFIG_PATH: &str = "assets/data/guild.ron";

/// Parse and validate a RON config string
pub fn parse_config(content: &str) -> Result<GuildConfig, ConfigError> {
    let config: GuildConfig = ron::from_str(content)?;
    config.validate()?;
    Ok(config)
}

/// Load the config at `path`, failing on any problem
pub fn load_config(path: &Path) -> Result<GuildConfig, ConfigError> {
    let content = fs::read_to_string(path)?;
    parse_config(&content)
}

/// Load the config at `path`, falling back to defaults if missing or invalid
pub fn load_config_or_default(path: &Path) -> GuildConfig {
    if !path.exists() {
        log::info!("No config at {:?}, using defaults", path);
        return GuildConfig::default();
    }

    match load_config(path) {
        Ok(config) => {
            log::info!("Config loaded from {:?}", path);
            config
        }
        Err(e) => {
            log::warn!("Failed to load {:?}: {}. Using defaults.", path, e);
            GuildConfig::default()
        }
    }
}

/// Export the default config to RON for easy editing
pub fn export_default_config(path: &Path) -> Result<(), ConfigError> {
    if let Some(parent) = path.parent() {
        if !parent.as_os_str().is_empty() {
            fs::create_dir_all(parent)?;
        }
    }

    let pretty = ron::ser::PrettyConfig::default();
    let ron = ron::ser::to_string_pretty(&GuildConfig::default(), pretty)?;
    fs::write(path, ron)?;

    log::info!("Default config written to {:?}", path);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::progression::rewards::RewardKind;

    #[test]
    fn test_export_then_load() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("data").join("guild.ron");

        export_default_config(&path).unwrap();
        assert!(path.exists());

        let config = load_config(&path).unwrap();
        assert_eq!(config, GuildConfig::default());
    }

    #[test]
    fn test_partial_config_keeps_defaults() {
        let config = parse_config("(message: (cooldown_secs: 5), xp_multiplier: 2.0)").unwrap();
        assert_eq!(config.message.cooldown_secs, 5);
        assert_eq!(config.message.min_xp, 15);
        assert_eq!(config.xp_multiplier, 2.0);
        assert_eq!(config.voice.tick_secs, 60);
    }

    #[test]
    fn test_parse_rewards() {
        let config = parse_config("(rewards: [(level: 3, kind: Role(\"Chatter\"))])").unwrap();
        assert_eq!(config.rewards.len(), 1);
        assert_eq!(config.rewards[0].kind, RewardKind::Role("Chatter".to_string()));
    }

    #[test]
    fn test_invalid_config_is_rejected() {
        assert!(matches!(parse_config("(voice: (tick_secs: 0))"), Err(ConfigError::Invalid(_))));
        assert!(matches!(parse_config("(message: oops)"), Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_missing_or_broken_file_falls_back() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("guild.ron");
        assert_eq!(load_config_or_default(&path), GuildConfig::default());

        fs::write(&path, "not ron at all (").unwrap();
        assert_eq!(load_config_or_default(&path), GuildConfig::default());
    }
}
