//! Store persistence
//!
//! Saves and loads the member store as a versioned JSON document.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use super::{MemberKey, MemberRecord, MemberStore};
use crate::error::StoreError;
use crate::progression::xp::{xp_from_f64, LevelCurve};

/// Store file version for compatibility checking
pub const STORE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct StoreFile {
    version: u32,
    members: Vec<StoredMember>,
}

#[derive(Debug, Serialize, Deserialize)]
struct StoredMember {
    guild: u64,
    user: u64,
    #[serde(flatten)]
    record: MemberRecord,
}

/// Row exported by the older document database, where numbers are doubles
#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct LegacyMember {
    guild_id: String,
    user_id: String,
    xp: f64,
    #[serde(default)]
    message_count: f64,
    #[serde(default)]
    voice_time: f64,
}

/// Get the store file path
pub fn default_store_path() -> PathBuf {
    use directories::ProjectDirs;

    if let Some(proj_dirs) = ProjectDirs::from("com", "guildxp", "Guildxp") {
        let mut path = proj_dirs.data_local_dir().to_path_buf();
        path.push("members.json");
        path
    } else {
        PathBuf::from("./members.json")
    }
}

impl MemberStore {
    /// Write every record to `path`
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        let members = self
            .snapshot()
            .into_iter()
            .map(|(key, record)| StoredMember {
                guild: key.guild,
                user: key.user,
                record,
            })
            .collect();
        let file = StoreFile {
            version: STORE_VERSION,
            members,
        };

        let json = serde_json::to_string_pretty(&file)?;
        fs::write(path, json)?;

        log::info!("Saved {} members to {:?}", file.members.len(), path);
        Ok(())
    }

    /// Load a store from `path`. A missing file gives an empty store.
    pub fn load(path: &Path) -> Result<Self, StoreError> {
        if !path.exists() {
            log::info!("No store at {:?}, starting empty", path);
            return Ok(Self::new());
        }

        let data = fs::read_to_string(path)?;
        let file: StoreFile = serde_json::from_str(&data)?;
        if file.version != STORE_VERSION {
            return Err(StoreError::VersionMismatch {
                expected: STORE_VERSION,
                found: file.version,
            });
        }

        let mut records = HashMap::with_capacity(file.members.len());
        for StoredMember { guild, user, mut record } in file.members {
            // Never trust a cached level from disk
            let level = LevelCurve::DEFAULT.level_for_xp(record.xp);
            if level != record.level {
                log::warn!(
                    "Stored level {} for user {} in guild {} disagrees with xp {}, using {}",
                    record.level, user, guild, record.xp, level
                );
                record.level = level;
            }
            records.insert(MemberKey::new(guild, user), record);
        }

        log::info!("Loaded {} members from {:?}", records.len(), path);
        Ok(Self::from_records(records))
    }
}

/// A validated row from the legacy database export
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LegacyRow {
    pub key: MemberKey,
    pub xp: u64,
    pub message_count: u64,
    pub voice_seconds: u64,
}

/// Parse and validate rows exported from the legacy database.
///
/// Nothing is written here; `LevelingService::import_legacy` applies the rows
/// so imported level-ups pay their rewards.
pub fn parse_legacy_json(json: &str) -> Result<Vec<LegacyRow>, StoreError> {
    let rows: Vec<LegacyMember> = serde_json::from_str(json)?;

    let mut parsed = Vec::with_capacity(rows.len());
    for row in rows {
        let guild = parse_snowflake(&row.guild_id)?;
        let user = parse_snowflake(&row.user_id)?;
        let invalid = |e: crate::error::LevelError| {
            StoreError::InvalidData(format!("user {} in guild {}: {}", user, guild, e))
        };
        parsed.push(LegacyRow {
            key: MemberKey::new(guild, user),
            xp: xp_from_f64(row.xp).map_err(invalid)?,
            message_count: xp_from_f64(row.message_count).map_err(invalid)?,
            voice_seconds: xp_from_f64(row.voice_time).map_err(invalid)?,
        });
    }
    Ok(parsed)
}

fn parse_snowflake(id: &str) -> Result<u64, StoreError> {
    id.parse()
        .map_err(|_| StoreError::InvalidData(format!("invalid snowflake '{}'", id)))
}
