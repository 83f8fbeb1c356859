//! Member store
//!
//! Holds every member record and serializes updates per key, so an XP
//! increment and the level recompute that follows it land as one step.
//! XP changes that should pay rewards go through `LevelingService`.

pub mod member;
pub mod storage;

pub use member::{
    GuildId, MemberKey, MemberRecord, ProfileCard, UserId, DEFAULT_ACCENT, DEFAULT_BACKGROUND,
};
pub use storage::{default_store_path, parse_legacy_json, LegacyRow, STORE_VERSION};

use parking_lot::Mutex;
use std::collections::HashMap;

/// Thread-safe map of member records
#[derive(Debug, Default)]
pub struct MemberStore {
    members: Mutex<HashMap<MemberKey, MemberRecord>>,
}

impl MemberStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn from_records(records: HashMap<MemberKey, MemberRecord>) -> Self {
        Self {
            members: Mutex::new(records),
        }
    }

    /// Copy of a member's record
    pub fn get(&self, key: MemberKey) -> Option<MemberRecord> {
        self.members.lock().get(&key).cloned()
    }

    /// Run `f` on a member's record with the store locked.
    ///
    /// A default record is created for members seen for the first time.
    pub fn update<R>(&self, key: MemberKey, f: impl FnOnce(&mut MemberRecord) -> R) -> R {
        let mut members = self.members.lock();
        let record = members.entry(key).or_default();
        f(record)
    }

    pub fn remove(&self, key: MemberKey) -> Option<MemberRecord> {
        self.members.lock().remove(&key)
    }

    /// All members of a guild
    pub fn guild_members(&self, guild: GuildId) -> Vec<(UserId, MemberRecord)> {
        self.members
            .lock()
            .iter()
            .filter(|(key, _)| key.guild == guild)
            .map(|(key, record)| (key.user, record.clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.members.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.members.lock().is_empty()
    }

    /// Consistent copy of every record, sorted by key
    pub fn snapshot(&self) -> Vec<(MemberKey, MemberRecord)> {
        let mut records: Vec<_> = self
            .members
            .lock()
            .iter()
            .map(|(key, record)| (*key, record.clone()))
            .collect();
        records.sort_by_key(|(key, _)| *key);
        records
    }
}
