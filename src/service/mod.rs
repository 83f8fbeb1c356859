//! Leveling service
//!
//! Applies activity events to member records. Each event is one locked update
//! of the member's record: award, level recompute, rewards and achievements
//! all land together.

use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::sync::Arc;
use std::time::Duration;

use crate::activity::{apply_message, ActivityEvent, VoiceTracker};
use crate::data::GuildConfig;
use crate::error::Result;
use crate::progression::{check_achievements, grant_rewards, LevelReward};
use crate::store::{parse_legacy_json, MemberKey, MemberRecord, MemberStore};

/// A level-up and the rewards it paid
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LevelUp {
    pub old_level: u64,
    pub new_level: u64,
    pub rewards: Vec<LevelReward>,
}

/// What one event did to a member
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub key: MemberKey,
    pub xp_awarded: u64,
    pub xp_total: u64,
    pub level_up: Option<LevelUp>,
    /// Ids of achievements unlocked by this event
    pub achievements: Vec<&'static str>,
}

/// Ties config, store and voice bookkeeping together
pub struct LevelingService<R = StdRng> {
    config: GuildConfig,
    store: Arc<MemberStore>,
    voice: Mutex<VoiceTracker>,
    rng: Mutex<R>,
}

impl LevelingService<StdRng> {
    /// Create a service with an entropy-seeded RNG
    pub fn new(config: GuildConfig, store: Arc<MemberStore>) -> Result<Self> {
        Self::with_rng(config, store, StdRng::from_entropy())
    }
}

impl<R: Rng> LevelingService<R> {
    /// Create a service with a caller-supplied RNG
    pub fn with_rng(config: GuildConfig, store: Arc<MemberStore>, rng: R) -> Result<Self> {
        config.validate()?;
        let voice = VoiceTracker::new(Duration::from_secs(config.voice.tick_secs));
        Ok(Self {
            config,
            store,
            voice: Mutex::new(voice),
            rng: Mutex::new(rng),
        })
    }

    pub fn config(&self) -> &GuildConfig {
        &self.config
    }

    pub fn store(&self) -> &Arc<MemberStore> {
        &self.store
    }

    /// Apply one activity event
    pub fn handle_event(&self, event: &ActivityEvent) -> Outcome {
        let key = event.key();
        match *event {
            ActivityEvent::Message { at, length, .. } => self.apply(key, |record| {
                let mut rng = self.rng.lock();
                apply_message(&self.config, record, at, length, &mut *rng)
            }),
            ActivityEvent::VoiceJoin { channel, at, .. } => {
                self.voice.lock().join(key, channel, at);
                self.unchanged(key)
            }
            ActivityEvent::VoiceLeave { at, .. } => {
                let elapsed = self.voice.lock().leave(key, at);
                match elapsed {
                    Some(seconds) => self.apply(key, |record| {
                        record.voice_seconds = record.voice_seconds.saturating_add(seconds);
                        0
                    }),
                    None => {
                        log::debug!("User {} left voice without a session", key.user);
                        self.unchanged(key)
                    }
                }
            }
            ActivityEvent::VoiceTick { tick, .. } => {
                if self.voice.lock().claim_tick(key, tick) {
                    self.apply(key, |_| self.voice_award())
                } else {
                    log::debug!("Tick {} for user {} already paid or no session", tick, key.user);
                    self.unchanged(key)
                }
            }
        }
    }

    /// Advance the voice timer by `delta` and pay every completed tick
    pub fn advance_voice(&self, delta: Duration) -> Vec<Outcome> {
        let awards = self.voice.lock().advance(delta);
        awards
            .into_iter()
            .map(|(key, _)| self.apply(key, |_| self.voice_award()))
            .collect()
    }

    /// Overwrite a member's XP total.
    ///
    /// Raising XP pays the rewards of every level crossed, like earned XP
    /// does. Lowering it keeps rewards already granted.
    pub fn set_xp(&self, key: MemberKey, xp: u64) -> Outcome {
        self.store.update(key, |record| {
            let old_level = record.set_xp(xp);
            log::info!(
                "Set XP for user {} in guild {} to {} (level {} -> {})",
                key.user, key.guild, xp, old_level, record.level
            );
            self.settle(key, record, old_level, 0)
        })
    }

    /// Merge rows exported from the legacy database.
    ///
    /// Every row is validated before any record changes. Imported totals
    /// replace the stored ones and pay the rewards of the levels they reach.
    pub fn import_legacy(&self, json: &str) -> Result<Vec<Outcome>> {
        let rows = parse_legacy_json(json)?;

        let outcomes: Vec<Outcome> = rows
            .into_iter()
            .map(|row| {
                self.store.update(row.key, |record| {
                    record.message_count = row.message_count;
                    record.voice_seconds = row.voice_seconds;
                    let old_level = record.set_xp(row.xp);
                    self.settle(row.key, record, old_level, 0)
                })
            })
            .collect();

        log::info!("Imported {} legacy members", outcomes.len());
        Ok(outcomes)
    }

    /// Change a member's profile background
    pub fn select_background(&self, key: MemberKey, background: &str) -> Result<()> {
        self.store.update(key, |record| record.card.select_background(background))
    }

    /// Change a member's profile accent color
    pub fn set_accent_color(&self, key: MemberKey, color: &str) -> Result<()> {
        self.store.update(key, |record| record.card.set_accent_color(color))
    }

    fn voice_award(&self) -> u64 {
        self.config.scale_xp(self.config.voice.xp_per_tick)
    }

    fn apply(&self, key: MemberKey, award: impl FnOnce(&mut MemberRecord) -> u64) -> Outcome {
        self.store.update(key, |record| {
            let xp_awarded = award(record);
            let old_level = record.add_xp(xp_awarded);
            if xp_awarded > 0 {
                log::debug!("User {} in guild {} earned {} XP", key.user, key.guild, xp_awarded);
            }
            self.settle(key, record, old_level, xp_awarded)
        })
    }

    /// Pay rewards for levels crossed since `old_level` and check achievements
    fn settle(
        &self,
        key: MemberKey,
        record: &mut MemberRecord,
        old_level: u64,
        xp_awarded: u64,
    ) -> Outcome {
        let level_up = if record.level > old_level {
            let rewards = grant_rewards(&self.config.rewards, record, old_level, record.level);
            log::info!(
                "User {} in guild {} leveled up: {} -> {}",
                key.user, key.guild, old_level, record.level
            );
            Some(LevelUp {
                old_level,
                new_level: record.level,
                rewards,
            })
        } else {
            None
        };

        let achievements = if self.config.achievements_enabled {
            check_achievements(record).into_iter().map(|a| a.id).collect()
        } else {
            Vec::new()
        };

        Outcome {
            key,
            xp_awarded,
            xp_total: record.xp,
            level_up,
            achievements,
        }
    }

    /// Outcome for an event that leaves the member's record alone
    fn unchanged(&self, key: MemberKey) -> Outcome {
        Outcome {
            key,
            xp_awarded: 0,
            xp_total: self.store.get(key).map_or(0, |record| record.xp),
            level_up: None,
            achievements: Vec::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::BotError;
    use crate::progression::RewardKind;
    use crate::stats::leaderboard;

    fn fixed_config(xp: u64) -> GuildConfig {
        let mut config = GuildConfig::default();
        config.message.min_xp = xp;
        config.message.max_xp = xp;
        config.message.cooldown_secs = 0;
        config
    }

    fn service(config: GuildConfig) -> LevelingService {
        LevelingService::with_rng(config, Arc::new(MemberStore::new()), StdRng::seed_from_u64(9)).unwrap()
    }

    fn message(user: u64, at: u64) -> ActivityEvent {
        ActivityEvent::Message { guild: 1, user, at, length: 12 }
    }

    #[test]
    fn test_rejects_invalid_config() {
        let mut config = GuildConfig::default();
        config.voice.tick_secs = 0;
        let result = LevelingService::new(config, Arc::new(MemberStore::new()));
        assert!(matches!(result, Err(BotError::Config(_))));
    }

    #[test]
    fn test_levels_follow_running_total() {
        let service = service(fixed_config(50));
        let mut levels = vec![service.store().get(MemberKey::new(1, 5)).map_or(1, |r| r.level)];
        for at in 0..4 {
            service.handle_event(&message(5, at));
            levels.push(service.store().get(MemberKey::new(1, 5)).unwrap().level);
        }
        // 0, 50, 100, 150, 200 XP
        assert_eq!(levels, vec![1, 1, 2, 2, 2]);
    }

    #[test]
    fn test_level_up_grants_rewards() {
        let service = service(fixed_config(100));
        let outcome = service.handle_event(&message(5, 0));

        let level_up = outcome.level_up.expect("should level up");
        assert_eq!((level_up.old_level, level_up.new_level), (1, 2));
        assert_eq!(level_up.rewards, vec![LevelReward { level: 2, kind: RewardKind::Points(50) }]);
        assert_eq!(service.store().get(outcome.key).unwrap().points, 50);
        assert!(outcome.achievements.contains(&"first_message"));
    }

    #[test]
    fn test_cooldown_through_service() {
        let mut config = fixed_config(20);
        config.message.cooldown_secs = 60;
        let service = service(config);

        assert_eq!(service.handle_event(&message(5, 0)).xp_awarded, 20);
        assert_eq!(service.handle_event(&message(5, 10)).xp_awarded, 0);
        let record = service.store().get(MemberKey::new(1, 5)).unwrap();
        assert_eq!((record.xp, record.message_count), (20, 2));
    }

    #[test]
    fn test_voice_ticks_pay_once() {
        let service = service(GuildConfig::default());
        let join = ActivityEvent::VoiceJoin { guild: 1, user: 5, channel: 77, at: 0 };
        let tick = ActivityEvent::VoiceTick { guild: 1, user: 5, tick: 1, at: 60 };

        assert_eq!(service.handle_event(&tick).xp_awarded, 0);
        service.handle_event(&join);
        assert_eq!(service.handle_event(&tick).xp_awarded, 10);
        assert_eq!(service.handle_event(&tick).xp_awarded, 0);

        let leave = ActivityEvent::VoiceLeave { guild: 1, user: 5, at: 90 };
        service.handle_event(&leave);
        let record = service.store().get(MemberKey::new(1, 5)).unwrap();
        assert_eq!((record.xp, record.voice_seconds), (10, 90));
    }

    #[test]
    fn test_advance_voice_pays_open_sessions() {
        let service = service(GuildConfig::default());
        service.handle_event(&ActivityEvent::VoiceJoin { guild: 1, user: 5, channel: 77, at: 0 });
        service.handle_event(&ActivityEvent::VoiceJoin { guild: 1, user: 6, channel: 77, at: 0 });

        let outcomes = service.advance_voice(Duration::from_secs(180));
        assert_eq!(outcomes.len(), 6);
        assert!(outcomes.iter().all(|o| o.xp_awarded == 10));
        assert_eq!(service.store().get(MemberKey::new(1, 6)).unwrap().xp, 30);
    }

    #[test]
    fn test_achievements_can_be_disabled() {
        let mut config = fixed_config(10);
        config.achievements_enabled = false;
        let service = service(config);
        let outcome = service.handle_event(&message(5, 0));
        assert!(outcome.achievements.is_empty());
    }

    #[test]
    fn test_cosmetics_unlocked_by_level() {
        let service = service(fixed_config(1_000));
        let key = MemberKey::new(1, 5);

        assert!(matches!(service.select_background(key, "sunset"), Err(BotError::CosmeticLocked(_))));
        // 1000 XP is level 7, past the level 5 cosmetic
        service.handle_event(&message(5, 0));
        service.select_background(key, "sunset").unwrap();
        service.set_accent_color(key, "#123abc").unwrap();

        let card = service.store().get(key).unwrap().card;
        assert_eq!((card.background.as_str(), card.accent_color.as_str()), ("sunset", "#123abc"));
    }

    #[test]
    fn test_set_xp_pays_skipped_level_rewards() {
        let service = service(GuildConfig::default());
        let key = MemberKey::new(1, 5);

        // 1000 XP jumps from level 1 to 7, past the level 2 and 5 rewards
        let outcome = service.set_xp(key, 1_000);
        let level_up = outcome.level_up.expect("should level up");
        assert_eq!((level_up.old_level, level_up.new_level), (1, 7));
        assert_eq!(level_up.rewards.len(), 3);

        let record = service.store().get(key).unwrap();
        assert_eq!(record.points, 50);
        assert!(record.roles.contains("Active"));
        assert!(record.card.unlocked.contains("sunset"));
        service.select_background(key, "sunset").unwrap();
    }

    #[test]
    fn test_set_xp_lowering_keeps_rewards() {
        let service = service(GuildConfig::default());
        let key = MemberKey::new(1, 5);
        service.set_xp(key, 1_000);

        let outcome = service.set_xp(key, 10);
        assert!(outcome.level_up.is_none());
        let record = service.store().get(key).unwrap();
        assert_eq!((record.level, record.points), (1, 50));

        // Climbing back does not pay the same levels twice
        let outcome = service.set_xp(key, 1_000);
        assert!(outcome.level_up.unwrap().rewards.is_empty());
        assert_eq!(service.store().get(key).unwrap().points, 50);
    }

    #[test]
    fn test_import_legacy_pays_rewards() {
        let service = service(GuildConfig::default());
        let json = r#"[
            {"guildId": "1", "userId": "10", "xp": 1000.0, "messageCount": 9.0},
            {"guildId": "1", "userId": "11", "xp": 0, "voiceTime": 120}
        ]"#;

        let outcomes = service.import_legacy(json).unwrap();
        assert_eq!(outcomes.len(), 2);

        let record = service.store().get(MemberKey::new(1, 10)).unwrap();
        assert_eq!((record.xp, record.level, record.message_count), (1_000, 7, 9));
        assert_eq!(record.points, 50);
        assert!(record.roles.contains("Active"));
        assert!(record.card.unlocked.contains("sunset"));
        assert_eq!(service.store().get(MemberKey::new(1, 11)).unwrap().voice_seconds, 120);
    }

    #[test]
    fn test_import_legacy_rejects_without_partial_writes() {
        let service = service(GuildConfig::default());
        let json = r#"[
            {"guildId": "1", "userId": "10", "xp": 150.0},
            {"guildId": "1", "userId": "11", "xp": -4.0}
        ]"#;
        assert!(matches!(service.import_legacy(json), Err(BotError::Store(_))));
        assert!(service.store().is_empty());
    }

    #[test]
    fn test_voice_leave_without_session_creates_nothing() {
        let service = service(GuildConfig::default());
        let key = MemberKey::new(1, 5);

        let leave = ActivityEvent::VoiceLeave { guild: 1, user: 5, at: 90 };
        let outcome = service.handle_event(&leave);
        assert_eq!((outcome.xp_awarded, outcome.xp_total), (0, 0));
        assert!(service.store().get(key).is_none());
        assert!(leaderboard(service.store(), 1, 10).is_empty());

        let tick = ActivityEvent::VoiceTick { guild: 1, user: 5, tick: 1, at: 60 };
        service.handle_event(&tick);
        assert!(service.store().is_empty());
    }
}
