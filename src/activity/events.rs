//! Activity events
//!
//! What the gateway side reports to the leveling service. Times are unix
//! seconds.

use serde::{Deserialize, Serialize};

use crate::store::{GuildId, MemberKey, UserId};

/// One unit of member activity
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ActivityEvent {
    /// A message was posted
    Message {
        guild: GuildId,
        user: UserId,
        at: u64,
        /// Length of the message content in chars
        length: usize,
    },
    /// Member joined (or switched to) a voice channel
    VoiceJoin {
        guild: GuildId,
        user: UserId,
        channel: u64,
        at: u64,
    },
    /// Member left voice
    VoiceLeave {
        guild: GuildId,
        user: UserId,
        at: u64,
    },
    /// Accrual tick for a member's voice session
    VoiceTick {
        guild: GuildId,
        user: UserId,
        tick: u64,
        at: u64,
    },
}

impl ActivityEvent {
    pub fn key(&self) -> MemberKey {
        match *self {
            ActivityEvent::Message { guild, user, .. }
            | ActivityEvent::VoiceJoin { guild, user, .. }
            | ActivityEvent::VoiceLeave { guild, user, .. }
            | ActivityEvent::VoiceTick { guild, user, .. } => MemberKey::new(guild, user),
        }
    }

    pub fn at(&self) -> u64 {
        match *self {
            ActivityEvent::Message { at, .. }
            | ActivityEvent::VoiceJoin { at, .. }
            | ActivityEvent::VoiceLeave { at, .. }
            | ActivityEvent::VoiceTick { at, .. } => at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tagged_json() {
        let event: ActivityEvent =
            serde_json::from_str(r#"{"type": "voice_join", "guild": 1, "user": 2, "channel": 3, "at": 40}"#).unwrap();
        assert_eq!(event, ActivityEvent::VoiceJoin { guild: 1, user: 2, channel: 3, at: 40 });
        assert_eq!(event.key(), MemberKey::new(1, 2));
        assert_eq!(event.at(), 40);
    }

    #[test]
    fn test_unknown_type_is_rejected() {
        let parsed = serde_json::from_str::<ActivityEvent>(r#"{"type": "reaction", "guild": 1, "user": 2}"#);
        assert!(parsed.is_err());
    }
}
