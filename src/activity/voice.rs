//! Voice sessions
//!
//! Tracks who is in voice and hands out one award per accrual tick.

use std::collections::HashMap;
use std::time::Duration;

use crate::store::MemberKey;

/// Converts elapsed wall-clock time into whole accrual ticks
#[derive(Debug, Clone)]
pub struct VoiceTimer {
    interval: Duration,
    since_last_tick: Duration,
    ticks: u64,
}

impl VoiceTimer {
    /// Create a timer with the given tick interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            since_last_tick: Duration::ZERO,
            ticks: 0,
        }
    }

    /// Advance by `delta` and return how many ticks completed
    pub fn update(&mut self, delta: Duration) -> u64 {
        if self.interval.is_zero() {
            return 0;
        }

        self.since_last_tick = self.since_last_tick.saturating_add(delta);
        let elapsed = self.since_last_tick.as_nanos();
        let interval = self.interval.as_nanos();

        let rem = elapsed % interval;
        self.since_last_tick =
            Duration::new((rem / 1_000_000_000) as u64, (rem % 1_000_000_000) as u32);

        let completed = u64::try_from(elapsed / interval).unwrap_or(u64::MAX);
        self.ticks = self.ticks.saturating_add(completed);
        completed
    }

    /// Ticks completed since creation
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    /// Reset the timer
    pub fn reset(&mut self) {
        self.since_last_tick = Duration::ZERO;
        self.ticks = 0;
    }
}

/// An open voice session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VoiceSession {
    pub channel: u64,
    pub joined_at: u64,
    /// Highest tick already paid for this session
    pub last_awarded_tick: Option<u64>,
}

/// Open sessions plus the shared accrual timer
#[derive(Debug, Clone)]
pub struct VoiceTracker {
    sessions: HashMap<MemberKey, VoiceSession>,
    timer: VoiceTimer,
}

impl VoiceTracker {
    pub fn new(tick_interval: Duration) -> Self {
        Self {
            sessions: HashMap::new(),
            timer: VoiceTimer::new(tick_interval),
        }
    }

    /// Start a session, or move an existing one to another channel
    pub fn join(&mut self, key: MemberKey, channel: u64, at: u64) {
        match self.sessions.get_mut(&key) {
            Some(session) => {
                log::debug!("User {} moved to voice channel {}", key.user, channel);
                session.channel = channel;
            }
            None => {
                log::debug!("User {} joined voice channel {}", key.user, channel);
                self.sessions.insert(
                    key,
                    VoiceSession {
                        channel,
                        joined_at: at,
                        last_awarded_tick: None,
                    },
                );
            }
        }
    }

    /// End a session and return how long it lasted in seconds
    pub fn leave(&mut self, key: MemberKey, at: u64) -> Option<u64> {
        let session = self.sessions.remove(&key)?;
        Some(at.saturating_sub(session.joined_at))
    }

    /// Claim tick `tick` for a member. True only the first time a session
    /// sees a tick newer than any it was already paid for.
    pub fn claim_tick(&mut self, key: MemberKey, tick: u64) -> bool {
        let Some(session) = self.sessions.get_mut(&key) else {
            return false;
        };
        if session.last_awarded_tick.is_some_and(|last| tick <= last) {
            return false;
        }
        session.last_awarded_tick = Some(tick);
        true
    }

    /// Advance the shared timer. Every open session claims each completed
    /// tick; the returned pairs are the awards to pay.
    pub fn advance(&mut self, delta: Duration) -> Vec<(MemberKey, u64)> {
        let before = self.timer.ticks();
        self.timer.update(delta);
        let after = self.timer.ticks();
        if self.sessions.is_empty() {
            return Vec::new();
        }

        let mut keys: Vec<MemberKey> = self.sessions.keys().copied().collect();
        keys.sort_unstable();

        let mut awards = Vec::new();
        for tick in (before + 1)..=after {
            for &key in &keys {
                if self.claim_tick(key, tick) {
                    awards.push((key, tick));
                }
            }
        }
        awards
    }

    pub fn session(&self, key: MemberKey) -> Option<&VoiceSession> {
        self.sessions.get(&key)
    }

    pub fn active_sessions(&self) -> usize {
        self.sessions.len()
    }
}
