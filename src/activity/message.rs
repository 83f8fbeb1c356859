//! Message XP
//!
//! Random per-message awards with a per-member cooldown.

use rand::Rng;

use crate::data::GuildConfig;
use crate::store::MemberRecord;

/// Whether a message at `at` still falls inside the member's cooldown
pub fn on_cooldown(config: &GuildConfig, record: &MemberRecord, at: u64) -> bool {
    match record.last_message_at {
        // Out-of-order timestamps count as inside the window
        Some(last) => at < last || at - last < config.message.cooldown_secs,
        None => false,
    }
}

/// Count a message and roll its XP award.
///
/// The award is returned, not added; the caller folds it into the total so
/// the level recompute happens in the same update.
pub fn apply_message(
    config: &GuildConfig,
    record: &mut MemberRecord,
    at: u64,
    length: usize,
    rng: &mut impl Rng,
) -> u64 {
    record.message_count += 1;

    if length < config.message.min_length {
        log::debug!("Message too short ({} < {}), no XP", length, config.message.min_length);
        return 0;
    }
    if on_cooldown(config, record, at) {
        log::debug!("Message at {} inside cooldown, no XP", at);
        return 0;
    }

    let roll = rng.gen_range(config.message.min_xp..=config.message.max_xp);
    record.last_message_at = Some(at);
    config.scale_xp(roll)
}
