//! Activity ingestion
//!
//! Turns messages and voice time into XP awards.

pub mod events;
pub mod message;
pub mod voice;

pub use events::ActivityEvent;
pub use message::{apply_message, on_cooldown};
pub use voice::{VoiceSession, VoiceTimer, VoiceTracker};
