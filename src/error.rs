//! Error types
//!
//! One enum per subsystem, wrapped by [`BotError`] at the service boundary.

use thiserror::Error;

/// Errors from the level curve
#[derive(Error, Debug, Clone, PartialEq)]
pub enum LevelError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Invalid level curve: base {base}, multiplier {multiplier}")]
    InvalidCurve { base: f64, multiplier: f64 },
}

/// Member store persistence errors
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("Store version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },

    #[error("Invalid store data: {0}")]
    InvalidData(String),
}

/// Guild configuration errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("Serialize error: {0}")]
    Serialize(#[from] ron::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}

/// Top-level error returned by the leveling service
#[derive(Error, Debug)]
pub enum BotError {
    #[error(transparent)]
    Level(#[from] LevelError),

    #[error(transparent)]
    Store(#[from] StoreError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Cosmetic '{0}' is not unlocked")]
    CosmeticLocked(String),

    #[error("Invalid accent color '{0}', expected #rrggbb")]
    InvalidColor(String),
}

pub type Result<T, E = BotError> = std::result::Result<T, E>;
