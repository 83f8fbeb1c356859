//! Experience and leveling
//!
//! The level curve shared by the bot and the dashboard. Both read the same two
//! constants from here, so a level computed on one side always matches the
//! other.

use serde::{Deserialize, Serialize};

use crate::error::LevelError;

/// Scale of the curve: XP needed to leave level 1
pub const BASE_XP_PER_LEVEL: f64 = 100.0;

/// Exponent of the curve
pub const XP_MULTIPLIER: f64 = 1.2;

/// Progress of a member through their current level band
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct LevelProgress {
    /// XP earned since the start of the band (negative for a stale level)
    pub current_xp: i64,
    /// Width of the band
    pub required_xp: u64,
    /// Whole percent through the band, 0..=99 for a consistent level
    pub percentage: i64,
}

/// A threshold curve `floor(base * level^multiplier)`
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LevelCurve {
    base: f64,
    multiplier: f64,
}

impl Default for LevelCurve {
    fn default() -> Self {
        Self::DEFAULT
    }
}

impl LevelCurve {
    /// The curve every process uses
    pub const DEFAULT: LevelCurve = LevelCurve {
        base: BASE_XP_PER_LEVEL,
        multiplier: XP_MULTIPLIER,
    };

    /// Build a custom curve. Both parameters must be finite and positive.
    pub fn new(base: f64, multiplier: f64) -> Result<Self, LevelError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if !valid(base) || !valid(multiplier) {
            return Err(LevelError::InvalidCurve { base, multiplier });
        }
        Ok(Self { base, multiplier })
    }

    pub fn base(&self) -> f64 {
        self.base
    }

    pub fn multiplier(&self) -> f64 {
        self.multiplier
    }

    /// Cumulative XP at which `level` ends and `level + 1` begins.
    ///
    /// Each threshold is floored on its own. Level 0 maps to 0.
    pub fn required_xp(&self, level: u64) -> u64 {
        // `as` saturates, so huge levels clamp to u64::MAX
        self.raw_threshold(level) as u64
    }

    fn raw_threshold(&self, level: u64) -> f64 {
        (self.base * (level as f64).powf(self.multiplier)).floor()
    }

    /// Threshold as an exact count, or `None` when no u64 total can reach it
    fn threshold(&self, level: u64) -> Option<u64> {
        // 2^64
        const LIMIT: f64 = 18_446_744_073_709_551_616.0;
        let raw = self.raw_threshold(level);
        if raw < LIMIT {
            Some(raw as u64)
        } else {
            None
        }
    }

    /// Level reached with `xp` cumulative experience.
    ///
    /// Equals one plus the number of thresholds `required_xp(1..)` that are
    /// `<= xp`. A closed-form guess lands next to the answer and a short scan
    /// settles it against the floored thresholds.
    pub fn level_for_xp(&self, xp: u64) -> u64 {
        // Largest k with base * k^m < xp + 1, give or take rounding
        let guess = ((xp as f64 + 1.0) / self.base).powf(1.0 / self.multiplier);
        let mut passed = if guess.is_finite() && guess >= 1.0 {
            (guess.ceil() as u64).saturating_sub(1)
        } else {
            0
        };
        passed = passed.min(u64::MAX - 1);

        while passed > 0 && self.threshold(passed).map_or(true, |t| t > xp) {
            passed -= 1;
        }
        while passed < u64::MAX - 1 {
            match self.threshold(passed + 1) {
                Some(t) if t <= xp => passed += 1,
                _ => break,
            }
        }

        passed + 1
    }

    /// Progress through the band of `level`.
    ///
    /// `level` is taken as given, even if it disagrees with `xp`; callers
    /// rendering a pending level-up rely on that.
    pub fn progress(&self, xp: u64, level: u64) -> Result<LevelProgress, LevelError> {
        if level == 0 {
            return Err(LevelError::InvalidInput("level must be at least 1".to_string()));
        }

        let floor_xp = if level == 1 { 0 } else { self.required_xp(level - 1) };
        let ceiling_xp = self.required_xp(level);

        let current_xp = i128::from(xp) - i128::from(floor_xp);
        let required_xp = ceiling_xp.saturating_sub(floor_xp);
        let percentage = if required_xp == 0 {
            0
        } else {
            (current_xp * 100).div_euclid(i128::from(required_xp))
        };

        Ok(LevelProgress {
            current_xp: saturate(current_xp),
            required_xp,
            percentage: saturate(percentage),
        })
    }
}

fn saturate(value: i128) -> i64 {
    i64::try_from(value).unwrap_or(if value < 0 { i64::MIN } else { i64::MAX })
}

fn checked_xp(xp: i64) -> Result<u64, LevelError> {
    u64::try_from(xp)
        .map_err(|_| LevelError::InvalidInput(format!("xp must not be negative, got {}", xp)))
}

fn checked_level(level: i64) -> Result<u64, LevelError> {
    match u64::try_from(level) {
        Ok(level) if level >= 1 => Ok(level),
        _ => Err(LevelError::InvalidInput(format!(
            "level must be at least 1, got {}",
            level
        ))),
    }
}

/// Level for a cumulative XP total
pub fn calculate_level(xp: i64) -> Result<u64, LevelError> {
    Ok(LevelCurve::DEFAULT.level_for_xp(checked_xp(xp)?))
}

/// XP threshold that completes `level`
pub fn calculate_required_xp(level: i64) -> Result<u64, LevelError> {
    Ok(LevelCurve::DEFAULT.required_xp(checked_level(level)?))
}

/// Progress through the band of `level`
pub fn calculate_level_progress(xp: i64, level: i64) -> Result<LevelProgress, LevelError> {
    LevelCurve::DEFAULT.progress(checked_xp(xp)?, checked_level(level)?)
}

/// Convert a floating-point XP value (legacy JSON rows) into an exact count
pub fn xp_from_f64(value: f64) -> Result<u64, LevelError> {
    // 2^64
    const LIMIT: f64 = 18_446_744_073_709_551_616.0;

    if !value.is_finite() {
        return Err(LevelError::InvalidInput(format!("xp must be finite, got {}", value)));
    }
    if value < 0.0 {
        return Err(LevelError::InvalidInput(format!("xp must not be negative, got {}", value)));
    }
    if value.fract() != 0.0 {
        return Err(LevelError::InvalidInput(format!("xp must be a whole number, got {}", value)));
    }
    if value >= LIMIT {
        return Err(LevelError::InvalidInput(format!("xp out of range: {}", value)));
    }
    Ok(value as u64)
}

/// Get a title/rank based on level
pub fn level_title(level: u64) -> &'static str {
    match level {
        0..=2 => "Newcomer",
        3..=4 => "Regular",
        5..=9 => "Member",
        10..=19 => "Veteran",
        20..=34 => "Elder",
        35..=49 => "Champion",
        50..=74 => "Legend",
        _ => "Mythic",
    }
}
