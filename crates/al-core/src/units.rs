//! Millibel and linear gain conversions
//!
//! EAX expresses every level in millibels (1/100 dB). A level at or below
//! -100 dB is treated as silence.

use serde::{Deserialize, Serialize};

/// Level treated as silence, in millibels
pub const MIN_LEVEL_MB: f32 = -10_000.0;

/// Convert a millibel level to linear gain (`10^(mB/2000)`).
#[inline]
pub fn level_mb_to_gain(mb: f32) -> f32 {
    if mb <= MIN_LEVEL_MB {
        0.0
    } else {
        10.0_f32.powf(mb / 2_000.0)
    }
}

/// Convert linear gain to a millibel level. Non-positive gains map to silence.
#[inline]
pub fn gain_to_level_mb(gain: f32) -> f32 {
    if gain <= 0.0 {
        MIN_LEVEL_MB
    } else {
        (gain.log10() * 2_000.0).max(MIN_LEVEL_MB)
    }
}

/// Clamp that never panics, even with inverted bounds (`max` wins).
#[inline]
pub fn clamp_f32(value: f32, min: f32, max: f32) -> f32 {
    value.max(min).min(max)
}

/// Millibel value wrapper
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct Millibels(pub f32);

impl Millibels {
    pub const ZERO: Self = Self(0.0);
    pub const SILENCE: Self = Self(MIN_LEVEL_MB);

    #[inline]
    pub fn from_gain(gain: f32) -> Self {
        Self(gain_to_level_mb(gain))
    }

    #[inline]
    pub fn to_gain(self) -> f32 {
        level_mb_to_gain(self.0)
    }

    /// Same level in decibels
    #[inline]
    pub fn to_db(self) -> f32 {
        self.0 / 100.0
    }
}

impl Default for Millibels {
    fn default() -> Self {
        Self::ZERO
    }
}

impl From<i32> for Millibels {
    fn from(value: i32) -> Self {
        Self(value as f32)
    }
}
