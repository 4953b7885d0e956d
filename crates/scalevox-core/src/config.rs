//! Pitch-shift configuration.

use crate::{Error, Result};
use serde::{Deserialize, Serialize};

/// STFT frame size and overlap shared by every effect in a registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StftSettings {
    /// Samples per analysis frame.
    pub window_size: usize,
    /// Samples shared by consecutive frames.
    pub overlap: usize,
}

impl StftSettings {
    pub const DEFAULT_WINDOW_SIZE: usize = 4096;
    pub const DEFAULT_OVERLAP: usize = 3072;

    /// Validated constructor.
    pub fn new(window_size: usize, overlap: usize) -> Result<Self> {
        let settings = Self {
            window_size,
            overlap,
        };
        settings.validate()?;
        Ok(settings)
    }

    pub fn validate(&self) -> Result<()> {
        if self.window_size < 2 || self.overlap >= self.window_size {
            return Err(Error::InvalidStft {
                window_size: self.window_size,
                overlap: self.overlap,
            });
        }
        Ok(())
    }

    /// Samples between the starts of consecutive frames.
    #[inline]
    pub fn hop(&self) -> usize {
        self.window_size - self.overlap
    }
}

impl Default for StftSettings {
    fn default() -> Self {
        Self {
            window_size: Self::DEFAULT_WINDOW_SIZE,
            overlap: Self::DEFAULT_OVERLAP,
        }
    }
}

/// Everything the pitch shifter reads from user configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShiftConfig {
    /// Master switch; when off every frame passes through untouched.
    pub enabled: bool,
    /// Lowest shift factor (deepest voice).
    pub min_pitch_factor: f32,
    /// Highest shift factor (highest voice).
    pub max_pitch_factor: f32,
    pub window_size: usize,
    pub overlap: usize,
}

impl Default for ShiftConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            min_pitch_factor: 0.85,
            max_pitch_factor: 1.25,
            window_size: StftSettings::DEFAULT_WINDOW_SIZE,
            overlap: StftSettings::DEFAULT_OVERLAP,
        }
    }
}

impl ShiftConfig {
    pub fn validate(&self) -> Result<()> {
        validate_pitch_range(self.min_pitch_factor, self.max_pitch_factor)?;
        self.stft().validate()
    }

    pub fn stft(&self) -> StftSettings {
        StftSettings {
            window_size: self.window_size,
            overlap: self.overlap,
        }
    }
}

pub(crate) fn validate_pitch_range(min: f32, max: f32) -> Result<()> {
    if !min.is_finite() || !max.is_finite() || min <= 0.0 || min > max {
        return Err(Error::InvalidPitchRange { min, max });
    }
    Ok(())
}
