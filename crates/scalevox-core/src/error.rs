//! Error types for scalevox-core.

use thiserror::Error;

/// Error type for scalevox-core operations.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Invalid pitch range: min={min}, max={max}. Must satisfy 0 < min <= max")]
    InvalidPitchRange { min: f32, max: f32 },

    #[error("Invalid STFT settings: window={window_size}, overlap={overlap}. Must satisfy window > overlap >= 0")]
    InvalidStft { window_size: usize, overlap: usize },

    #[error("Invalid sample rate: {0}")]
    InvalidSampleRate(u32),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
