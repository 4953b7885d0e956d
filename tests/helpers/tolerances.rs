//! Tolerance constants for pitch-shift testing.
//!
//! Different operations require different precision levels.

/// STFT round trip at neutral shift (FFT rounding plus phase accumulation).
pub const VOCODER_EPSILON: f32 = 1e-3;

/// Silence threshold (~-80dB).
/// Values below this are considered silent.
pub const SILENCE_THRESHOLD: f32 = 1e-4;

/// Allowed error when reading the pitch of a shifted tone, in Hz.
pub const PITCH_TOLERANCE_HZ: f32 = 25.0;
