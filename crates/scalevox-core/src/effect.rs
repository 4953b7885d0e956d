//! Boundary to the frequency-domain pitch-shift effect.
//!
//! The registry never reaches into an effect's internals. Anything that
//! shapes internal buffers (window size, overlap, analysis window) is a
//! construction argument; changing it means building a new effect through an
//! [`EffectFactory`].

use crate::config::StftSettings;
use crate::sample::StereoSample;

/// Construction parameters of one effect instance.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EffectParams {
    pub sample_rate: u32,
    pub shift_factor: f32,
    pub window_size: usize,
    pub overlap: usize,
}

impl EffectParams {
    /// Neutral shift at `sample_rate` with the given STFT settings.
    pub fn neutral(sample_rate: u32, stft: StftSettings) -> Self {
        Self {
            sample_rate,
            shift_factor: 1.0,
            window_size: stft.window_size,
            overlap: stft.overlap,
        }
    }

    pub fn stft(&self) -> StftSettings {
        StftSettings {
            window_size: self.window_size,
            overlap: self.overlap,
        }
    }

    /// Same sample rate and shift, new STFT settings.
    pub fn with_stft(self, stft: StftSettings) -> Self {
        Self {
            window_size: stft.window_size,
            overlap: stft.overlap,
            ..self
        }
    }
}

/// A stateful pitch shifter bound to one audio stream.
pub trait ShiftEffect: Send {
    /// Current parameters, including the live shift factor.
    fn params(&self) -> EffectParams;

    fn set_shift_factor(&mut self, factor: f32);

    /// Shift `frame` in place.
    fn apply(&mut self, frame: &mut [StereoSample]);

    fn shift_factor(&self) -> f32 {
        self.params().shift_factor
    }

    /// Delay introduced by internal buffering, in samples.
    fn latency_samples(&self) -> usize {
        0
    }
}

/// Builds effects from parameters.
pub trait EffectFactory: Send + Sync {
    fn create(&self, params: EffectParams) -> Box<dyn ShiftEffect>;
}

impl<F> EffectFactory for F
where
    F: Fn(EffectParams) -> Box<dyn ShiftEffect> + Send + Sync,
{
    fn create(&self, params: EffectParams) -> Box<dyn ShiftEffect> {
        self(params)
    }
}
