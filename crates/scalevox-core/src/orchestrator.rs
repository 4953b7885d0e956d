//! Per-frame shift decision.
//!
//! The orchestrator turns the local participant's avatar scale into a shift
//! factor and hands the frame to the registry. It holds no per-call state:
//! the enable switch and pitch range are atomics that configuration threads
//! update while audio threads read them, and the effects live in the registry.

use crate::config::{validate_pitch_range, ShiftConfig, StftSettings};
use crate::effect::{EffectFactory, EffectParams};
use crate::lockfree::{AtomicFlag, AtomicFloat, AtomicRange};
use crate::registry::EffectRegistry;
use crate::sample::StereoSample;
use crate::Result;
use std::fmt;
use std::hash::Hash;
use std::sync::Arc;

/// Read-only view of the host's audio and user state.
pub trait AudioHost: Send + Sync {
    /// Identity of an audio input stream.
    type Stream: Eq + Hash + Clone + Send + fmt::Debug;

    /// The input stream currently selected as the local microphone.
    fn default_input(&self) -> Option<Self::Stream>;

    /// Uniform scale of the local participant's avatar.
    fn local_user_scale(&self) -> Option<f32>;
}

/// Shift factor for an avatar scale, clamped to `[min, max]`.
///
/// A missing, non-finite or non-positive scale counts as 1.0.
pub fn compute_shift_factor(scale: Option<f32>, min: f32, max: f32) -> f32 {
    let scale = match scale {
        Some(s) if s.is_finite() && s > 0.0 => s,
        _ => 1.0,
    };
    (1.0 / scale).clamp(min, max)
}

/// Decides, frame by frame, whether and how far to shift the local voice.
pub struct ShiftOrchestrator<H: AudioHost> {
    host: H,
    registry: EffectRegistry<H::Stream>,
    enabled: AtomicFlag,
    pitch_range: AtomicRange,
    last_shift: AtomicFloat,
}

impl<H: AudioHost> ShiftOrchestrator<H> {
    pub fn new(config: &ShiftConfig, host: H, factory: Arc<dyn EffectFactory>) -> Result<Self> {
        config.validate()?;
        Ok(Self {
            host,
            registry: EffectRegistry::new(factory, config.stft())?,
            enabled: AtomicFlag::new(config.enabled),
            pitch_range: AtomicRange::new(config.min_pitch_factor, config.max_pitch_factor),
            last_shift: AtomicFloat::new(1.0),
        })
    }

    /// Register `stream` at `sample_rate`, or rebuild its effect if the rate
    /// changed.
    pub fn on_sample_rate(&self, stream: H::Stream, sample_rate: u32) -> Result<EffectParams> {
        self.registry.ensure(stream, sample_rate)
    }

    /// Shift `frame` in place if it belongs to the local microphone.
    ///
    /// Returns `true` if an effect ran over the frame.
    pub fn process(&self, stream: &H::Stream, frame: &mut [StereoSample]) -> bool {
        if !self.enabled.get() {
            return false;
        }
        match self.host.default_input() {
            Some(current) if current == *stream => {}
            _ => return false,
        }

        let (min, max) = self.pitch_range.get();
        let factor = compute_shift_factor(self.host.local_user_scale(), min, max);
        self.last_shift.set(factor);
        self.registry.process(stream, factor, frame)
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.enabled.set(enabled);
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled.get()
    }

    /// Publish a new pitch range. Rejected ranges leave the old one live.
    pub fn set_pitch_range(&self, min: f32, max: f32) -> Result<()> {
        validate_pitch_range(min, max)?;
        self.pitch_range.set(min, max);
        Ok(())
    }

    pub fn pitch_range(&self) -> (f32, f32) {
        self.pitch_range.get()
    }

    /// Change the STFT window size and rebuild every effect.
    pub fn set_window_size(&self, window_size: usize) -> Result<usize> {
        self.registry.reconfigure_with(|stft| StftSettings {
            window_size,
            ..stft
        })
    }

    /// Change the STFT overlap and rebuild every effect.
    pub fn set_overlap(&self, overlap: usize) -> Result<usize> {
        self.registry.reconfigure_with(|stft| StftSettings { overlap, ..stft })
    }

    /// Bring live settings in line with `config`.
    ///
    /// The whole config is validated first; nothing changes if any field is
    /// invalid. Effects are only rebuilt when window size or overlap differ.
    pub fn apply_config(&self, config: &ShiftConfig) -> Result<()> {
        config.validate()?;

        if self.enabled.get() != config.enabled {
            tracing::info!(
                "Pitch shifting {}",
                if config.enabled { "enabled" } else { "disabled" }
            );
            self.enabled.set(config.enabled);
        }

        let range = (config.min_pitch_factor, config.max_pitch_factor);
        if self.pitch_range.get() != range {
            tracing::info!("Pitch range set to {:.3}..{:.3}", range.0, range.1);
            self.pitch_range.set(range.0, range.1);
        }

        let stft = config.stft();
        if self.registry.stft() != stft {
            self.registry.reconfigure_with(|_| stft)?;
        }
        Ok(())
    }

    /// Current live settings as a config value.
    pub fn config(&self) -> ShiftConfig {
        let (min_pitch_factor, max_pitch_factor) = self.pitch_range.get();
        let stft = self.registry.stft();
        ShiftConfig {
            enabled: self.enabled.get(),
            min_pitch_factor,
            max_pitch_factor,
            window_size: stft.window_size,
            overlap: stft.overlap,
        }
    }

    /// Shift factor computed for the most recent local frame.
    pub fn last_shift_factor(&self) -> f32 {
        self.last_shift.get()
    }

    pub fn registry(&self) -> &EffectRegistry<H::Stream> {
        &self.registry
    }

    pub fn host(&self) -> &H {
        &self.host
    }
}

impl<H: AudioHost> fmt::Debug for ShiftOrchestrator<H> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ShiftOrchestrator")
            .field("enabled", &self.enabled.get())
            .field("pitch_range", &self.pitch_range.get())
            .field("registry", &self.registry)
            .finish()
    }
}
