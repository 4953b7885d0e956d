//! Builder for configuring and constructing a `ScaleShift`.

use crate::{Result, ScaleShift};
use scalevox_core::{AudioHost, EffectFactory, ShiftConfig, ShiftOrchestrator};
use scalevox_dsp::{VocoderFactory, WindowKind};
use scalevox_patch::MemberRef;
use std::sync::Arc;

/// Default hook the stock patch calls into.
pub const DEFAULT_HOOK: (&str, &str) = ("ScaleVox", "Shift");

/// Effects default to [`PitchShiftVocoder`](scalevox_dsp::PitchShiftVocoder)
/// with a Hann window. Configuration defaults to [`ShiftConfig::default`].
///
/// # Example
///
/// ```ignore
/// use scalevox::prelude::*;
///
/// let shifter = ScaleShift::builder(host)
///     .config(config)
///     .window(WindowKind::Blackman)
///     .build()?;
///
/// shifter.install(&mut patch_host)?;
/// ```
pub struct ScaleShiftBuilder<H: AudioHost> {
    host: H,
    config: ShiftConfig,
    factory: Option<Arc<dyn EffectFactory>>,
    window: WindowKind,
    hook: MemberRef,
}

impl<H: AudioHost> ScaleShiftBuilder<H> {
    pub fn new(host: H) -> Self {
        Self {
            host,
            config: ShiftConfig::default(),
            factory: None,
            window: WindowKind::default(),
            hook: MemberRef::new(DEFAULT_HOOK.0, DEFAULT_HOOK.1),
        }
    }

    pub fn config(mut self, config: ShiftConfig) -> Self {
        self.config = config;
        self
    }

    /// Window for the default vocoder. Ignored when a custom factory is set.
    pub fn window(mut self, window: WindowKind) -> Self {
        self.window = window;
        self
    }

    /// Replace the default vocoder with another effect.
    pub fn effect_factory(mut self, factory: Arc<dyn EffectFactory>) -> Self {
        self.factory = Some(factory);
        self
    }

    /// Method the patched host calls for every frame.
    pub fn hook(mut self, hook: MemberRef) -> Self {
        self.hook = hook;
        self
    }

    pub fn build(self) -> Result<ScaleShift<H>> {
        self.config.validate()?;

        let factory = match self.factory {
            Some(factory) => factory,
            None => {
                // Reject a custom window that cannot fit the configured frame
                self.window.coefficients(self.config.window_size)?;
                Arc::new(VocoderFactory::new(self.window))
            }
        };

        let orchestrator = ShiftOrchestrator::new(&self.config, self.host, factory)?;

        tracing::info!(
            "Pitch shifter ready: enabled={}, range={}..{}, window={}, overlap={}",
            self.config.enabled,
            self.config.min_pitch_factor,
            self.config.max_pitch_factor,
            self.config.window_size,
            self.config.overlap
        );
        Ok(ScaleShift::from_parts(orchestrator, self.hook))
    }
}
