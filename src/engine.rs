//! ScaleShift that ties the patch, the orchestrator and the effects together

use crate::{hook, Result};
use scalevox_core::{AudioHost, EffectParams, ShiftConfig, ShiftOrchestrator, StereoSample};
use scalevox_patch::{install_patch, InjectionPoint, MemberRef, PatchHost};

/// Runtime for avatar-scale driven voice shifting.
///
/// One instance lives for the whole host session:
/// - [`install`](Self::install) patches the host's sample path once at load
/// - [`on_sample_rate`](Self::on_sample_rate) registers each input stream
/// - [`process`](Self::process) runs from the hook on every audio frame
/// - [`apply_config`](Self::apply_config) runs whenever the user edits settings
///
/// # Example
///
/// ```ignore
/// use scalevox::prelude::*;
///
/// let shifter = ScaleShift::builder(host).build()?;
/// shifter.install(&mut patch_host)?;
///
/// // audio thread
/// shifter.on_sample_rate(stream.clone(), 48000)?;
/// shifter.process(&stream, &mut frame);
/// ```
pub struct ScaleShift<H: AudioHost> {
    orchestrator: ShiftOrchestrator<H>,
    hook: MemberRef,
}

impl<H: AudioHost> ScaleShift<H> {
    pub fn builder(host: H) -> crate::ScaleShiftBuilder<H> {
        crate::ScaleShiftBuilder::new(host)
    }

    pub(crate) fn from_parts(orchestrator: ShiftOrchestrator<H>, hook: MemberRef) -> Self {
        Self { orchestrator, hook }
    }

    /// Patch the host's sample processing method to call the hook.
    ///
    /// If the expected code shape is not found the host is left unpatched
    /// and the error is returned; audio then flows through unshifted.
    pub fn install<P: PatchHost + ?Sized>(&self, patch_host: &mut P) -> Result<InjectionPoint> {
        let patch = hook::sample_processing_patch(self.hook.clone())?;
        Ok(install_patch(patch_host, hook::TARGET_METHOD, &patch)?)
    }

    /// Register `stream`, or rebuild its effect if its sample rate changed.
    pub fn on_sample_rate(&self, stream: H::Stream, sample_rate: u32) -> Result<EffectParams> {
        Ok(self.orchestrator.on_sample_rate(stream, sample_rate)?)
    }

    /// Shift `frame` in place if it is the local microphone.
    pub fn process(&self, stream: &H::Stream, frame: &mut [StereoSample]) -> bool {
        self.orchestrator.process(stream, frame)
    }

    /// Drop the effect of a stream that is gone.
    pub fn forget_stream(&self, stream: &H::Stream) -> bool {
        self.orchestrator.registry().remove(stream)
    }

    pub fn apply_config(&self, config: &ShiftConfig) -> Result<()> {
        Ok(self.orchestrator.apply_config(config)?)
    }

    pub fn config(&self) -> ShiftConfig {
        self.orchestrator.config()
    }

    pub fn set_enabled(&self, enabled: bool) {
        self.orchestrator.set_enabled(enabled);
    }

    pub fn hook(&self) -> &MemberRef {
        &self.hook
    }

    pub fn orchestrator(&self) -> &ShiftOrchestrator<H> {
        &self.orchestrator
    }

    pub fn host(&self) -> &H {
        self.orchestrator.host()
    }
}

impl<H: AudioHost> std::fmt::Debug for ScaleShift<H> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ScaleShift")
            .field("hook", &self.hook)
            .field("orchestrator", &self.orchestrator)
            .finish()
    }
}
