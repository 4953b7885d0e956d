//! # ScaleVox - avatar-scale driven voice pitch shifting
//!
//! Shifts the local participant's microphone up or down in pitch according
//! to their avatar's scale: large avatars sound deeper, small ones higher.
//!
//! ## Architecture
//!
//! ScaleVox is an umbrella crate that coordinates:
//! - **scalevox-patch** - Load-time instruction patching (pattern match, branch resolve, splice)
//! - **scalevox-core** - Effect registry, live settings, per-frame shift orchestration
//! - **scalevox-dsp** - STFT phase-vocoder pitch shifter
//!
//! ## Quick Start
//!
//! ```ignore
//! use scalevox::prelude::*;
//!
//! let shifter = ScaleShift::builder(host)
//!     .config(ShiftConfig::default())
//!     .build()?;
//!
//! // Once, at load
//! shifter.install(&mut patch_host)?;
//!
//! // From the hook, per frame
//! shifter.on_sample_rate(stream.clone(), 48000)?;
//! shifter.process(&stream, &mut frame);
//! ```

/// Re-export of scalevox-core for direct access
pub use scalevox_core as core;

/// Re-export of scalevox-dsp for direct access
pub use scalevox_dsp as dsp;

/// Re-export of scalevox-patch for direct access
pub use scalevox_patch as patch;

pub use scalevox_core::{
    compute_shift_factor, AudioHost, EffectFactory, EffectParams, EffectRegistry, ShiftConfig,
    ShiftEffect, ShiftOrchestrator, StereoSample, StftSettings,
};
pub use scalevox_dsp::{PitchShiftVocoder, VocoderFactory, WindowKind};
pub use scalevox_patch::{
    install_patch, InjectionPatch, InjectionPoint, Instruction, Label, MemberRef, OpCode,
    Operand, PatchHost, Pattern,
};

mod error;
pub use error::{Error, Result};

pub mod hook;

mod builder;
mod engine;

pub use builder::{ScaleShiftBuilder, DEFAULT_HOOK};
pub use engine::ScaleShift;

/// Convenience prelude for common imports
pub mod prelude {
    pub use crate::{ScaleShift, ScaleShiftBuilder};

    pub use crate::core::{AudioHost, ShiftConfig, StereoSample};
    pub use crate::dsp::WindowKind;
    pub use crate::patch::{Instruction, MemberRef, OpCode, Operand, PatchHost};
}
