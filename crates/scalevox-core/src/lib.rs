//! Per-stream pitch shifting driven by avatar scale.
//!
//! # Primary API
//!
//! - [`ShiftOrchestrator`]: per-frame entry point, owns the live settings
//! - [`EffectRegistry`]: stream to effect map with atomic bulk reconfiguration
//! - [`ShiftEffect`] / [`EffectFactory`]: boundary to the DSP effect
//! - [`AudioHost`]: what the orchestrator needs to know about the host
//! - [`ShiftConfig`]: user configuration
//!
//! # Example
//!
//! ```ignore
//! use scalevox_core::{ShiftConfig, ShiftOrchestrator};
//!
//! let orch = ShiftOrchestrator::new(&ShiftConfig::default(), host, factory)?;
//! orch.on_sample_rate(stream.clone(), 48000)?;
//! orch.process(&stream, &mut frame);
//! ```

pub mod error;
pub use error::{Error, Result};

pub mod config;
pub use config::{ShiftConfig, StftSettings};

pub(crate) mod lockfree;
pub use lockfree::{AtomicFlag, AtomicFloat, AtomicRange};

mod sample;
pub use sample::StereoSample;

pub mod effect;
pub use effect::{EffectFactory, EffectParams, ShiftEffect};

pub mod registry;
pub use registry::EffectRegistry;

mod orchestrator;
pub use orchestrator::{compute_shift_factor, AudioHost, ShiftOrchestrator};
