//! Default pitch-shift effect for scalevox: a streaming STFT phase vocoder.
//!
//! ```ignore
//! use scalevox_dsp::{VocoderFactory, WindowKind};
//!
//! let factory = Arc::new(VocoderFactory::new(WindowKind::Blackman));
//! let orch = ShiftOrchestrator::new(&config, host, factory)?;
//! ```

mod error;
pub use error::{Error, Result};

pub mod window;
pub use window::WindowKind;

mod vocoder;
pub use vocoder::{PitchShiftVocoder, VocoderFactory};
