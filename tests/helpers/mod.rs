//! Test helpers and fixtures for ScaleVox integration tests
//!
//! Provides in-memory stand-ins for both host contracts (audio state and
//! method patching) plus signal generators.
//!
//! ## Tolerance Levels
//!
//! Use the appropriate tolerance from [`tolerances`] module:
//! - `VOCODER_EPSILON` (1e-3): Neutral-shift STFT round trip
//! - `SILENCE_THRESHOLD` (1e-4): Silence detection (-80dB)

#![allow(dead_code)]

pub mod tolerances;

use scalevox::prelude::*;
use scalevox::Label;
use std::collections::HashMap;
use std::sync::Mutex;

/// Default test sample rate (matches common hardware)
pub const TEST_SAMPLE_RATE: u32 = 48000;

/// Frame size the host delivers per callback.
pub const TEST_FRAME_SIZE: usize = 480;

/// Stream id of the local microphone in [`FakeAudioHost`].
pub const MIC: u32 = 1;

/// Stream id of some other input.
pub const OTHER: u32 = 2;

/// Install a test subscriber so library logs show up in failing tests.
pub fn init_tracing() {
    let _ = tracing_subscriber::fmt().with_test_writer().try_init();
}

/// Audio host whose default input and avatar scale tests can change.
pub struct FakeAudioHost {
    input: Mutex<Option<u32>>,
    scale: Mutex<Option<f32>>,
}

impl FakeAudioHost {
    pub fn new(input: Option<u32>, scale: Option<f32>) -> Self {
        Self {
            input: Mutex::new(input),
            scale: Mutex::new(scale),
        }
    }

    /// Microphone is [`MIC`], avatar at `scale`.
    pub fn with_scale(scale: f32) -> Self {
        Self::new(Some(MIC), Some(scale))
    }

    pub fn set_scale(&self, scale: Option<f32>) {
        *self.scale.lock().unwrap() = scale;
    }

    pub fn set_input(&self, input: Option<u32>) {
        *self.input.lock().unwrap() = input;
    }
}

impl AudioHost for FakeAudioHost {
    type Stream = u32;

    fn default_input(&self) -> Option<u32> {
        *self.input.lock().unwrap()
    }

    fn local_user_scale(&self) -> Option<f32> {
        *self.scale.lock().unwrap()
    }
}

/// Patch host backed by a map of method bodies.
#[derive(Default)]
pub struct MapPatchHost {
    pub bodies: HashMap<String, Vec<Instruction>>,
    pub installs: usize,
}

impl MapPatchHost {
    pub fn with_method(target: &str, body: Vec<Instruction>) -> Self {
        let mut host = Self::default();
        host.bodies.insert(target.to_string(), body);
        host
    }
}

impl PatchHost for MapPatchHost {
    fn method_body(&self, target: &str) -> Option<Vec<Instruction>> {
        self.bodies.get(target).cloned()
    }

    fn install(&mut self, target: &str, body: Vec<Instruction>) {
        self.installs += 1;
        self.bodies.insert(target.to_string(), body);
    }
}

/// A body shaped like the host's sample processing method: the
/// noise-suppression check, its branch, the suppression call, and the merge.
pub fn sample_processing_body() -> Vec<Instruction> {
    let merge = Label::new(0);
    vec![
        Instruction::new(OpCode::LdArg0),
        Instruction::with_operand(OpCode::Call, Operand::method("AudioInput", "get_AudioSystem")),
        Instruction::with_operand(
            OpCode::CallVirt,
            Operand::method("AudioSystem", "get_NoiseSupression"),
        ),
        Instruction::with_operand(
            OpCode::Call,
            Operand::method("LocalModeVariableProxy<bool>", "op_Implicit"),
        ),
        Instruction::branch(OpCode::BrFalseS, merge),
        Instruction::new(OpCode::LdArg0),
        Instruction::new(OpCode::LdArgAS),
        Instruction::with_operand(OpCode::Call, Operand::method("RNNoise", "Process")),
        Instruction::new(OpCode::LdArg0).labeled(merge),
        Instruction::with_operand(OpCode::Call, Operand::method("AudioInput", "Forward")),
        Instruction::new(OpCode::Ret),
    ]
}

/// Generate a test signal: sine wave at given frequency for specified samples.
pub fn generate_sine(frequency: f32, sample_rate: u32, num_samples: usize) -> Vec<f32> {
    (0..num_samples)
        .map(|i| {
            let t = i as f64 / sample_rate as f64;
            (0.5 * (2.0 * std::f64::consts::PI * frequency as f64 * t).sin()) as f32
        })
        .collect()
}

/// Generate silence (zero samples).
pub fn generate_silence(num_samples: usize) -> Vec<f32> {
    vec![0.0; num_samples]
}

/// Duplicate a mono signal onto both channels.
pub fn to_stereo(samples: &[f32]) -> Vec<StereoSample> {
    samples.iter().map(|&s| StereoSample::mono(s)).collect()
}

/// Left channel of a stereo signal.
pub fn left(frames: &[StereoSample]) -> Vec<f32> {
    frames.iter().map(|s| s.left).collect()
}

/// Calculate RMS of a signal.
pub fn rms(samples: &[f32]) -> f32 {
    if samples.is_empty() {
        return 0.0;
    }
    let sum_sq: f32 = samples.iter().map(|s| s * s).sum();
    (sum_sq / samples.len() as f32).sqrt()
}

/// Calculate peak amplitude of a signal.
pub fn peak(samples: &[f32]) -> f32 {
    samples
        .iter()
        .map(|s| s.abs())
        .fold(0.0_f32, |a, b| a.max(b))
}

/// Average frequency from positive-going zero crossings.
pub fn zero_crossing_frequency(samples: &[f32], sample_rate: u32) -> f32 {
    let crossings = samples
        .windows(2)
        .filter(|w| w[0] < 0.0 && w[1] >= 0.0)
        .count();
    crossings as f32 * sample_rate as f32 / samples.len() as f32
}

/// Assert that a signal is approximately silent (all values near zero).
pub fn assert_silence(samples: &[f32], tolerance: f32) {
    let max = peak(samples);
    assert!(
        max <= tolerance,
        "Expected silence, but peak amplitude was {}",
        max
    );
}

/// Assert that a signal has content (not silent).
pub fn assert_has_audio(samples: &[f32], min_rms: f32) {
    let r = rms(samples);
    assert!(
        r >= min_rms,
        "Expected audio content with RMS >= {}, but RMS was {}",
        min_rms,
        r
    );
}

/// Feed `signal` to `shifter` as stream `stream` in host-sized frames.
pub fn run_frames<H>(shifter: &ScaleShift<H>, stream: u32, signal: &[f32]) -> Vec<StereoSample>
where
    H: AudioHost<Stream = u32>,
{
    let mut out = Vec::with_capacity(signal.len());
    for chunk in signal.chunks(TEST_FRAME_SIZE) {
        let mut frame = to_stereo(chunk);
        shifter.process(&stream, &mut frame);
        out.extend_from_slice(&frame);
    }
    out
}
