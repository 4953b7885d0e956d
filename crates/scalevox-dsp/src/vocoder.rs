//! Streaming phase-vocoder pitch shifter.
//!
//! ## Algorithm Overview
//!
//! 1. **Buffering**: samples enter an input FIFO one at a time; every `hop`
//!    samples a full frame of `window_size` samples is analysed
//! 2. **Analysis**: window the frame, forward FFT, estimate each bin's true
//!    frequency from the phase advance since the previous frame
//! 3. **Shift**: move bin `k` to bin `floor(k * shift)`, scaling its frequency
//!    by the same factor
//! 4. **Synthesis**: accumulate phase at the shifted frequencies, inverse FFT,
//!    window again and overlap-add
//!
//! Overlap-add is normalised by the exact sum of squared window coefficients
//! landing on each output position, so a shift of 1.0 reproduces the input
//! for any window and overlap. Output lags input by `window_size` samples.
//!
//! ## RT-Safety
//!
//! All buffers and FFT plans are allocated in [`PitchShiftVocoder::new`].
//! [`apply`](ShiftEffect::apply) performs no allocations.

use crate::window::{self, WindowKind};
use crate::Result;
use rustfft::{num_complex::Complex32, Fft, FftPlanner};
use scalevox_core::{EffectFactory, EffectParams, ShiftEffect, StereoSample};
use std::f32::consts::TAU;
use std::sync::Arc;

/// Overlap-add positions whose window energy is below this fraction of the
/// peak are normalised as if they had exactly this much.
const NORM_FLOOR: f32 = 1e-3;

/// Phase-vocoder pitch shifter for one mono-summed stereo stream.
pub struct PitchShiftVocoder {
    params: EffectParams,
    hop: usize,

    window: Vec<f32>,
    /// Reciprocal window energy per output position, `hop` entries.
    norm: Vec<f32>,

    fft: Arc<dyn Fft<f32>>,
    ifft: Arc<dyn Fft<f32>>,
    spectrum: Vec<Complex32>,
    scratch: Vec<Complex32>,

    // Streaming FIFOs
    in_fifo: Vec<f32>,
    out_fifo: Vec<f32>,
    accum: Vec<f32>,
    rover: usize,

    // Per-bin state, window_size / 2 + 1 entries each
    last_phase: Vec<f32>,
    sum_phase: Vec<f32>,
    syn_magnitude: Vec<f32>,
    syn_frequency: Vec<f32>,
}

impl PitchShiftVocoder {
    /// Build a vocoder for `params` using `window` for analysis and synthesis.
    pub fn new(params: EffectParams, window: &WindowKind) -> Result<Self> {
        if params.sample_rate == 0 {
            return Err(scalevox_core::Error::InvalidSampleRate(params.sample_rate).into());
        }
        params.stft().validate()?;
        let coefficients = window.coefficients(params.window_size)?;
        Ok(Self::build(params, coefficients))
    }

    /// Construct from already checked parameters.
    fn build(params: EffectParams, window: Vec<f32>) -> Self {
        let size = window.len();
        let hop = size.saturating_sub(params.overlap).max(1);
        let num_bins = size / 2 + 1;

        let mut planner = FftPlanner::<f32>::new();
        let fft = planner.plan_fft_forward(size);
        let ifft = planner.plan_fft_inverse(size);
        let scratch_len = fft
            .get_inplace_scratch_len()
            .max(ifft.get_inplace_scratch_len());

        Self {
            params,
            hop,
            norm: overlap_norm(&window, hop),
            window,
            fft,
            ifft,
            spectrum: vec![Complex32::new(0.0, 0.0); size],
            scratch: vec![Complex32::new(0.0, 0.0); scratch_len],
            in_fifo: vec![0.0; size],
            out_fifo: vec![0.0; hop],
            accum: vec![0.0; size],
            rover: size - hop,
            last_phase: vec![0.0; num_bins],
            sum_phase: vec![0.0; num_bins],
            syn_magnitude: vec![0.0; num_bins],
            syn_frequency: vec![0.0; num_bins],
        }
    }

    /// Samples between the starts of consecutive frames.
    pub fn hop(&self) -> usize {
        self.hop
    }

    /// Clear all streaming state, keeping the configuration.
    pub fn reset(&mut self) {
        self.in_fifo.fill(0.0);
        self.out_fifo.fill(0.0);
        self.accum.fill(0.0);
        self.last_phase.fill(0.0);
        self.sum_phase.fill(0.0);
        self.rover = self.window.len() - self.hop;
    }

    /// Push one sample, returning the sample `window_size` positions back.
    #[inline]
    fn tick(&mut self, input: f32) -> f32 {
        let latency = self.window.len() - self.hop;
        self.in_fifo[self.rover] = input;
        let output = self.out_fifo[self.rover - latency];

        self.rover += 1;
        if self.rover >= self.window.len() {
            self.rover = latency;
            self.process_frame();
        }
        output
    }

    fn process_frame(&mut self) {
        let size = self.window.len();
        let half = size / 2;
        let hop = self.hop;
        let shift = self.params.shift_factor;
        // Phase advance per hop of a sinusoid centred on bin 1
        let expected = TAU * hop as f32 / size as f32;

        // 1. Window and forward FFT
        for ((bin, &x), &w) in self
            .spectrum
            .iter_mut()
            .zip(&self.in_fifo)
            .zip(&self.window)
        {
            *bin = Complex32::new(x * w, 0.0);
        }
        self.fft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // 2-3. True frequency per bin, remapped by the shift factor
        self.syn_magnitude.fill(0.0);
        self.syn_frequency.fill(0.0);
        for k in 0..=half {
            let magnitude = self.spectrum[k].norm();
            let phase = self.spectrum[k].arg();

            let deviation = wrap_phase(phase - self.last_phase[k] - k as f32 * expected);
            self.last_phase[k] = phase;
            let true_bin = k as f32 + deviation / expected;

            let target = (k as f32 * shift) as usize;
            if target <= half {
                self.syn_magnitude[target] += magnitude;
                self.syn_frequency[target] = true_bin * shift;
            }
        }

        // 4. Phase accumulation, conjugate mirror, inverse FFT
        for k in 0..=half {
            self.sum_phase[k] = wrap_phase(self.sum_phase[k] + expected * self.syn_frequency[k]);
            self.spectrum[k] = Complex32::from_polar(self.syn_magnitude[k], self.sum_phase[k]);
        }
        for k in half + 1..size {
            self.spectrum[k] = self.spectrum[size - k].conj();
        }
        self.ifft
            .process_with_scratch(&mut self.spectrum, &mut self.scratch);

        // Windowed overlap-add; rustfft leaves the inverse unscaled
        let gain = 1.0 / size as f32;
        for ((acc, bin), &w) in self.accum.iter_mut().zip(&self.spectrum).zip(&self.window) {
            *acc += bin.re * w * gain;
        }

        // First hop of the accumulator is complete
        for ((out, &acc), &norm) in self.out_fifo.iter_mut().zip(&self.accum).zip(&self.norm) {
            *out = acc * norm;
        }

        self.accum.copy_within(hop.., 0);
        self.accum[size - hop..].fill(0.0);
        self.in_fifo.copy_within(hop.., 0);
    }
}

impl ShiftEffect for PitchShiftVocoder {
    fn params(&self) -> EffectParams {
        self.params
    }

    fn set_shift_factor(&mut self, factor: f32) {
        self.params.shift_factor = factor;
    }

    /// Mixes each stereo sample to mono, shifts, and writes the result to both
    /// channels.
    fn apply(&mut self, frame: &mut [StereoSample]) {
        for sample in frame.iter_mut() {
            *sample = StereoSample::mono(self.tick(sample.to_mono()));
        }
    }

    fn latency_samples(&self) -> usize {
        self.window.len()
    }
}

/// Wrap phase to [-PI, PI].
#[inline]
fn wrap_phase(phase: f32) -> f32 {
    phase - TAU * (phase / TAU).round()
}

/// Reciprocal of the squared-window sum seen by each of the `hop` positions
/// that leave the accumulator per frame.
fn overlap_norm(window: &[f32], hop: usize) -> Vec<f32> {
    let sums: Vec<f32> = (0..hop)
        .map(|j| window.iter().skip(j).step_by(hop).map(|w| w * w).sum())
        .collect();
    let peak = sums.iter().copied().fold(0.0f32, f32::max);
    let floor = (peak * NORM_FLOOR).max(f32::MIN_POSITIVE);
    sums.into_iter().map(|s| 1.0 / s.max(floor)).collect()
}

/// [`EffectFactory`] producing [`PitchShiftVocoder`]s with a fixed window kind.
#[derive(Debug, Clone, Default)]
pub struct VocoderFactory {
    window: WindowKind,
}

impl VocoderFactory {
    pub fn new(window: WindowKind) -> Self {
        Self { window }
    }

    pub fn window(&self) -> &WindowKind {
        &self.window
    }
}

impl EffectFactory for VocoderFactory {
    /// Falls back to a Hann window if the configured one does not fit the
    /// requested frame size or the parameters are rejected.
    fn create(&self, params: EffectParams) -> Box<dyn ShiftEffect> {
        match PitchShiftVocoder::new(params, &self.window) {
            Ok(vocoder) => Box::new(vocoder),
            Err(e) => {
                tracing::warn!("Cannot build vocoder for {:?}: {}; using hann window", params, e);
                let window = window::hann(params.window_size.max(2));
                Box::new(PitchShiftVocoder::build(params, window))
            }
        }
    }
}
