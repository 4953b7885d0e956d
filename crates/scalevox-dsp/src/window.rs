//! Analysis/synthesis window functions.
//!
//! All built-in windows are periodic (DFT-even), which is what overlap-add
//! wants: the last coefficient is not a repeat of the first.

use crate::{Error, Result};
use std::f32::consts::TAU;

/// Window applied to every STFT frame before analysis and after synthesis.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum WindowKind {
    #[default]
    Hann,
    Hamming,
    Blackman,
    /// Caller-supplied coefficients. Length must equal the window size.
    Custom(Vec<f32>),
}

impl WindowKind {
    /// Coefficients for a frame of `size` samples.
    pub fn coefficients(&self, size: usize) -> Result<Vec<f32>> {
        match self {
            Self::Hann => Ok(hann(size)),
            Self::Hamming => Ok(cosine_sum(size, 0.54, 0.46, 0.0)),
            Self::Blackman => Ok(cosine_sum(size, 0.42, 0.5, 0.08)),
            Self::Custom(coeffs) if coeffs.len() == size => Ok(coeffs.clone()),
            Self::Custom(coeffs) => Err(Error::WindowLength {
                expected: size,
                actual: coeffs.len(),
            }),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Hann => "hann",
            Self::Hamming => "hamming",
            Self::Blackman => "blackman",
            Self::Custom(_) => "custom",
        }
    }
}

pub(crate) fn hann(size: usize) -> Vec<f32> {
    cosine_sum(size, 0.5, 0.5, 0.0)
}

/// Generalised cosine window `a0 - a1 cos(x) + a2 cos(2x)`.
fn cosine_sum(size: usize, a0: f32, a1: f32, a2: f32) -> Vec<f32> {
    (0..size)
        .map(|i| {
            let x = TAU * i as f32 / size as f32;
            a0 - a1 * x.cos() + a2 * (2.0 * x).cos()
        })
        .collect()
}
