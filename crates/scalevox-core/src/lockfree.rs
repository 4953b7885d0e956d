//! Lock-free live settings read on the audio thread.

use atomic_float::AtomicF32;
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};

/// Cache-line aligned atomic f32.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFloat {
    value: AtomicF32,
}

impl AtomicFloat {
    pub fn new(value: f32) -> Self {
        Self {
            value: AtomicF32::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> f32 {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: f32) {
        self.value.store(value, Ordering::Release);
    }
}

/// Cache-line aligned atomic bool.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicFlag {
    value: AtomicBool,
}

impl AtomicFlag {
    pub fn new(value: bool) -> Self {
        Self {
            value: AtomicBool::new(value),
        }
    }

    #[inline]
    pub fn get(&self) -> bool {
        self.value.load(Ordering::Acquire)
    }

    #[inline]
    pub fn set(&self, value: bool) {
        self.value.store(value, Ordering::Release);
    }
}

/// A `(min, max)` pair of f32 published as one 64-bit word.
///
/// Readers always see both bounds from the same `set`, so a range that was
/// valid when stored stays valid when loaded.
#[derive(Debug)]
#[repr(align(64))]
pub struct AtomicRange {
    bits: AtomicU64,
}

impl AtomicRange {
    pub fn new(min: f32, max: f32) -> Self {
        Self {
            bits: AtomicU64::new(Self::pack(min, max)),
        }
    }

    #[inline]
    fn pack(min: f32, max: f32) -> u64 {
        ((min.to_bits() as u64) << 32) | max.to_bits() as u64
    }

    #[inline]
    pub fn get(&self) -> (f32, f32) {
        let bits = self.bits.load(Ordering::Acquire);
        (
            f32::from_bits((bits >> 32) as u32),
            f32::from_bits(bits as u32),
        )
    }

    #[inline]
    pub fn set(&self, min: f32, max: f32) {
        self.bits.store(Self::pack(min, max), Ordering::Release);
    }
}
