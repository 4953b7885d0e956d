//! Interleaved stereo sample as delivered by host audio callbacks.

/// One stereo sample pair.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[repr(C)]
pub struct StereoSample {
    pub left: f32,
    pub right: f32,
}

impl StereoSample {
    #[inline]
    pub const fn new(left: f32, right: f32) -> Self {
        Self { left, right }
    }

    /// Same value on both channels.
    #[inline]
    pub const fn mono(value: f32) -> Self {
        Self {
            left: value,
            right: value,
        }
    }

    #[inline]
    pub const fn silence() -> Self {
        Self::mono(0.0)
    }

    /// Average of both channels.
    #[inline]
    pub fn to_mono(self) -> f32 {
        (self.left + self.right) * 0.5
    }
}
