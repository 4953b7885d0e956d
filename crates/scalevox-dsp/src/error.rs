//! Error types for scalevox-dsp.

use thiserror::Error;

/// Error type for effect construction.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error("Window has {actual} coefficients, frame needs {expected}")]
    WindowLength { expected: usize, actual: usize },

    #[error(transparent)]
    Core(#[from] scalevox_core::Error),
}

/// Result type alias.
pub type Result<T> = core::result::Result<T, Error>;
