//! Centralized error type for the scalevox umbrella crate.
//!
//! Wraps all subsystem errors so `?` propagates naturally across crate boundaries.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum Error {
    #[error(transparent)]
    Core(#[from] scalevox_core::Error),

    #[error("DSP: {0}")]
    Dsp(#[from] scalevox_dsp::Error),

    #[error("Patch: {0}")]
    Patch(#[from] scalevox_patch::PatchError),
}

pub type Result<T> = std::result::Result<T, Error>;
