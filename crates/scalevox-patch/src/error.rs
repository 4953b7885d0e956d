//! Error types for scalevox-patch.

use crate::instruction::{Label, OpCode};
use thiserror::Error;

/// Why a branch following a matched window could not be resolved.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ResolveError {
    #[error("instruction index {index} out of bounds (sequence length {len})")]
    OutOfBounds { index: usize, len: usize },

    #[error("instruction {index} ({opcode:?}) is not a branch")]
    NotABranch { index: usize, opcode: OpCode },

    #[error("branch at {index} carries no label operand")]
    MissingLabel { index: usize },

    #[error("branch target {label} not found in sequence")]
    LabelNotFound { label: Label },
}

/// Error type for locating and applying instruction patches.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum PatchError {
    #[error("pattern must contain at least one instruction")]
    EmptyPattern,

    #[error("splice fragment must contain at least one instruction")]
    EmptyFragment,

    #[error("pattern not found in method body")]
    PatternNotFound,

    #[error("no injection point located: {0}")]
    Unresolved(#[from] ResolveError),

    #[error("splice position {index} out of bounds (sequence length {len})")]
    SpliceOutOfBounds { index: usize, len: usize },

    #[error("fragment label {label} already exists in the sequence")]
    LabelCollision { label: Label },

    #[error("method body for '{0}' not available")]
    MethodNotFound(String),
}

pub type Result<T> = std::result::Result<T, PatchError>;
