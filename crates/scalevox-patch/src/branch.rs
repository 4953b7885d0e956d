//! Branch-target resolution.
//!
//! The instruction right after a matched window is expected to be the jump of
//! an `if`. Its label marks where the taken and fall-through paths merge,
//! which is where code that must run on both paths belongs.

use crate::error::ResolveError;
use crate::instruction::{Instruction, Label};

/// Index of the first instruction carrying `label`.
pub fn find_label(sequence: &[Instruction], label: Label) -> Option<usize> {
    sequence.iter().position(|insn| insn.has_label(label))
}

/// Resolve the branch at `index` to the absolute index of its target.
pub fn resolve_target(sequence: &[Instruction], index: usize) -> Result<usize, ResolveError> {
    let insn = sequence.get(index).ok_or(ResolveError::OutOfBounds {
        index,
        len: sequence.len(),
    })?;

    if !insn.opcode().is_branch() {
        return Err(ResolveError::NotABranch {
            index,
            opcode: insn.opcode(),
        });
    }

    let label = insn
        .operand()
        .as_label()
        .ok_or(ResolveError::MissingLabel { index })?;

    find_label(sequence, label).ok_or(ResolveError::LabelNotFound { label })
}
