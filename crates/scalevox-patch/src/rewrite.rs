//! Splicing instruction fragments into a sequence.

use crate::error::{PatchError, Result};
use crate::instruction::Instruction;

/// Copy of `sequence` with `fragment` inserted right after `index`.
///
/// The input is only borrowed and the fragment is inserted exactly as given,
/// labels included. A fragment label that already exists in `sequence` is
/// rejected, since it would redirect existing branches into the fragment.
pub fn splice_after(
    sequence: &[Instruction],
    index: usize,
    fragment: &[Instruction],
) -> Result<Vec<Instruction>> {
    if fragment.is_empty() {
        return Err(PatchError::EmptyFragment);
    }
    if index >= sequence.len() {
        return Err(PatchError::SpliceOutOfBounds {
            index,
            len: sequence.len(),
        });
    }

    if let Some(label) = fragment
        .iter()
        .flat_map(|insn| insn.labels())
        .find(|l| sequence.iter().any(|insn| insn.has_label(**l)))
    {
        return Err(PatchError::LabelCollision { label: *label });
    }

    let (head, tail) = sequence.split_at(index + 1);
    let mut out = Vec::with_capacity(sequence.len() + fragment.len());
    out.extend_from_slice(head);
    out.extend_from_slice(fragment);
    out.extend_from_slice(tail);
    Ok(out)
}
