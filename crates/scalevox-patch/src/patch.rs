//! Locating an injection point and applying a fragment there.

use crate::branch::resolve_target;
use crate::error::{PatchError, ResolveError, Result};
use crate::instruction::{Instruction, Label};
use crate::pattern::Pattern;
use crate::rewrite::splice_after;

/// Where a patch lands in a particular method body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InjectionPoint {
    /// Start of the matched window.
    pub window: usize,
    /// The branch immediately after the window.
    pub branch: usize,
    /// The label the branch jumps to.
    pub label: Label,
    /// Instruction carrying `label`; the fragment goes right after it.
    pub target: usize,
}

/// A pattern to search for plus the fragment to insert after the branch
/// target that follows it.
#[derive(Debug, Clone)]
pub struct InjectionPatch {
    pattern: Pattern,
    fragment: Vec<Instruction>,
}

impl InjectionPatch {
    pub fn new(pattern: Pattern, fragment: Vec<Instruction>) -> Result<Self> {
        if fragment.is_empty() {
            return Err(PatchError::EmptyFragment);
        }
        Ok(Self { pattern, fragment })
    }

    pub fn pattern(&self) -> &Pattern {
        &self.pattern
    }

    pub fn fragment(&self) -> &[Instruction] {
        &self.fragment
    }

    /// Find the injection point in `sequence`.
    ///
    /// Matches whose follower is not a branch are skipped. The first match
    /// followed by a branch decides the outcome: if its target label is
    /// missing, locating fails rather than trying later matches.
    pub fn locate(&self, sequence: &[Instruction]) -> Result<InjectionPoint> {
        for window in self.pattern.matches(sequence) {
            let branch = window + self.pattern.len();
            let insn = &sequence[branch];
            if !insn.opcode().is_branch() {
                continue;
            }
            let label = insn
                .branch_target()
                .ok_or(ResolveError::MissingLabel { index: branch })?;
            let target = resolve_target(sequence, branch)?;
            return Ok(InjectionPoint {
                window,
                branch,
                label,
                target,
            });
        }
        Err(PatchError::PatternNotFound)
    }

    /// Locate and splice, producing a new sequence.
    pub fn apply(&self, sequence: &[Instruction]) -> Result<Vec<Instruction>> {
        let point = self.locate(sequence)?;
        splice_after(sequence, point.target, &self.fragment)
    }

    /// Like [`apply`](Self::apply), but hands back the untouched input when
    /// no injection point exists.
    pub fn transpile(&self, sequence: Vec<Instruction>) -> Vec<Instruction> {
        match self.locate(&sequence) {
            Ok(point) => {
                tracing::info!(
                    "Pattern matched at {}, injecting {} instructions after {}",
                    point.window,
                    self.fragment.len(),
                    point.target
                );
                match splice_after(&sequence, point.target, &self.fragment) {
                    Ok(patched) => patched,
                    Err(e) => {
                        tracing::warn!("Splice failed, leaving method untouched: {}", e);
                        sequence
                    }
                }
            }
            Err(e) => {
                tracing::warn!("Failed to find insertion point ({}), aborting", e);
                sequence
            }
        }
    }
}
