//! Structural pattern matching over instruction sequences.
//!
//! A [`Pattern`] is a fixed list of `(opcode, operand)` steps. A window of a
//! sequence matches when every instruction in it has the same opcode and
//! operand as the corresponding step; labels are not compared.
//!
//! Every reported window is followed by at least one more instruction, since
//! callers inspect that follower (usually the branch of an `if`). A match
//! that ends the sequence is never reported.

use crate::error::{PatchError, Result};
use crate::instruction::{Instruction, OpCode, Operand};

/// One step of a pattern.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PatternStep {
    pub opcode: OpCode,
    pub operand: Operand,
}

impl PatternStep {
    pub fn new(opcode: OpCode, operand: Operand) -> Self {
        Self { opcode, operand }
    }

    #[inline]
    fn matches(&self, insn: &Instruction) -> bool {
        insn.matches(self.opcode, &self.operand)
    }
}

impl From<OpCode> for PatternStep {
    fn from(opcode: OpCode) -> Self {
        Self::new(opcode, Operand::None)
    }
}

impl From<(OpCode, Operand)> for PatternStep {
    fn from((opcode, operand): (OpCode, Operand)) -> Self {
        Self::new(opcode, operand)
    }
}

impl From<&Instruction> for PatternStep {
    fn from(insn: &Instruction) -> Self {
        Self::new(insn.opcode(), insn.operand().clone())
    }
}

/// Non-empty, immutable list of steps.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Pattern {
    steps: Vec<PatternStep>,
}

impl Pattern {
    pub fn new<I, S>(steps: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<PatternStep>,
    {
        let steps: Vec<PatternStep> = steps.into_iter().map(Into::into).collect();
        if steps.is_empty() {
            return Err(PatchError::EmptyPattern);
        }
        Ok(Self { steps })
    }

    /// Pattern built from the opcodes and operands of existing instructions.
    pub fn from_instructions(insns: &[Instruction]) -> Result<Self> {
        Self::new(insns.iter().map(PatternStep::from))
    }

    pub fn steps(&self) -> &[PatternStep] {
        &self.steps
    }

    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize {
        self.steps.len()
    }

    /// Does the window starting at `start` match? Out-of-range windows never match.
    pub fn matches_at(&self, sequence: &[Instruction], start: usize) -> bool {
        let window = start
            .checked_add(self.steps.len())
            .and_then(|end| sequence.get(start..end));
        match window {
            Some(window) => window.iter().zip(&self.steps).all(|(i, s)| s.matches(i)),
            None => false,
        }
    }

    /// Iterate over every matching window start, left to right.
    pub fn matches<'a>(&'a self, sequence: &'a [Instruction]) -> Matches<'a> {
        Matches {
            pattern: self,
            sequence,
            next: 0,
        }
    }
}

/// Iterator over window starts produced by [`Pattern::matches`].
pub struct Matches<'a> {
    pattern: &'a Pattern,
    sequence: &'a [Instruction],
    next: usize,
}

impl Iterator for Matches<'_> {
    type Item = usize;

    fn next(&mut self) -> Option<usize> {
        let m = self.pattern.len();
        // A window must leave room for one following instruction.
        while self.next + m < self.sequence.len() {
            let start = self.next;
            self.next += 1;
            if self.pattern.matches_at(self.sequence, start) {
                return Some(start);
            }
        }
        self.next = self.sequence.len();
        None
    }
}

/// Index of the first window matching `pattern` that is followed by at least
/// one instruction.
pub fn find_window(sequence: &[Instruction], pattern: &Pattern) -> Option<usize> {
    if pattern.len() > sequence.len() {
        return None;
    }
    pattern.matches(sequence).next()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::Label;

    fn call(name: &str) -> Instruction {
        Instruction::with_operand(OpCode::Call, Operand::method("T", name))
    }

    #[test]
    fn test_empty_pattern_rejected() {
        let steps: Vec<PatternStep> = Vec::new();
        assert_eq!(Pattern::new(steps), Err(PatchError::EmptyPattern));
    }

    #[test]
    fn test_find_first_window() {
        let seq = vec![
            Instruction::new(OpCode::Nop),
            Instruction::new(OpCode::LdArg0),
            call("a"),
            Instruction::new(OpCode::LdArg0),
            call("a"),
            Instruction::new(OpCode::Ret),
        ];
        let pattern = Pattern::from_instructions(&seq[1..3]).unwrap();

        assert_eq!(find_window(&seq, &pattern), Some(1));
        assert_eq!(pattern.matches(&seq).collect::<Vec<_>>(), vec![1, 3]);
    }

    #[test]
    fn test_operand_mismatch() {
        let seq = vec![Instruction::new(OpCode::LdArg0), call("a"), call("b")];
        let pattern = Pattern::new([
            PatternStep::from(OpCode::LdArg0),
            PatternStep::new(OpCode::Call, Operand::method("T", "b")),
        ])
        .unwrap();

        assert_eq!(find_window(&seq, &pattern), None);
    }

    #[test]
    fn test_labels_do_not_affect_match() {
        let seq = vec![
            Instruction::new(OpCode::LdArg0).labeled(Label::new(9)),
            call("a"),
            Instruction::new(OpCode::Ret),
        ];
        let pattern = Pattern::new([
            PatternStep::from(OpCode::LdArg0),
            PatternStep::new(OpCode::Call, Operand::method("T", "a")),
        ])
        .unwrap();

        assert_eq!(find_window(&seq, &pattern), Some(0));
    }

    #[test]
    fn test_match_at_end_is_skipped() {
        // Only occurrence sits at the very end with nothing after it.
        let seq = vec![Instruction::new(OpCode::Nop), call("a"), call("b")];
        let pattern = Pattern::from_instructions(&seq[1..]).unwrap();

        assert!(pattern.matches_at(&seq, 1));
        assert_eq!(find_window(&seq, &pattern), None);
    }

    #[test]
    fn test_single_step_match_at_end() {
        let seq = vec![call("a"), Instruction::new(OpCode::Nop), call("a")];
        let pattern = Pattern::new([PatternStep::new(OpCode::Call, Operand::method("T", "a"))])
            .unwrap();

        assert_eq!(pattern.matches(&seq).collect::<Vec<_>>(), vec![0]);
    }

    #[test]
    fn test_pattern_longer_than_sequence() {
        let seq = vec![Instruction::new(OpCode::Nop)];
        let pattern = Pattern::new([OpCode::Nop, OpCode::Nop]).unwrap();
        assert_eq!(find_window(&seq, &pattern), None);

        let empty: Vec<Instruction> = Vec::new();
        assert_eq!(find_window(&empty, &pattern), None);
    }

    #[test]
    fn test_pattern_same_length_as_sequence() {
        let seq = vec![Instruction::new(OpCode::Nop), Instruction::new(OpCode::Ret)];
        let pattern = Pattern::new([OpCode::Nop, OpCode::Ret]).unwrap();
        // Matches, but has no follower.
        assert_eq!(find_window(&seq, &pattern), None);
    }

    #[test]
    fn test_matches_at_out_of_range() {
        let seq = vec![Instruction::new(OpCode::Nop)];
        let pattern = Pattern::new([OpCode::Nop]).unwrap();
        assert!(pattern.matches_at(&seq, 0));
        assert!(!pattern.matches_at(&seq, 1));
        assert!(!pattern.matches_at(&seq, usize::MAX));
    }

    mod properties {
        use super::*;
        use crate::instruction::strategy::instruction;
        use proptest::collection::vec;
        use proptest::prelude::*;

        fn insn(opcode: OpCode, n: i64) -> Instruction {
            Instruction::with_operand(opcode, Operand::Int(n))
        }

        /// Two opcodes and two operands, so random windows match often.
        fn tiny() -> impl Strategy<Value = Instruction> {
            (prop_oneof![Just(OpCode::Nop), Just(OpCode::Dup)], 0i64..2)
                .prop_map(|(op, n)| insn(op, n))
        }

        /// Never matches the first step of a pattern built from [`body`].
        fn filler() -> impl Strategy<Value = Instruction> {
            (prop_oneof![Just(OpCode::Nop), Just(OpCode::Pop)], 0i64..3)
                .prop_map(|(op, n)| insn(op, n))
        }

        fn body() -> impl Strategy<Value = Instruction> {
            (
                prop_oneof![Just(OpCode::LdArg0), Just(OpCode::Dup), Just(OpCode::Call)],
                0i64..3,
            )
                .prop_map(|(op, n)| insn(op, n))
        }

        fn first_followed_match(seq: &[Instruction], steps: &[Instruction]) -> Option<usize> {
            let m = steps.len();
            (0..seq.len()).find(|&j| {
                j + m < seq.len()
                    && seq[j..j + m]
                        .iter()
                        .zip(steps)
                        .all(|(a, b)| a.matches(b.opcode(), b.operand()))
            })
        }

        proptest! {
            #[test]
            fn prop_planted_window_is_found(
                prefix in vec(filler(), 0..12),
                window in vec(body(), 1..4),
                rest in vec(instruction(), 1..8),
            ) {
                let pattern = Pattern::from_instructions(&window).unwrap();
                let k = prefix.len();
                let seq: Vec<_> = prefix.into_iter().chain(window).chain(rest).collect();

                prop_assert_eq!(find_window(&seq, &pattern), Some(k));
            }

            #[test]
            fn prop_find_window_is_first_followed_match(
                seq in vec(tiny(), 0..16),
                steps in vec(tiny(), 1..3),
            ) {
                let pattern = Pattern::from_instructions(&steps).unwrap();
                prop_assert_eq!(find_window(&seq, &pattern), first_followed_match(&seq, &steps));
            }

            #[test]
            fn prop_labels_never_change_the_match(
                seq in vec(tiny(), 0..16),
                steps in vec(tiny(), 1..3),
                ids in vec(proptest::option::of(0u32..8), 16),
            ) {
                let pattern = Pattern::from_instructions(&steps).unwrap();
                let labeled: Vec<_> = seq
                    .iter()
                    .cloned()
                    .zip(&ids)
                    .map(|(insn, id)| match id {
                        Some(id) => insn.labeled(Label::new(*id)),
                        None => insn,
                    })
                    .collect();

                prop_assert_eq!(find_window(&labeled, &pattern), find_window(&seq, &pattern));
            }

            #[test]
            fn prop_matches_at_out_of_range_is_false(
                seq in vec(tiny(), 0..8),
                steps in vec(tiny(), 1..3),
                start in any::<usize>(),
            ) {
                let pattern = Pattern::from_instructions(&steps).unwrap();
                if start.saturating_add(steps.len()) > seq.len() {
                    prop_assert!(!pattern.matches_at(&seq, start));
                }
            }
        }
    }
}
