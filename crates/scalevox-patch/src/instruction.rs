//! Minimal instruction model for load-time method patching.
//!
//! An [`Instruction`] is an opcode, an optional operand and a small set of
//! [`Label`]s marking it as a branch target. Sequences are plain slices/`Vec`s:
//! an instruction's position is its identity, not its address.
//!
//! Two notions of equality exist:
//!
//! - [`Instruction::matches`] compares opcode and operand only. This is what
//!   pattern matching uses; labels are ignored.
//! - `PartialEq` is full structural equality, labels included.

use smallvec::SmallVec;
use std::fmt;

/// Opaque branch-target marker.
///
/// A label is attached to at most one instruction of a sequence; branch
/// instructions refer to it through [`Operand::Label`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Label(u32);

impl Label {
    pub const fn new(id: u32) -> Self {
        Self(id)
    }

    pub const fn id(&self) -> u32 {
        self.0
    }
}

impl fmt::Display for Label {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "L{}", self.0)
    }
}

/// Symbolic reference to a method or field of some owning type.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct MemberRef {
    pub owner: String,
    pub name: String,
}

impl MemberRef {
    pub fn new(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            owner: owner.into(),
            name: name.into(),
        }
    }
}

impl fmt::Display for MemberRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.owner, self.name)
    }
}

/// How control leaves an instruction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlowControl {
    /// Falls through to the next instruction.
    Next,
    /// Calls out and returns to the next instruction.
    Call,
    /// Leaves the method.
    Return,
    /// Unconditional jump.
    Branch,
    /// Jump taken only if a condition holds; otherwise falls through.
    CondBranch,
    /// Raises an exception.
    Throw,
}

/// Operation tag of one instruction.
///
/// The set mirrors the stack-machine opcodes that show up around the patched
/// call sites. Anything else is carried as [`OpCode::Other`] so that foreign
/// sequences can still be represented and scanned.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum OpCode {
    Nop,
    LdArg0,
    LdArg1,
    LdArg2,
    LdArg3,
    /// Load argument address (short form); operand is the argument index.
    LdArgAS,
    LdLoc,
    StLoc,
    LdcI4,
    LdFld,
    StFld,
    Dup,
    Pop,
    Call,
    CallVirt,
    Ret,
    Br,
    BrS,
    BrTrue,
    BrTrueS,
    BrFalse,
    BrFalseS,
    Beq,
    Bne,
    Blt,
    Ble,
    Bgt,
    Bge,
    Leave,
    Throw,
    Other(u16),
}

impl OpCode {
    pub fn flow_control(self) -> FlowControl {
        match self {
            OpCode::Call | OpCode::CallVirt => FlowControl::Call,
            OpCode::Ret => FlowControl::Return,
            OpCode::Br | OpCode::BrS | OpCode::Leave => FlowControl::Branch,
            OpCode::BrTrue
            | OpCode::BrTrueS
            | OpCode::BrFalse
            | OpCode::BrFalseS
            | OpCode::Beq
            | OpCode::Bne
            | OpCode::Blt
            | OpCode::Ble
            | OpCode::Bgt
            | OpCode::Bge => FlowControl::CondBranch,
            OpCode::Throw => FlowControl::Throw,
            _ => FlowControl::Next,
        }
    }

    /// True for conditional and unconditional jumps.
    #[inline]
    pub fn is_branch(self) -> bool {
        matches!(
            self.flow_control(),
            FlowControl::Branch | FlowControl::CondBranch
        )
    }
}

/// Value or symbolic reference carried by an instruction.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub enum Operand {
    #[default]
    None,
    Int(i64),
    Method(MemberRef),
    Field(MemberRef),
    Label(Label),
}

impl Operand {
    pub fn method(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Operand::Method(MemberRef::new(owner, name))
    }

    pub fn field(owner: impl Into<String>, name: impl Into<String>) -> Self {
        Operand::Field(MemberRef::new(owner, name))
    }

    pub fn as_label(&self) -> Option<Label> {
        match self {
            Operand::Label(label) => Some(*label),
            _ => None,
        }
    }
}

/// Labels attached to one instruction; almost always zero or one.
pub type LabelSet = SmallVec<[Label; 1]>;

/// A single instruction: opcode, operand and the labels that target it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Instruction {
    opcode: OpCode,
    operand: Operand,
    labels: LabelSet,
}

impl Instruction {
    /// Instruction without operand or labels.
    pub fn new(opcode: OpCode) -> Self {
        Self {
            opcode,
            operand: Operand::None,
            labels: LabelSet::new(),
        }
    }

    pub fn with_operand(opcode: OpCode, operand: Operand) -> Self {
        Self {
            opcode,
            operand,
            labels: LabelSet::new(),
        }
    }

    /// Full constructor. Duplicate labels are collapsed.
    pub fn from_parts(
        opcode: OpCode,
        operand: Operand,
        labels: impl IntoIterator<Item = Label>,
    ) -> Self {
        let mut insn = Self::with_operand(opcode, operand);
        for label in labels {
            insn = insn.labeled(label);
        }
        insn
    }

    /// Branch instruction jumping to `target`.
    pub fn branch(opcode: OpCode, target: Label) -> Self {
        Self::with_operand(opcode, Operand::Label(target))
    }

    /// Returns this instruction with `label` attached.
    pub fn labeled(mut self, label: Label) -> Self {
        if !self.labels.contains(&label) {
            self.labels.push(label);
        }
        self
    }

    #[inline]
    pub fn opcode(&self) -> OpCode {
        self.opcode
    }

    #[inline]
    pub fn operand(&self) -> &Operand {
        &self.operand
    }

    #[inline]
    pub fn labels(&self) -> &[Label] {
        &self.labels
    }

    #[inline]
    pub fn has_label(&self, label: Label) -> bool {
        self.labels.contains(&label)
    }

    /// Pattern equality: same opcode and same operand, labels ignored.
    #[inline]
    pub fn matches(&self, opcode: OpCode, operand: &Operand) -> bool {
        self.opcode == opcode && self.operand == *operand
    }

    /// Pattern equality against another instruction.
    #[inline]
    pub fn same_op(&self, other: &Instruction) -> bool {
        self.matches(other.opcode, &other.operand)
    }

    /// The label this instruction jumps to, if it is a branch carrying one.
    pub fn branch_target(&self) -> Option<Label> {
        if self.opcode.is_branch() {
            self.operand.as_label()
        } else {
            None
        }
    }
}

impl fmt::Display for Instruction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for label in &self.labels {
            write!(f, "{}: ", label)?;
        }
        write!(f, "{:?}", self.opcode)?;
        match &self.operand {
            Operand::None => Ok(()),
            Operand::Int(v) => write!(f, " {}", v),
            Operand::Method(m) | Operand::Field(m) => write!(f, " {}", m),
            Operand::Label(l) => write!(f, " {}", l),
        }
    }
}
