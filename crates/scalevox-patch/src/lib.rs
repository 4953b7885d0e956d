//! Load-time instruction patching: find a structural pattern in a compiled
//! method body, follow the branch after it to where control merges, and
//! splice a call in at that point.
//!
//! Everything here is a pure function over instruction slices; nothing is
//! shared or locked. Patches are expected to run once, before audio starts.
//!
//! # Example
//!
//! ```
//! use scalevox_patch::{InjectionPatch, Instruction, Label, OpCode, Operand, Pattern};
//!
//! let end = Label::new(0);
//! let body = vec![
//!     Instruction::new(OpCode::LdArg0),
//!     Instruction::branch(OpCode::BrFalse, end),
//!     Instruction::new(OpCode::Nop),
//!     Instruction::new(OpCode::Nop).labeled(end),
//!     Instruction::new(OpCode::Ret),
//! ];
//!
//! let patch = InjectionPatch::new(
//!     Pattern::new([OpCode::LdArg0]).unwrap(),
//!     vec![Instruction::with_operand(OpCode::Call, Operand::method("Hooks", "Run"))],
//! )
//! .unwrap();
//!
//! let patched = patch.apply(&body).unwrap();
//! assert_eq!(patched.len(), body.len() + 1);
//! assert_eq!(patched[4].opcode(), OpCode::Call);
//! ```

mod error;
pub use error::{PatchError, ResolveError, Result};

pub mod instruction;
pub use instruction::{FlowControl, Instruction, Label, LabelSet, MemberRef, OpCode, Operand};

pub mod pattern;
pub use pattern::{find_window, Matches, Pattern, PatternStep};

pub mod branch;
pub use branch::{find_label, resolve_target};

pub mod rewrite;
pub use rewrite::splice_after;

mod patch;
pub use patch::{InjectionPatch, InjectionPoint};

mod host;
pub use host::{install_patch, PatchHost};
