//! Stock patch for the host's microphone sample path.
//!
//! Inside [`TARGET_METHOD`] the host checks its noise-suppression setting
//! through a proxied flag and branches around the suppression block. Both
//! paths meet at that branch's target, so a call placed right after it sees
//! every frame whether or not suppression ran. The call passes the input
//! instance and the address of the frame buffer to the hook.

use scalevox_patch::{InjectionPatch, Instruction, MemberRef, OpCode, Operand, Pattern, Result};

/// Method whose body receives the hook call.
pub const TARGET_METHOD: &str = "AudioInput::ProcessNewSamples";

/// The noise-suppression flag read that precedes the merge branch.
pub fn noise_suppression_pattern() -> Result<Pattern> {
    Pattern::new([
        (OpCode::LdArg0, Operand::None),
        (OpCode::Call, Operand::method("AudioInput", "get_AudioSystem")),
        (OpCode::CallVirt, Operand::method("AudioSystem", "get_NoiseSupression")),
        (OpCode::Call, Operand::method("LocalModeVariableProxy<bool>", "op_Implicit")),
    ])
}

/// `hook(this, ref samples)`.
pub fn hook_call(hook: MemberRef) -> Vec<Instruction> {
    vec![
        Instruction::new(OpCode::LdArg0),
        Instruction::with_operand(OpCode::LdArgAS, Operand::Int(1)),
        Instruction::with_operand(OpCode::Call, Operand::Method(hook)),
    ]
}

/// Patch that calls `hook` after the noise-suppression branch merges.
pub fn sample_processing_patch(hook: MemberRef) -> Result<InjectionPatch> {
    InjectionPatch::new(noise_suppression_pattern()?, hook_call(hook))
}
