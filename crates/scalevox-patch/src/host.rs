//! Contract with the method-interception host.
//!
//! The host owns compiled method bodies. It hands out the current
//! instruction sequence of a named method and accepts a replacement. This
//! crate never touches a host method unless a full injection point was found.

use crate::error::{PatchError, Result};
use crate::instruction::Instruction;
use crate::patch::{InjectionPatch, InjectionPoint};

pub trait PatchHost {
    /// Current body of `target`, or `None` if the host does not know it.
    fn method_body(&self, target: &str) -> Option<Vec<Instruction>>;

    /// Replace the body of `target`.
    fn install(&mut self, target: &str, body: Vec<Instruction>);
}

/// Apply `patch` to `target` on `host`.
///
/// On any failure the host is left untouched and the error is returned.
/// The failure is logged here; callers may treat it as non-fatal.
pub fn install_patch<H: PatchHost + ?Sized>(
    host: &mut H,
    target: &str,
    patch: &InjectionPatch,
) -> Result<InjectionPoint> {
    let body = host
        .method_body(target)
        .ok_or_else(|| PatchError::MethodNotFound(target.to_string()))
        .inspect_err(|e| tracing::warn!("Cannot patch {}: {}", target, e))?;

    let point = patch
        .locate(&body)
        .inspect_err(|e| tracing::warn!("Failed to patch {} ({}), aborting", target, e))?;

    let patched = crate::rewrite::splice_after(&body, point.target, patch.fragment())?;
    host.install(target, patched);

    tracing::info!(
        "Patched {}: window at {}, branch {} -> {} ({})",
        target,
        point.window,
        point.branch,
        point.target,
        point.label
    );
    Ok(point)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::instruction::{Label, OpCode, Operand};
    use crate::pattern::Pattern;
    use std::collections::HashMap;

    #[derive(Default)]
    struct MapHost {
        bodies: HashMap<String, Vec<Instruction>>,
        installs: usize,
    }

    impl PatchHost for MapHost {
        fn method_body(&self, target: &str) -> Option<Vec<Instruction>> {
            self.bodies.get(target).cloned()
        }

        fn install(&mut self, target: &str, body: Vec<Instruction>) {
            self.installs += 1;
            self.bodies.insert(target.to_string(), body);
        }
    }

    fn patch() -> InjectionPatch {
        InjectionPatch::new(
            Pattern::new([OpCode::LdArg1]).unwrap(),
            vec![Instruction::with_operand(
                OpCode::Call,
                Operand::method("Hooks", "After"),
            )],
        )
        .unwrap()
    }

    #[test]
    fn test_install_rewrites_body() {
        let end = Label::new(0);
        let mut host = MapHost::default();
        host.bodies.insert(
            "Target".into(),
            vec![
                Instruction::new(OpCode::LdArg1),
                Instruction::branch(OpCode::BrFalse, end),
                Instruction::new(OpCode::Nop),
                Instruction::new(OpCode::Ret).labeled(end),
            ],
        );

        let point = install_patch(&mut host, "Target", &patch()).unwrap();
        assert_eq!(point.target, 3);
        assert_eq!(host.installs, 1);
        assert_eq!(host.bodies["Target"].len(), 5);
    }

    #[test]
    fn test_failed_locate_leaves_host_untouched() {
        let mut host = MapHost::default();
        let body = vec![Instruction::new(OpCode::LdArg1), Instruction::new(OpCode::Ret)];
        host.bodies.insert("Target".into(), body.clone());

        assert_eq!(
            install_patch(&mut host, "Target", &patch()),
            Err(PatchError::PatternNotFound)
        );
        assert_eq!(host.installs, 0);
        assert_eq!(host.bodies["Target"], body);
    }

    #[test]
    fn test_unknown_method() {
        let mut host = MapHost::default();
        assert_eq!(
            install_patch(&mut host, "Missing", &patch()),
            Err(PatchError::MethodNotFound("Missing".into()))
        );
    }
}
