use super::x86::{Arg, AsmProgram, Instr, Reg};

/// The target's two-operand forms allow at most one memory operand.
/// Legalize offenders by routing the source through %rax immediately
/// before the instruction.
pub fn patch(prog: &mut AsmProgram) {
    let mut patched = Vec::with_capacity(prog.instrs.len());

    for mut instr in prog.instrs.drain(..) {
        if let Some(src) = double_mem_src(&mut instr) {
            patched.push(Instr::Movq {
                src,
                dest: Arg::Reg(Reg::Rax),
            });
        }
        patched.push(instr);
    }

    prog.instrs = patched;
}

/// If both operands are memory, swap the source out for %rax and return
/// the original source so the caller can emit the fixup move.
fn double_mem_src(instr: &mut Instr) -> Option<Arg> {
    let (src, dest) = match instr {
        Instr::Movq { src, dest }
        | Instr::Addq { src, dest }
        | Instr::Subq { src, dest }
        | Instr::Andq { src, dest }
        | Instr::Orq { src, dest }
        | Instr::Xorq { src, dest }
        | Instr::Cmpq { src, dest } => (src, dest),
        _ => return None,
    };

    if src.is_mem() && dest.is_mem() {
        Some(std::mem::replace(src, Arg::Reg(Reg::Rax)))
    } else {
        None
    }
}
