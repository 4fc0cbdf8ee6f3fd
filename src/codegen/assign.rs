use super::interference::InterferenceGraph;
use super::x86::{Arg, AsmProgram, Instr, Reg};
use crate::error::CompileError;
use std::collections::HashMap;

/// Physical registers handed out by the allocator, callee-saved first.
/// The last four are the argument registers and only work because every
/// runtime call is wrapped in caller-saves by select. %rax stays out of
/// the pool as the patch/compare scratch.
pub const ALLOCATABLE: [Reg; 12] = [
    Reg::R12,
    Reg::R13,
    Reg::R14,
    Reg::R15,
    Reg::R8,
    Reg::R9,
    Reg::R10,
    Reg::R11,
    Reg::Rcx,
    Reg::Rdx,
    Reg::Rsi,
    Reg::Rdi,
];

/// How many physical registers the allocator may hand out. Anything
/// beyond the budget spills to the stack frame, so `None` exercises the
/// spill path deterministically.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum RegisterBudget {
    None,
    CalleeSaved,
    CallerSaved,
    Max,
}

impl RegisterBudget {
    pub fn register_count(self) -> usize {
        match self {
            RegisterBudget::None => 0,
            RegisterBudget::CalleeSaved => 4,
            RegisterBudget::CallerSaved => 8,
            RegisterBudget::Max => ALLOCATABLE.len(),
        }
    }

    /// The physical location for a color under this budget.
    pub fn location(self, color: usize) -> Arg {
        let budget = self.register_count();
        if color < budget {
            Arg::Reg(ALLOCATABLE[color])
        } else {
            let slot = (color - budget) as i64;
            Arg::Deref {
                base: Reg::Rbp,
                offset: -8 * (slot + 1),
            }
        }
    }
}

/// Colors the interference graph and rewrites every symbolic temporary
/// to its physical location, then wraps the program in the calling
/// convention prologue/epilogue with a 16-byte aligned frame sized to
/// the spilled variables.
pub fn assign_registers(
    prog: &mut AsmProgram,
    budget: RegisterBudget,
) -> Result<(), CompileError> {
    let graph = InterferenceGraph::build(&prog.vars, &prog.instrs);
    let colors = graph.color();

    if colors.len() != prog.vars.len() {
        return Err(CompileError::ColoringInvariant {
            got: colors.len(),
            want: prog.vars.len(),
        });
    }

    let locations: HashMap<&str, Arg> = prog
        .vars
        .iter()
        .zip(colors.iter())
        .map(|(name, &color)| (name.as_str(), budget.location(color)))
        .collect();

    for instr in &mut prog.instrs {
        for arg in instr.args_mut() {
            if let Arg::Var(name) = arg {
                let location = locations.get(name.as_str()).ok_or_else(|| {
                    CompileError::UnsupportedOperand(format!(
                        "temporary `{}` was never declared",
                        name
                    ))
                })?;
                *arg = location.clone();
            }
        }
    }

    let frame_size = frame_size(&colors, budget.register_count());
    let mut prologue = vec![
        Instr::Raw(".globl _main".to_string()),
        Instr::Raw("_main:".to_string()),
        Instr::Pushq(Arg::Reg(Reg::Rbp)),
        Instr::Movq {
            src: Arg::Reg(Reg::Rsp),
            dest: Arg::Reg(Reg::Rbp),
        },
    ];
    if frame_size > 0 {
        prologue.push(Instr::Subq {
            src: Arg::Imm(frame_size),
            dest: Arg::Reg(Reg::Rsp),
        });
    }

    prologue.append(&mut prog.instrs);
    prog.instrs = prologue;

    prog.instrs.push(Instr::Movq {
        src: Arg::Reg(Reg::Rbp),
        dest: Arg::Reg(Reg::Rsp),
    });
    prog.instrs.push(Instr::Popq(Arg::Reg(Reg::Rbp)));
    prog.instrs.push(Instr::Retq);

    Ok(())
}

/// Bytes of stack needed for spilled colors, rounded up to keep %rsp
/// 16-byte aligned.
fn frame_size(colors: &[usize], budget: usize) -> i64 {
    let spilled = colors
        .iter()
        .map(|&c| c.saturating_sub(budget) + usize::from(c >= budget))
        .max()
        .unwrap_or(0);

    let mut size = 8 * spilled as i64;
    if size % 16 != 0 {
        size += 8;
    }
    size
}
