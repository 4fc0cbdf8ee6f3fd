use super::x86::{Arg, AsmProgram, Cc, Instr, Reg};
use crate::ast::CmpKind;
use crate::error::CompileError;
use crate::ir::{Atom, FlatOp, FlatProgram, FlatStmt};

/// Runtime routines linked against the emitted assembly. `_read`
/// returns its value in %rax, `_print` takes its argument in %rdi, and
/// `_gc_malloc` takes a byte count in %rdi and returns a pointer in
/// %rax.
pub const READ_SYMBOL: &str = "_read";
pub const PRINT_SYMBOL: &str = "_print";
pub const ALLOC_SYMBOL: &str = "_gc_malloc";

/// Caller-saved registers preserved around every runtime call. The
/// allocator has not run yet, so select cannot know which of them hold
/// live values; it saves all eight. An even count keeps the stack
/// 16-byte aligned across the call.
pub const CALLER_SAVED: [Reg; 8] = [
    Reg::R8,
    Reg::R9,
    Reg::R10,
    Reg::R11,
    Reg::Rcx,
    Reg::Rdx,
    Reg::Rsi,
    Reg::Rdi,
];

/// Vector base pointers go through this scratch register so field
/// access is a plain register-relative load/store.
const VEC_SCRATCH: Reg = Reg::R11;

/// Translates the flat program statement by statement into
/// pseudo-instructions, ending with a move of the program result into
/// %rax.
pub fn select(prog: &FlatProgram) -> Result<AsmProgram, CompileError> {
    let mut ctx = SelectCtx { instrs: Vec::new() };

    for stmt in &prog.stmts {
        ctx.select_stmt(stmt)?;
    }

    let result = operand(&prog.result)?;
    ctx.emit(Instr::Movq {
        src: result,
        dest: Arg::Reg(Reg::Rax),
    });

    Ok(AsmProgram {
        vars: prog.vars.clone(),
        instrs: ctx.instrs,
    })
}

/// Converts an atom into an operand. Only integer literals and named
/// temporaries are legal in operation position.
fn operand(atom: &Atom) -> Result<Arg, CompileError> {
    match atom {
        Atom::Int(n) => Ok(Arg::Imm(*n)),
        Atom::Var(name) => Ok(Arg::Var(name.clone())),
        Atom::Reg(reg) => Err(CompileError::UnsupportedOperand(format!(
            "register placeholder {} outside of a copy",
            reg
        ))),
    }
}

/// Copy sources additionally admit the physical-register placeholder.
fn copy_source(atom: &Atom) -> Result<Arg, CompileError> {
    match atom {
        Atom::Reg(reg) => Ok(Arg::Reg(*reg)),
        _ => operand(atom),
    }
}

struct SelectCtx {
    instrs: Vec<Instr>,
}

impl SelectCtx {
    fn emit(&mut self, instr: Instr) {
        self.instrs.push(instr);
    }

    fn emit_label(&mut self, label: &str) {
        self.emit(Instr::Raw(format!("{}:", label)));
    }

    fn save_caller_saved(&mut self) {
        for reg in CALLER_SAVED {
            self.emit(Instr::Pushq(Arg::Reg(reg)));
        }
    }

    fn restore_caller_saved(&mut self) {
        for reg in CALLER_SAVED.into_iter().rev() {
            self.emit(Instr::Popq(Arg::Reg(reg)));
        }
    }

    fn select_stmt(&mut self, stmt: &FlatStmt) -> Result<(), CompileError> {
        let dest = Arg::Var(stmt.dest.clone());

        match &stmt.op {
            FlatOp::Copy(src) => {
                let src = copy_source(src)?;
                self.emit(Instr::Movq { src, dest });
            }

            FlatOp::Neg(a) => {
                let src = operand(a)?;
                self.emit(Instr::Movq {
                    src,
                    dest: dest.clone(),
                });
                self.emit(Instr::Negq { dest });
            }

            FlatOp::Add(l, r) => {
                let lhs = operand(l)?;
                let rhs = operand(r)?;
                self.emit(Instr::Movq {
                    src: lhs,
                    dest: dest.clone(),
                });
                self.emit(Instr::Addq { src: rhs, dest });
            }

            FlatOp::Read => {
                self.save_caller_saved();
                self.emit(Instr::Callq(Arg::Label(READ_SYMBOL.to_string())));
                self.restore_caller_saved();
            }

            FlatOp::Write(a) => {
                let src = operand(a)?;
                self.save_caller_saved();
                self.emit(Instr::Movq {
                    src: src.clone(),
                    dest: Arg::Reg(Reg::Rdi),
                });
                self.emit(Instr::Callq(Arg::Label(PRINT_SYMBOL.to_string())));
                self.restore_caller_saved();
                // a write evaluates to the written value
                self.emit(Instr::Movq { src, dest });
            }

            FlatOp::Alloc(len) => {
                self.save_caller_saved();
                self.emit(Instr::Movq {
                    src: Arg::Imm(8 * *len as i64),
                    dest: Arg::Reg(Reg::Rdi),
                });
                self.emit(Instr::Callq(Arg::Label(ALLOC_SYMBOL.to_string())));
                self.restore_caller_saved();
                self.emit(Instr::Movq {
                    src: Arg::Reg(Reg::Rax),
                    dest,
                });
            }

            FlatOp::VecRead { vec, index } => {
                let vec = operand(vec)?;
                self.emit(Instr::Movq {
                    src: vec,
                    dest: Arg::Reg(VEC_SCRATCH),
                });
                self.emit(Instr::Movq {
                    src: Arg::Deref {
                        base: VEC_SCRATCH,
                        offset: 8 * *index as i64,
                    },
                    dest,
                });
            }

            FlatOp::VecWrite { vec, index, src } => {
                let vec = operand(vec)?;
                let src = operand(src)?;
                self.emit(Instr::Movq {
                    src: vec,
                    dest: Arg::Reg(VEC_SCRATCH),
                });
                self.emit(Instr::Movq {
                    src: src.clone(),
                    dest: Arg::Deref {
                        base: VEC_SCRATCH,
                        offset: 8 * *index as i64,
                    },
                });
                // a field write evaluates to the stored value
                self.emit(Instr::Movq { src, dest });
            }

            FlatOp::If {
                kind,
                lhs,
                rhs,
                labels,
                then_stmts,
                then_result,
                else_stmts,
                else_result,
            } => {
                let lhs = operand(lhs)?;
                let rhs = operand(rhs)?;

                self.emit_label(&labels.entry);
                self.emit(Instr::Movq {
                    src: lhs,
                    dest: Arg::Reg(Reg::Rax),
                });
                match kind {
                    // derived and/or kinds combine operands
                    // arithmetically, then compare the sum against zero
                    CmpKind::SumZero | CmpKind::SumNonzero => {
                        self.emit(Instr::Addq {
                            src: rhs,
                            dest: Arg::Reg(Reg::Rax),
                        });
                        self.emit(Instr::Cmpq {
                            src: Arg::Imm(0),
                            dest: Arg::Reg(Reg::Rax),
                        });
                    }
                    _ => {
                        self.emit(Instr::Cmpq {
                            src: rhs,
                            dest: Arg::Reg(Reg::Rax),
                        });
                    }
                }
                self.emit(Instr::JmpIf {
                    cc: Cc::from(*kind),
                    target: Arg::Label(labels.then.clone()),
                });
                self.emit(Instr::Jmp(Arg::Label(labels.els.clone())));

                self.emit_label(&labels.then);
                for inner in then_stmts {
                    self.select_stmt(inner)?;
                }
                let then_result = operand(then_result)?;
                self.emit(Instr::Movq {
                    src: then_result,
                    dest: dest.clone(),
                });
                self.emit(Instr::Jmp(Arg::Label(labels.end.clone())));

                self.emit_label(&labels.els);
                for inner in else_stmts {
                    self.select_stmt(inner)?;
                }
                let else_result = operand(else_result)?;
                self.emit(Instr::Movq {
                    src: else_result,
                    dest,
                });
                self.emit(Instr::Jmp(Arg::Label(labels.end.clone())));

                self.emit_label(&labels.end);
            }
        }

        Ok(())
    }
}
