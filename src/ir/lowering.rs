use super::flat::{Atom, FlatOp, FlatProgram, FlatStmt, IfLabels};
use crate::ast::{Expr, Program};
use crate::codegen::x86::Reg;
use crate::error::CompileError;
use std::collections::HashSet;

/// Lowers the (shadow-free, exposed) tree into a flat statement list.
/// Temporaries use a `prefix.N` scheme so they can never collide with
/// uniquified user names (`name_N`).
pub fn flatten(prog: &Program) -> Result<FlatProgram, CompileError> {
    let mut ctx = FlattenCtx::new();
    let mut stmts = Vec::new();
    let result = ctx.flatten_expr(&prog.body, &mut stmts)?;

    Ok(FlatProgram {
        vars: ctx.vars,
        stmts,
        result,
    })
}

struct FlattenCtx {
    counter: usize,
    vars: Vec<String>,
    declared: HashSet<String>,
}

impl FlattenCtx {
    fn new() -> Self {
        Self {
            counter: 0,
            vars: Vec::new(),
            declared: HashSet::new(),
        }
    }

    fn fresh(&mut self, prefix: &str) -> String {
        let name = format!("{}.{}", prefix, self.counter);
        self.counter += 1;
        self.declare(name.clone());
        name
    }

    fn fresh_label(&mut self, prefix: &str) -> String {
        let label = format!("{}_{}", prefix, self.counter);
        self.counter += 1;
        label
    }

    fn declare(&mut self, name: String) {
        if self.declared.insert(name.clone()) {
            self.vars.push(name);
        }
    }

    fn flatten_expr(
        &mut self,
        expr: &Expr,
        stmts: &mut Vec<FlatStmt>,
    ) -> Result<Atom, CompileError> {
        match expr {
            Expr::Int(n) => Ok(Atom::Int(*n)),
            Expr::Bool(b) => Ok(Atom::Int(*b as i64)),
            Expr::Var { name, .. } => Ok(Atom::Var(name.clone())),

            Expr::Neg(e) => {
                let arg = self.flatten_expr(e, stmts)?;
                let dest = self.fresh("neg");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::Neg(arg),
                });
                Ok(Atom::Var(dest))
            }

            Expr::Add(l, r) => {
                // left operand's statements land before the right's
                let lhs = self.flatten_expr(l, stmts)?;
                let rhs = self.flatten_expr(r, stmts)?;
                let dest = self.fresh("add");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::Add(lhs, rhs),
                });
                Ok(Atom::Var(dest))
            }

            Expr::Let {
                name, value, body, ..
            } => {
                let value = self.flatten_expr(value, stmts)?;
                self.declare(name.clone());
                stmts.push(FlatStmt {
                    dest: name.clone(),
                    op: FlatOp::Copy(value),
                });
                self.flatten_expr(body, stmts)
            }

            Expr::Read => {
                // the call leaves the value in the return register; a
                // following copy picks it up
                let call = self.fresh("read");
                stmts.push(FlatStmt {
                    dest: call,
                    op: FlatOp::Read,
                });

                let dest = self.fresh("rv");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::Copy(Atom::Reg(Reg::Rax)),
                });
                Ok(Atom::Var(dest))
            }

            Expr::Write(e) => {
                let arg = self.flatten_expr(e, stmts)?;
                let dest = self.fresh("wr");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::Write(arg),
                });
                Ok(Atom::Var(dest))
            }

            Expr::If { cond, then, els } => {
                let Expr::Cmp { kind, lhs, rhs } = cond.as_ref() else {
                    return Err(CompileError::NonFlatInput(format!(
                        "if condition is not a comparison: `{}`",
                        cond
                    )));
                };

                let lhs = self.flatten_expr(lhs, stmts)?;
                let rhs = self.flatten_expr(rhs, stmts)?;

                let mut then_stmts = Vec::new();
                let then_result = self.flatten_expr(then, &mut then_stmts)?;
                let mut else_stmts = Vec::new();
                let else_result = self.flatten_expr(els, &mut else_stmts)?;

                self.emit_if(
                    *kind,
                    lhs,
                    rhs,
                    then_stmts,
                    then_result,
                    else_stmts,
                    else_result,
                    stmts,
                )
            }

            // a comparison in value position becomes a conditional that
            // selects 1 or 0
            Expr::Cmp { kind, lhs, rhs } => {
                let lhs = self.flatten_expr(lhs, stmts)?;
                let rhs = self.flatten_expr(rhs, stmts)?;
                self.emit_if(
                    *kind,
                    lhs,
                    rhs,
                    Vec::new(),
                    Atom::Int(1),
                    Vec::new(),
                    Atom::Int(0),
                    stmts,
                )
            }

            Expr::Alloc { fields } => {
                let mut field_atoms = Vec::with_capacity(fields.len());
                for field in fields {
                    field_atoms.push(self.flatten_expr(field, stmts)?);
                }

                let dest = self.fresh("vec");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::Alloc(fields.len()),
                });

                // one field write per element, index order preserved
                for (index, src) in field_atoms.into_iter().enumerate() {
                    let init = self.fresh("init");
                    stmts.push(FlatStmt {
                        dest: init,
                        op: FlatOp::VecWrite {
                            vec: Atom::Var(dest.clone()),
                            index,
                            src,
                        },
                    });
                }

                Ok(Atom::Var(dest))
            }

            Expr::Vec(_) => Err(CompileError::NonFlatInput(
                "vector literal reached flatten; run expose first".to_string(),
            )),

            Expr::VecRef { vec, index } => {
                let vec = self.flatten_expr(vec, stmts)?;
                let dest = self.fresh("vref");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::VecRead { vec, index: *index },
                });
                Ok(Atom::Var(dest))
            }

            Expr::VecSet { vec, index, value } => {
                let vec = self.flatten_expr(vec, stmts)?;
                let src = self.flatten_expr(value, stmts)?;
                let dest = self.fresh("vset");
                stmts.push(FlatStmt {
                    dest: dest.clone(),
                    op: FlatOp::VecWrite {
                        vec,
                        index: *index,
                        src,
                    },
                });
                Ok(Atom::Var(dest))
            }
        }
    }

    #[allow(clippy::too_many_arguments)]
    fn emit_if(
        &mut self,
        kind: crate::ast::CmpKind,
        lhs: Atom,
        rhs: Atom,
        then_stmts: Vec<FlatStmt>,
        then_result: Atom,
        else_stmts: Vec<FlatStmt>,
        else_result: Atom,
        stmts: &mut Vec<FlatStmt>,
    ) -> Result<Atom, CompileError> {
        let labels = IfLabels {
            entry: self.fresh_label("cond"),
            then: self.fresh_label("then"),
            els: self.fresh_label("else"),
            end: self.fresh_label("end"),
        };
        let dest = self.fresh("if");

        stmts.push(FlatStmt {
            dest: dest.clone(),
            op: FlatOp::If {
                kind,
                lhs,
                rhs,
                labels,
                then_stmts,
                then_result,
                else_stmts,
                else_result,
            },
        });

        Ok(Atom::Var(dest))
    }
}
