use super::{CmpKind, Expr, Program, Ty};
use crate::error::CompileError;
use std::collections::HashMap;

/// Checks the whole tree once, before any lowering runs. Types are
/// declared at let-bindings and variable references and verified here;
/// nothing is inferred. Later passes may assume a checked tree.
pub fn check(prog: &Program) -> Result<Ty, CompileError> {
    let mut env = HashMap::new();
    check_expr(&prog.body, &mut env)
}

fn check_expr(expr: &Expr, env: &mut HashMap<String, Ty>) -> Result<Ty, CompileError> {
    match expr {
        Expr::Int(_) => Ok(Ty::Int),
        Expr::Bool(_) => Ok(Ty::Bool),

        Expr::Neg(e) => {
            expect_ty(e, Ty::Int, env, "negate")?;
            Ok(Ty::Int)
        }

        Expr::Add(l, r) => {
            expect_ty(l, Ty::Int, env, "add")?;
            expect_ty(r, Ty::Int, env, "add")?;
            Ok(Ty::Int)
        }

        Expr::Cmp { kind, lhs, rhs } => {
            // The internal sum kinds operate on booleans (as 0/1 sums),
            // the relational kinds on integers.
            let operand_ty = match kind {
                CmpKind::SumZero | CmpKind::SumNonzero => Ty::Bool,
                _ => Ty::Int,
            };
            expect_ty(lhs, operand_ty.clone(), env, "comparison")?;
            expect_ty(rhs, operand_ty, env, "comparison")?;
            Ok(Ty::Bool)
        }

        Expr::Let {
            name,
            ty,
            value,
            body,
        } => {
            let value_ty = check_expr(value, env)?;
            if value_ty != *ty {
                return Err(CompileError::type_mismatch(format!(
                    "`{}` declared {} but bound to {}",
                    name, ty, value_ty
                )));
            }

            let shadowed = env.insert(name.clone(), ty.clone());
            let body_ty = check_expr(body, env)?;
            match shadowed {
                Some(old) => env.insert(name.clone(), old),
                None => env.remove(name),
            };

            Ok(body_ty)
        }

        Expr::Var { name, ty } => match env.get(name) {
            None => Err(CompileError::UnboundVariable(name.clone())),
            Some(bound_ty) if bound_ty != ty => Err(CompileError::type_mismatch(format!(
                "`{}` referenced as {} but bound as {}",
                name, ty, bound_ty
            ))),
            Some(_) => Ok(ty.clone()),
        },

        Expr::If { cond, then, els } => {
            if !matches!(cond.as_ref(), Expr::Cmp { .. }) {
                return Err(CompileError::type_mismatch(format!(
                    "if condition must be a comparison, got `{}`",
                    cond
                )));
            }
            expect_ty(cond, Ty::Bool, env, "if condition")?;

            let then_ty = check_expr(then, env)?;
            let els_ty = check_expr(els, env)?;
            if then_ty != els_ty {
                return Err(CompileError::type_mismatch(format!(
                    "if branches disagree: {} vs {}",
                    then_ty, els_ty
                )));
            }
            Ok(then_ty)
        }

        Expr::Read => Ok(Ty::Int),

        Expr::Write(e) => {
            expect_ty(e, Ty::Int, env, "write")?;
            Ok(Ty::Int)
        }

        Expr::Vec(elems) => {
            let mut tys = Vec::with_capacity(elems.len());
            for e in elems {
                tys.push(check_expr(e, env)?);
            }
            Ok(Ty::Vec(tys))
        }

        Expr::VecRef { vec, index } => {
            let elem_tys = expect_vec(vec, env)?;
            field_ty(&elem_tys, *index)
        }

        Expr::VecSet { vec, index, value } => {
            let elem_tys = expect_vec(vec, env)?;
            let expected = field_ty(&elem_tys, *index)?;
            let value_ty = check_expr(value, env)?;
            if value_ty != expected {
                return Err(CompileError::type_mismatch(format!(
                    "vector field {} holds {} but was assigned {}",
                    index, expected, value_ty
                )));
            }
            Ok(expected)
        }

        Expr::Alloc { .. } => Err(CompileError::InternalNodeMisuse(
            "allocation node reached the type checker".to_string(),
        )),
    }
}

fn expect_ty(
    expr: &Expr,
    expected: Ty,
    env: &mut HashMap<String, Ty>,
    ctx: &str,
) -> Result<(), CompileError> {
    let found = check_expr(expr, env)?;
    if found != expected {
        return Err(CompileError::type_mismatch(format!(
            "{} expects {}, got {}",
            ctx, expected, found
        )));
    }
    Ok(())
}

fn expect_vec(expr: &Expr, env: &mut HashMap<String, Ty>) -> Result<Vec<Ty>, CompileError> {
    match check_expr(expr, env)? {
        Ty::Vec(tys) => Ok(tys),
        other => Err(CompileError::type_mismatch(format!(
            "vector operation applied to {}",
            other
        ))),
    }
}

fn field_ty(elem_tys: &[Ty], index: usize) -> Result<Ty, CompileError> {
    elem_tys.get(index).cloned().ok_or_else(|| {
        CompileError::type_mismatch(format!(
            "vector field {} out of range for arity {}",
            index,
            elem_tys.len()
        ))
    })
}
