use super::{Expr, Program};
use crate::error::CompileError;
use std::collections::HashMap;

/// Alpha-renaming: every let-bound name becomes `name_<n>` with a counter
/// shared across the whole tree, and every reference is rewritten to
/// match. After this pass no two distinct bindings share a name.
///
/// Scoping is lexical: the bound expression is renamed under the prior
/// environment, only the body sees the new binding.
pub struct Uniquify {
    counter: usize,
}

impl Uniquify {
    pub fn new() -> Self {
        Self { counter: 0 }
    }

    pub fn run(&mut self, prog: Program) -> Result<Program, CompileError> {
        let env = HashMap::new();
        let body = self.rename(prog.body, &env)?;
        Ok(Program::new(body))
    }

    fn fresh(&mut self, name: &str) -> String {
        let fresh = format!("{}_{}", name, self.counter);
        self.counter += 1;
        fresh
    }

    fn rename(&mut self, expr: Expr, env: &HashMap<String, String>) -> Result<Expr, CompileError> {
        Ok(match expr {
            Expr::Int(_) | Expr::Bool(_) | Expr::Read => expr,

            Expr::Neg(e) => Expr::neg(self.rename(*e, env)?),

            Expr::Add(l, r) => Expr::add(self.rename(*l, env)?, self.rename(*r, env)?),

            Expr::Cmp { kind, lhs, rhs } => {
                Expr::cmp(kind, self.rename(*lhs, env)?, self.rename(*rhs, env)?)
            }

            Expr::Let {
                name,
                ty,
                value,
                body,
            } => {
                let value = self.rename(*value, env)?;

                let new_name = self.fresh(&name);
                let mut body_env = env.clone();
                body_env.insert(name, new_name.clone());
                let body = self.rename(*body, &body_env)?;

                Expr::Let {
                    name: new_name,
                    ty,
                    value: Box::new(value),
                    body: Box::new(body),
                }
            }

            Expr::Var { name, ty } => match env.get(&name) {
                Some(new_name) => Expr::Var {
                    name: new_name.clone(),
                    ty,
                },
                None => return Err(CompileError::UnboundVariable(name)),
            },

            Expr::If { cond, then, els } => Expr::if_(
                self.rename(*cond, env)?,
                self.rename(*then, env)?,
                self.rename(*els, env)?,
            ),

            Expr::Write(e) => Expr::write(self.rename(*e, env)?),

            Expr::Vec(elems) => {
                let mut renamed = Vec::with_capacity(elems.len());
                for e in elems {
                    renamed.push(self.rename(e, env)?);
                }
                Expr::Vec(renamed)
            }

            Expr::VecRef { vec, index } => Expr::vec_ref(self.rename(*vec, env)?, index),

            Expr::VecSet { vec, index, value } => {
                let vec = self.rename(*vec, env)?;
                let value = self.rename(*value, env)?;
                Expr::vec_set(vec, index, value)
            }

            Expr::Alloc { .. } => {
                return Err(CompileError::InternalNodeMisuse(
                    "allocation node reached uniquify".to_string(),
                ))
            }
        })
    }
}

impl Default for Uniquify {
    fn default() -> Self {
        Self::new()
    }
}
