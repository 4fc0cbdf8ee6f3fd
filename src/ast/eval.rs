use super::{CmpKind, Expr, Program};
use crate::error::CompileError;
use std::cell::RefCell;
use std::collections::HashMap;
use std::fmt;
use std::io::{BufRead, Write};
use std::rc::Rc;

/// Runtime value of the reference evaluator. Vectors are shared so that
/// a field write through one binding is visible through another.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Int(i64),
    Bool(bool),
    Vec(Rc<RefCell<Vec<Value>>>),
}

impl Value {
    pub fn as_int(&self) -> Result<i64, CompileError> {
        match self {
            Value::Int(n) => Ok(*n),
            other => Err(CompileError::type_mismatch(format!(
                "expected an integer, got {}",
                other
            ))),
        }
    }

    pub fn as_bool(&self) -> Result<bool, CompileError> {
        match self {
            Value::Bool(b) => Ok(*b),
            other => Err(CompileError::type_mismatch(format!(
                "expected a boolean, got {}",
                other
            ))),
        }
    }

    fn as_vec(&self) -> Result<Rc<RefCell<Vec<Value>>>, CompileError> {
        match self {
            Value::Vec(v) => Ok(v.clone()),
            other => Err(CompileError::type_mismatch(format!(
                "expected a vector, got {}",
                other
            ))),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Value::Int(n) => write!(f, "{}", n),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Vec(elems) => {
                write!(f, "#(")?;
                for (i, v) in elems.borrow().iter().enumerate() {
                    if i > 0 {
                        write!(f, " ")?;
                    }
                    write!(f, "{}", v)?;
                }
                write!(f, ")")
            }
        }
    }
}

/// Tree-walking reference interpreter. It establishes the expected
/// output for the compiled program: same result, same write order, same
/// read order. It runs on the pre-expose tree and rejects the internal
/// allocation node.
pub struct Evaluator<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> Evaluator<R, W> {
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }

    pub fn eval(&mut self, prog: &Program) -> Result<Value, CompileError> {
        let mut env = HashMap::new();
        self.eval_expr(&prog.body, &mut env)
    }

    fn eval_expr(
        &mut self,
        expr: &Expr,
        env: &mut HashMap<String, Value>,
    ) -> Result<Value, CompileError> {
        match expr {
            Expr::Int(n) => Ok(Value::Int(*n)),
            Expr::Bool(b) => Ok(Value::Bool(*b)),

            Expr::Neg(e) => {
                let n = self.eval_expr(e, env)?.as_int()?;
                Ok(Value::Int(-n))
            }

            Expr::Add(l, r) => {
                let l = self.eval_expr(l, env)?.as_int()?;
                let r = self.eval_expr(r, env)?.as_int()?;
                Ok(Value::Int(l + r))
            }

            Expr::Cmp { kind, lhs, rhs } => {
                let lhs = self.eval_expr(lhs, env)?;
                let rhs = self.eval_expr(rhs, env)?;
                eval_cmp(*kind, &lhs, &rhs)
            }

            Expr::Let {
                name, value, body, ..
            } => {
                let value = self.eval_expr(value, env)?;
                let shadowed = env.insert(name.clone(), value);
                let result = self.eval_expr(body, env);
                match shadowed {
                    Some(old) => env.insert(name.clone(), old),
                    None => env.remove(name),
                };
                result
            }

            Expr::Var { name, .. } => match env.get(name) {
                Some(value) => Ok(value.clone()),
                None => Err(CompileError::UnboundVariable(name.clone())),
            },

            Expr::If { cond, then, els } => {
                if self.eval_expr(cond, env)?.as_bool()? {
                    self.eval_expr(then, env)
                } else {
                    self.eval_expr(els, env)
                }
            }

            Expr::Read => {
                let mut line = String::new();
                self.input.read_line(&mut line)?;
                let trimmed = line.trim();
                trimmed
                    .parse::<i64>()
                    .map(Value::Int)
                    .map_err(|_| CompileError::MalformedInput(trimmed.to_string()))
            }

            Expr::Write(e) => {
                let n = self.eval_expr(e, env)?.as_int()?;
                writeln!(self.output, "{}", n)?;
                Ok(Value::Int(n))
            }

            Expr::Vec(elems) => {
                let mut values = Vec::with_capacity(elems.len());
                for e in elems {
                    values.push(self.eval_expr(e, env)?);
                }
                Ok(Value::Vec(Rc::new(RefCell::new(values))))
            }

            Expr::VecRef { vec, index } => {
                let vec = self.eval_expr(vec, env)?.as_vec()?;
                let elems = vec.borrow();
                elems.get(*index).cloned().ok_or_else(|| {
                    CompileError::type_mismatch(format!(
                        "vector field {} out of range for arity {}",
                        index,
                        elems.len()
                    ))
                })
            }

            Expr::VecSet { vec, index, value } => {
                let vec = self.eval_expr(vec, env)?.as_vec()?;
                let value = self.eval_expr(value, env)?;
                let mut elems = vec.borrow_mut();
                if *index >= elems.len() {
                    return Err(CompileError::type_mismatch(format!(
                        "vector field {} out of range for arity {}",
                        index,
                        elems.len()
                    )));
                }
                elems[*index] = value.clone();
                Ok(value)
            }

            Expr::Alloc { .. } => Err(CompileError::InternalNodeMisuse(
                "allocation node reached the tree-walking evaluator".to_string(),
            )),
        }
    }
}

fn eval_cmp(kind: CmpKind, lhs: &Value, rhs: &Value) -> Result<Value, CompileError> {
    let result = match kind {
        CmpKind::Eq => lhs.as_int()? == rhs.as_int()?,
        CmpKind::Ne => lhs.as_int()? != rhs.as_int()?,
        CmpKind::Gt => lhs.as_int()? > rhs.as_int()?,
        CmpKind::Lt => lhs.as_int()? < rhs.as_int()?,
        CmpKind::Ge => lhs.as_int()? >= rhs.as_int()?,
        CmpKind::Le => lhs.as_int()? <= rhs.as_int()?,
        // booleans sum as 0/1
        CmpKind::SumZero => lhs.as_bool()? as i64 + rhs.as_bool()? as i64 == 0,
        CmpKind::SumNonzero => lhs.as_bool()? as i64 + rhs.as_bool()? as i64 != 0,
    };
    Ok(Value::Bool(result))
}

/// Convenience wrapper over stdin/stdout.
pub fn evaluate(prog: &Program) -> Result<Value, CompileError> {
    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    Evaluator::new(stdin.lock(), stdout.lock()).eval(prog)
}
