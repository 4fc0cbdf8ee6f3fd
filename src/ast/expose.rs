use super::{Expr, Program};

/// Desugars every vector literal into an internal allocation node whose
/// fields are written in index order during flatten. All other nodes are
/// left structurally unchanged. The resulting tree is only legal input
/// for flatten.
pub fn expose(prog: Program) -> Program {
    Program::new(expose_expr(prog.body))
}

fn expose_expr(expr: Expr) -> Expr {
    match expr {
        Expr::Int(_) | Expr::Bool(_) | Expr::Read | Expr::Var { .. } => expr,

        Expr::Neg(e) => Expr::neg(expose_expr(*e)),

        Expr::Add(l, r) => Expr::add(expose_expr(*l), expose_expr(*r)),

        Expr::Cmp { kind, lhs, rhs } => Expr::cmp(kind, expose_expr(*lhs), expose_expr(*rhs)),

        Expr::Let {
            name,
            ty,
            value,
            body,
        } => Expr::Let {
            name,
            ty,
            value: Box::new(expose_expr(*value)),
            body: Box::new(expose_expr(*body)),
        },

        Expr::If { cond, then, els } => {
            Expr::if_(expose_expr(*cond), expose_expr(*then), expose_expr(*els))
        }

        Expr::Write(e) => Expr::write(expose_expr(*e)),

        Expr::Vec(elems) => Expr::Alloc {
            fields: elems.into_iter().map(expose_expr).collect(),
        },

        Expr::VecRef { vec, index } => Expr::vec_ref(expose_expr(*vec), index),

        Expr::VecSet { vec, index, value } => {
            Expr::vec_set(expose_expr(*vec), index, expose_expr(*value))
        }

        // idempotent: exposing twice is harmless
        Expr::Alloc { fields } => Expr::Alloc {
            fields: fields.into_iter().map(expose_expr).collect(),
        },
    }
}
