use super::config::Sample;
use crate::ast::{CmpKind, Expr, Program, Ty};

/// Built-in demo programs, one per `--sample` value.
pub fn build(sample: Sample) -> Program {
    match sample {
        // prints 27
        Sample::WriteSum => Program::new(Expr::let_(
            "x",
            Ty::Int,
            Expr::Int(5),
            Expr::let_(
                "y",
                Ty::Int,
                Expr::add(Expr::var("x", Ty::Int), Expr::Int(22)),
                Expr::write(Expr::var("y", Ty::Int)),
            ),
        )),

        // prints 0 when the input is below 10, otherwise 1
        Sample::Branch => Program::new(Expr::write(Expr::if_(
            Expr::cmp(CmpKind::Lt, Expr::Read, Expr::Int(10)),
            Expr::Int(0),
            Expr::Int(1),
        ))),

        // prints 4
        Sample::Vector => {
            let vec_ty = Ty::Vec(vec![Ty::Int, Ty::Int, Ty::Int]);
            Program::new(Expr::let_(
                "v",
                vec_ty.clone(),
                Expr::Vec(vec![Expr::Int(1), Expr::Int(2), Expr::Int(3)]),
                Expr::write(Expr::add(
                    Expr::vec_ref(Expr::var("v", vec_ty.clone()), 0),
                    Expr::vec_ref(Expr::var("v", vec_ty), 2),
                )),
            ))
        }

        // prints 39
        Sample::Shadowing => Program::new(Expr::write(Expr::let_(
            "x",
            Ty::Int,
            Expr::Int(5),
            Expr::add(
                Expr::let_("x", Ty::Int, Expr::Int(34), Expr::var("x", Ty::Int)),
                Expr::var("x", Ty::Int),
            ),
        ))),

        // prints 1
        Sample::Boolean => Program::new(Expr::write(Expr::if_(
            Expr::or(
                Expr::cmp(CmpKind::Lt, Expr::Int(1), Expr::Int(2)),
                Expr::cmp(CmpKind::Eq, Expr::Int(3), Expr::Int(4)),
            ),
            Expr::Int(1),
            Expr::Int(0),
        ))),
    }
}
