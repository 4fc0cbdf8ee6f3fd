mod expr;
mod ty;

pub mod eval;
pub mod expose;
pub mod typecheck;
pub mod uniquify;


pub use expr::{CmpKind, Expr, Program};
pub use ty::Ty;
