mod flat;
mod lowering;

#[cfg(test)]
mod tests;

pub use flat::{Atom, FlatOp, FlatProgram, FlatStmt, IfLabels};
pub use lowering::flatten;
