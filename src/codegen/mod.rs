mod assign;
mod emit;
mod interference;
mod liveness;
mod patch;
mod select;
pub mod x86;

#[cfg(test)]
mod tests;

pub use assign::{assign_registers, RegisterBudget, ALLOCATABLE};
pub use emit::{emit, emit_to_file, emit_to_string};
pub use interference::InterferenceGraph;
pub use liveness::live_sets;
pub use patch::patch;
pub use select::{select, ALLOC_SYMBOL, CALLER_SAVED, PRINT_SYMBOL, READ_SYMBOL};
pub use x86::{Arg, AsmProgram, Cc, Instr, Reg};
