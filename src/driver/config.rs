use crate::codegen::RegisterBudget;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Config {
    /// Built-in program to compile
    #[arg(long, value_enum, default_value_t = Sample::WriteSum)]
    pub sample: Sample,

    /// How many physical registers the allocator may hand out
    #[arg(long, value_enum, default_value_t = Budget::Max)]
    pub registers: Budget,

    /// Write the assembly to this file instead of stdout
    #[arg(short, long)]
    pub output: Option<PathBuf>,

    /// Print the interference graph in DOT format instead of assembly
    #[arg(long)]
    pub graph: bool,

    /// Dump every pass's output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log per-pass timings
    #[arg(long)]
    pub timed: bool,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Sample {
    WriteSum,
    Branch,
    Vector,
    Shadowing,
    Boolean,
}

#[derive(ValueEnum, Debug, Copy, Clone, PartialEq, Eq)]
pub enum Budget {
    None,
    Callee,
    Caller,
    Max,
}

impl From<Budget> for RegisterBudget {
    fn from(budget: Budget) -> Self {
        match budget {
            Budget::None => RegisterBudget::None,
            Budget::Callee => RegisterBudget::CalleeSaved,
            Budget::Caller => RegisterBudget::CallerSaved,
            Budget::Max => RegisterBudget::Max,
        }
    }
}
