pub mod ast;
pub mod codegen;
pub mod compile;
pub mod driver;
pub mod error;
pub mod ir;

pub use compile::{compile, compile_to_pseudo, CompileOptions};
pub use error::CompileError;
