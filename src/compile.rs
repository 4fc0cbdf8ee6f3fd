use crate::ast::{expose, typecheck, uniquify::Uniquify, Program};
use crate::codegen::{assign_registers, patch, select, AsmProgram, RegisterBudget};
use crate::error::CompileError;
use crate::ir::flatten;
use std::time::Instant;

// INPUT: EXPRESSION TREE
// STEP 1: TYPECHECK
// STEP 2: UNIQUIFY (shadow-free names)
// STEP 3: EXPOSE (vector literals -> allocations)
// STEP 4: FLATTEN (tree -> statement list)
// STEP 5: SELECT (statements -> pseudo-instructions)
// STEP 6: ASSIGN (temporaries -> registers/stack)
// STEP 7: PATCH (legalize memory-to-memory operands)
// OUTPUT: ASSEMBLY

#[derive(Debug, Copy, Clone)]
pub struct CompileOptions {
    pub registers: RegisterBudget,
    pub timed: bool,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            registers: RegisterBudget::Max,
            timed: false,
        }
    }
}

pub fn compile(prog: Program, options: &CompileOptions) -> Result<AsmProgram, CompileError> {
    let timed = options.timed;

    let mut asm = compile_to_pseudo(prog, timed)?;

    stage(timed, "assign", || {
        assign_registers(&mut asm, options.registers)
    })?;
    stage(timed, "patch", || patch(&mut asm));
    log::debug!("assembly:\n{}", asm);

    Ok(asm)
}

/// Runs the front half of the pipeline, up to but not including register
/// assignment. The result still refers to symbolic temporaries.
pub fn compile_to_pseudo(prog: Program, timed: bool) -> Result<AsmProgram, CompileError> {
    let ty = stage(timed, "typecheck", || typecheck::check(&prog))?;
    log::debug!("program type: {}", ty);

    let prog = stage(timed, "uniquify", || Uniquify::new().run(prog))?;
    log::debug!("uniquified:\n{}", prog);

    let prog = stage(timed, "expose", || expose::expose(prog));

    let flat = stage(timed, "flatten", || flatten(&prog))?;
    log::debug!("flattened:\n{}", flat);

    let asm = stage(timed, "select", || select(&flat))?;
    log::debug!("pseudo-assembly:\n{}", asm);

    Ok(asm)
}

fn stage<T>(timed: bool, name: &str, pass: impl FnOnce() -> T) -> T {
    if !timed {
        return pass();
    }

    let start = Instant::now();
    let result = pass();
    log::info!("{} finished in {:?}", name, start.elapsed());
    result
}
