use super::config::Config;
use super::samples;
use crate::codegen::{emit, emit_to_file, InterferenceGraph};
use crate::compile::{compile, compile_to_pseudo, CompileOptions};
use crate::error::CompileError;

pub struct Driver {
    config: Config,
}

impl Driver {
    pub fn new(config: Config) -> Self {
        Self { config }
    }

    pub fn run(&self) -> Result<(), CompileError> {
        let prog = samples::build(self.config.sample);
        log::debug!("source:\n{}", prog);

        if self.config.graph {
            return self.print_graph(prog);
        }

        let options = CompileOptions {
            registers: self.config.registers.into(),
            timed: self.config.timed,
        };
        let asm = compile(prog, &options)?;

        match &self.config.output {
            Some(path) => emit_to_file(&asm, path)?,
            None => {
                let stdout = std::io::stdout();
                emit(&asm, &mut stdout.lock())?;
            }
        }

        Ok(())
    }

    fn print_graph(&self, prog: crate::ast::Program) -> Result<(), CompileError> {
        let asm = compile_to_pseudo(prog, self.config.timed)?;
        let graph = InterferenceGraph::build(&asm.vars, &asm.instrs);
        println!("{}", graph.to_dot());
        Ok(())
    }
}
