use super::x86::AsmProgram;
use std::fs::File;
use std::io::{self, BufWriter, Write};
use std::path::Path;

/// Serializes the finally-assigned program, one instruction per line,
/// into any sink.
pub fn emit<W: Write>(prog: &AsmProgram, out: &mut W) -> io::Result<()> {
    for instr in &prog.instrs {
        writeln!(out, "{}", instr)?;
    }
    out.flush()
}

pub fn emit_to_file(prog: &AsmProgram, path: &Path) -> io::Result<()> {
    let mut out = BufWriter::new(File::create(path)?);
    emit(prog, &mut out)
}

pub fn emit_to_string(prog: &AsmProgram) -> String {
    prog.to_string()
}
