use crate::ast::CmpKind;
use crate::codegen::x86::Reg;
use std::fmt;

/// A flat operand: the only things a statement's operation may mention.
/// `Reg` is a physical-register placeholder used for call plumbing; it is
/// only legal as the source of a `Copy`.
#[derive(Debug, Clone, PartialEq)]
pub enum Atom {
    Int(i64),
    Var(String),
    Reg(Reg),
}

/// Labels minted for one conditional, scoped to it by the flattener's
/// counter.
#[derive(Debug, Clone, PartialEq)]
pub struct IfLabels {
    pub entry: String,
    pub then: String,
    pub els: String,
    pub end: String,
}

/// One primitive operation. Every statement binds exactly one of these
/// to a fresh temporary.
#[derive(Debug, Clone, PartialEq)]
pub enum FlatOp {
    Copy(Atom),
    Neg(Atom),
    Add(Atom, Atom),
    /// Call the runtime input routine. The value lands in the return
    /// register and is picked up by a following `Copy`.
    Read,
    Write(Atom),
    /// Reserve a heap object with this many 8-byte fields.
    Alloc(usize),
    VecRead {
        vec: Atom,
        index: usize,
    },
    VecWrite {
        vec: Atom,
        index: usize,
        src: Atom,
    },
    /// Composite conditional: comparison operands, the four labels, and
    /// both branches' statement lists with their result operands.
    If {
        kind: CmpKind,
        lhs: Atom,
        rhs: Atom,
        labels: IfLabels,
        then_stmts: Vec<FlatStmt>,
        then_result: Atom,
        else_stmts: Vec<FlatStmt>,
        else_result: Atom,
    },
}

#[derive(Debug, Clone, PartialEq)]
pub struct FlatStmt {
    pub dest: String,
    pub op: FlatOp,
}

/// The flattened program: temporaries in declaration order, statements
/// in execution order, and the operand holding the final result.
#[derive(Debug, Clone, PartialEq)]
pub struct FlatProgram {
    pub vars: Vec<String>,
    pub stmts: Vec<FlatStmt>,
    pub result: Atom,
}

impl fmt::Display for Atom {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Atom::Int(n) => write!(f, "{}", n),
            Atom::Var(name) => write!(f, "{}", name),
            Atom::Reg(reg) => write!(f, "{}", reg),
        }
    }
}

impl FlatStmt {
    fn fmt_indented(&self, f: &mut fmt::Formatter, indent: usize) -> fmt::Result {
        let pad = "    ".repeat(indent);
        match &self.op {
            FlatOp::Copy(a) => writeln!(f, "{}{} = {}", pad, self.dest, a),
            FlatOp::Neg(a) => writeln!(f, "{}{} = (neg {})", pad, self.dest, a),
            FlatOp::Add(l, r) => writeln!(f, "{}{} = (+ {} {})", pad, self.dest, l, r),
            FlatOp::Read => writeln!(f, "{}{} = (read)", pad, self.dest),
            FlatOp::Write(a) => writeln!(f, "{}{} = (write {})", pad, self.dest, a),
            FlatOp::Alloc(len) => writeln!(f, "{}{} = (allocate {})", pad, self.dest, len),
            FlatOp::VecRead { vec, index } => {
                writeln!(f, "{}{} = (vector-ref {} {})", pad, self.dest, vec, index)
            }
            FlatOp::VecWrite { vec, index, src } => writeln!(
                f,
                "{}{} = (vector-set! {} {} {})",
                pad, self.dest, vec, index, src
            ),
            FlatOp::If {
                kind,
                lhs,
                rhs,
                labels,
                then_stmts,
                then_result,
                else_stmts,
                else_result,
            } => {
                writeln!(
                    f,
                    "{}{} = (if ({} {} {}) ; {} {} {} {}",
                    pad, self.dest, kind, lhs, rhs, labels.entry, labels.then, labels.els, labels.end
                )?;
                for stmt in then_stmts {
                    stmt.fmt_indented(f, indent + 1)?;
                }
                writeln!(f, "{}    => {}", pad, then_result)?;
                writeln!(f, "{}else", pad)?;
                for stmt in else_stmts {
                    stmt.fmt_indented(f, indent + 1)?;
                }
                writeln!(f, "{}    => {}", pad, else_result)?;
                writeln!(f, "{})", pad)
            }
        }
    }
}

impl fmt::Display for FlatStmt {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        self.fmt_indented(f, 0)
    }
}

impl fmt::Display for FlatProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        writeln!(f, "locals: {}", self.vars.join(", "))?;
        for stmt in &self.stmts {
            stmt.fmt_indented(f, 0)?;
        }
        writeln!(f, "result: {}", self.result)
    }
}
