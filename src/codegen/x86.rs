use crate::ast::CmpKind;
use std::fmt;

#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub enum Reg {
    Rax,
    Rcx,
    Rdx,
    Rsi,
    Rdi,
    Rbp,
    Rsp,
    R8,
    R9,
    R10,
    R11,
    R12,
    R13,
    R14,
    R15,
}

impl fmt::Display for Reg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let name = match self {
            Reg::Rax => "rax",
            Reg::Rcx => "rcx",
            Reg::Rdx => "rdx",
            Reg::Rsi => "rsi",
            Reg::Rdi => "rdi",
            Reg::Rbp => "rbp",
            Reg::Rsp => "rsp",
            Reg::R8 => "r8",
            Reg::R9 => "r9",
            Reg::R10 => "r10",
            Reg::R11 => "r11",
            Reg::R12 => "r12",
            Reg::R13 => "r13",
            Reg::R14 => "r14",
            Reg::R15 => "r15",
        };
        write!(f, "%{}", name)
    }
}

/// Condition code for conditional jumps, derived from the comparison
/// kind. The sum kinds compare an arithmetic sum against zero, so they
/// map onto plain equality codes.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Cc {
    E,
    Ne,
    G,
    L,
    Ge,
    Le,
}

impl From<CmpKind> for Cc {
    fn from(kind: CmpKind) -> Self {
        match kind {
            CmpKind::Eq | CmpKind::SumZero => Cc::E,
            CmpKind::Ne | CmpKind::SumNonzero => Cc::Ne,
            CmpKind::Gt => Cc::G,
            CmpKind::Lt => Cc::L,
            CmpKind::Ge => Cc::Ge,
            CmpKind::Le => Cc::Le,
        }
    }
}

impl fmt::Display for Cc {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let suffix = match self {
            Cc::E => "e",
            Cc::Ne => "ne",
            Cc::G => "g",
            Cc::L => "l",
            Cc::Ge => "ge",
            Cc::Le => "le",
        };
        write!(f, "{}", suffix)
    }
}

/// Instruction operand. `Var` is a symbolic temporary: legal before
/// register assignment, gone after it. `Deref` is a memory operand:
/// illegal before assignment, introduced by it.
#[derive(Debug, Clone, PartialEq)]
pub enum Arg {
    Imm(i64),
    Var(String),
    Reg(Reg),
    Deref { base: Reg, offset: i64 },
    Label(String),
}

impl Arg {
    pub fn is_mem(&self) -> bool {
        matches!(self, Arg::Deref { .. })
    }

    fn var_name(&self) -> Option<&str> {
        match self {
            Arg::Var(name) => Some(name),
            _ => None,
        }
    }
}

impl fmt::Display for Arg {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Arg::Imm(n) => write!(f, "${}", n),
            Arg::Var(name) => write!(f, "{{{}}}", name),
            Arg::Reg(reg) => write!(f, "{}", reg),
            Arg::Deref { base, offset } => write!(f, "{}({})", offset, base),
            Arg::Label(label) => write!(f, "{}", label),
        }
    }
}

/// Two-operand pseudo-instructions in AT&T operand order (src, dest).
#[derive(Debug, Clone, PartialEq)]
pub enum Instr {
    Movq { src: Arg, dest: Arg },
    Addq { src: Arg, dest: Arg },
    Subq { src: Arg, dest: Arg },
    Negq { dest: Arg },
    Andq { src: Arg, dest: Arg },
    Orq { src: Arg, dest: Arg },
    Xorq { src: Arg, dest: Arg },
    Cmpq { src: Arg, dest: Arg },
    Jmp(Arg),
    JmpIf { cc: Cc, target: Arg },
    Callq(Arg),
    Pushq(Arg),
    Popq(Arg),
    Retq,
    /// Verbatim line: directives and label definitions.
    Raw(String),
}

impl Instr {
    /// Operands this instruction reads. Calls and control flow
    /// contribute no operand liveness; push/pop of physical registers
    /// carry no symbolic temporaries.
    pub fn reads(&self) -> Vec<&Arg> {
        match self {
            Instr::Movq { src, .. } => vec![src],
            Instr::Addq { src, dest }
            | Instr::Subq { src, dest }
            | Instr::Andq { src, dest }
            | Instr::Orq { src, dest }
            | Instr::Xorq { src, dest }
            | Instr::Cmpq { src, dest } => vec![src, dest],
            Instr::Negq { dest } => vec![dest],
            Instr::Pushq(arg) => vec![arg],
            _ => vec![],
        }
    }

    /// The single operand written without also being read, if any. A
    /// pure write kills the destination's prior liveness.
    pub fn pure_write(&self) -> Option<&Arg> {
        match self {
            Instr::Movq { dest, .. } => Some(dest),
            Instr::Popq(dest) => Some(dest),
            _ => None,
        }
    }

    /// The operand this instruction writes, if any, whether or not it
    /// also reads it.
    pub fn writes(&self) -> Option<&Arg> {
        match self {
            Instr::Movq { dest, .. }
            | Instr::Addq { dest, .. }
            | Instr::Subq { dest, .. }
            | Instr::Andq { dest, .. }
            | Instr::Orq { dest, .. }
            | Instr::Xorq { dest, .. }
            | Instr::Negq { dest } => Some(dest),
            Instr::Popq(dest) => Some(dest),
            _ => None,
        }
    }

    /// Every operand slot, for rewriting symbolic temporaries into
    /// physical locations.
    pub fn args_mut(&mut self) -> Vec<&mut Arg> {
        match self {
            Instr::Movq { src, dest }
            | Instr::Addq { src, dest }
            | Instr::Subq { src, dest }
            | Instr::Andq { src, dest }
            | Instr::Orq { src, dest }
            | Instr::Xorq { src, dest }
            | Instr::Cmpq { src, dest } => vec![src, dest],
            Instr::Negq { dest } => vec![dest],
            Instr::Jmp(target) | Instr::JmpIf { target, .. } | Instr::Callq(target) => {
                vec![target]
            }
            Instr::Pushq(arg) | Instr::Popq(arg) => vec![arg],
            Instr::Retq | Instr::Raw(_) => vec![],
        }
    }

    pub fn read_var_names(&self) -> Vec<&str> {
        self.reads()
            .into_iter()
            .filter_map(|arg| arg.var_name())
            .collect()
    }

    pub fn pure_write_var_name(&self) -> Option<&str> {
        self.pure_write().and_then(|arg| arg.var_name())
    }

    pub fn write_var_name(&self) -> Option<&str> {
        self.writes().and_then(|arg| arg.var_name())
    }

    /// Source variable of a plain move. A move's destination holds the
    /// same value as its source and may share its location.
    pub fn move_source_var_name(&self) -> Option<&str> {
        match self {
            Instr::Movq { src, .. } => src.var_name(),
            _ => None,
        }
    }
}

impl fmt::Display for Instr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Instr::Movq { src, dest } => write!(f, "movq\t{}, {}", src, dest),
            Instr::Addq { src, dest } => write!(f, "addq\t{}, {}", src, dest),
            Instr::Subq { src, dest } => write!(f, "subq\t{}, {}", src, dest),
            Instr::Negq { dest } => write!(f, "negq\t{}", dest),
            Instr::Andq { src, dest } => write!(f, "andq\t{}, {}", src, dest),
            Instr::Orq { src, dest } => write!(f, "orq\t{}, {}", src, dest),
            Instr::Xorq { src, dest } => write!(f, "xorq\t{}, {}", src, dest),
            Instr::Cmpq { src, dest } => write!(f, "cmpq\t{}, {}", src, dest),
            Instr::Jmp(target) => write!(f, "jmp\t{}", target),
            Instr::JmpIf { cc, target } => write!(f, "j{}\t{}", cc, target),
            Instr::Callq(target) => write!(f, "callq\t{}", target),
            Instr::Pushq(arg) => write!(f, "pushq\t{}", arg),
            Instr::Popq(arg) => write!(f, "popq\t{}", arg),
            Instr::Retq => write!(f, "retq"),
            Instr::Raw(line) => write!(f, "{}", line),
        }
    }
}

/// The pseudo-instruction program: the flat program's temporaries (still
/// in declaration order, they index the interference graph) plus the
/// selected instruction list.
#[derive(Debug, Clone, PartialEq)]
pub struct AsmProgram {
    pub vars: Vec<String>,
    pub instrs: Vec<Instr>,
}

impl fmt::Display for AsmProgram {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        for instr in &self.instrs {
            writeln!(f, "{}", instr)?;
        }
        Ok(())
    }
}
