use super::ty::Ty;
use std::fmt;

/// Comparison kind. `SumZero` and `SumNonzero` are internal kinds used to
/// compile boolean and/or/not arithmetically: the operands are added and
/// the sum is compared against zero.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum CmpKind {
    Eq,
    Ne,
    Gt,
    Lt,
    Ge,
    Le,
    SumZero,
    SumNonzero,
}

/// The surface tree. Programs are built directly as in-memory trees;
/// there is no textual parser.
///
/// `Alloc` is internal: it only exists between the expose pass and
/// flatten. Every other pass rejects it.
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    Int(i64),
    Bool(bool),
    Neg(Box<Expr>),
    Add(Box<Expr>, Box<Expr>),
    Cmp {
        kind: CmpKind,
        lhs: Box<Expr>,
        rhs: Box<Expr>,
    },
    Let {
        name: String,
        ty: Ty,
        value: Box<Expr>,
        body: Box<Expr>,
    },
    Var {
        name: String,
        ty: Ty,
    },
    If {
        cond: Box<Expr>,
        then: Box<Expr>,
        els: Box<Expr>,
    },
    Read,
    Write(Box<Expr>),
    Vec(Vec<Expr>),
    VecRef {
        vec: Box<Expr>,
        index: usize,
    },
    VecSet {
        vec: Box<Expr>,
        index: usize,
        value: Box<Expr>,
    },
    Alloc {
        fields: Vec<Expr>,
    },
}

impl Expr {
    pub fn neg(e: Expr) -> Expr {
        Expr::Neg(Box::new(e))
    }

    pub fn add(lhs: Expr, rhs: Expr) -> Expr {
        Expr::Add(Box::new(lhs), Box::new(rhs))
    }

    pub fn cmp(kind: CmpKind, lhs: Expr, rhs: Expr) -> Expr {
        Expr::Cmp {
            kind,
            lhs: Box::new(lhs),
            rhs: Box::new(rhs),
        }
    }

    pub fn let_(name: &str, ty: Ty, value: Expr, body: Expr) -> Expr {
        Expr::Let {
            name: name.to_string(),
            ty,
            value: Box::new(value),
            body: Box::new(body),
        }
    }

    pub fn var(name: &str, ty: Ty) -> Expr {
        Expr::Var {
            name: name.to_string(),
            ty,
        }
    }

    pub fn if_(cond: Expr, then: Expr, els: Expr) -> Expr {
        Expr::If {
            cond: Box::new(cond),
            then: Box::new(then),
            els: Box::new(els),
        }
    }

    pub fn write(e: Expr) -> Expr {
        Expr::Write(Box::new(e))
    }

    pub fn vec_ref(vec: Expr, index: usize) -> Expr {
        Expr::VecRef {
            vec: Box::new(vec),
            index,
        }
    }

    pub fn vec_set(vec: Expr, index: usize, value: Expr) -> Expr {
        Expr::VecSet {
            vec: Box::new(vec),
            index,
            value: Box::new(value),
        }
    }

    /// `!a`, compiled as `a + 0 == 0`.
    pub fn not(a: Expr) -> Expr {
        Expr::cmp(CmpKind::SumZero, a, Expr::Bool(false))
    }

    /// `a || b`, compiled as `a + b != 0`.
    pub fn or(a: Expr, b: Expr) -> Expr {
        Expr::cmp(CmpKind::SumNonzero, a, b)
    }

    /// `a && b`, compiled as `!a + !b == 0`.
    pub fn and(a: Expr, b: Expr) -> Expr {
        Expr::cmp(CmpKind::SumZero, Expr::not(a), Expr::not(b))
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Program {
    pub body: Expr,
}

impl Program {
    pub fn new(body: Expr) -> Self {
        Self { body }
    }
}

impl fmt::Display for CmpKind {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        let s = match self {
            CmpKind::Eq => "==",
            CmpKind::Ne => "!=",
            CmpKind::Gt => ">",
            CmpKind::Lt => "<",
            CmpKind::Ge => ">=",
            CmpKind::Le => "<=",
            CmpKind::SumZero => "sum==0",
            CmpKind::SumNonzero => "sum!=0",
        };
        write!(f, "{}", s)
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Expr::Int(n) => write!(f, "{}", n),
            Expr::Bool(b) => write!(f, "{}", b),
            Expr::Neg(e) => write!(f, "(neg {})", e),
            Expr::Add(l, r) => write!(f, "(+ {} {})", l, r),
            Expr::Cmp { kind, lhs, rhs } => write!(f, "({} {} {})", kind, lhs, rhs),
            Expr::Let {
                name,
                ty,
                value,
                body,
            } => write!(f, "(let [{}: {} {}] {})", name, ty, value, body),
            Expr::Var { name, .. } => write!(f, "{}", name),
            Expr::If { cond, then, els } => write!(f, "(if {} {} {})", cond, then, els),
            Expr::Read => write!(f, "(read)"),
            Expr::Write(e) => write!(f, "(write {})", e),
            Expr::Vec(elems) => {
                write!(f, "(vector")?;
                for e in elems {
                    write!(f, " {}", e)?;
                }
                write!(f, ")")
            }
            Expr::VecRef { vec, index } => write!(f, "(vector-ref {} {})", vec, index),
            Expr::VecSet { vec, index, value } => {
                write!(f, "(vector-set! {} {} {})", vec, index, value)
            }
            Expr::Alloc { fields } => {
                write!(f, "(allocate {}", fields.len())?;
                for e in fields {
                    write!(f, " {}", e)?;
                }
                write!(f, ")")
            }
        }
    }
}

impl fmt::Display for Program {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "{}", self.body)
    }
}
