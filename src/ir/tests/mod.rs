use crate::ast::{CmpKind, Expr, Program, Ty};
use crate::codegen::x86::Reg;
use crate::error::CompileError;
use crate::ir::{flatten, Atom, FlatOp, FlatStmt};
use pretty_assertions::assert_eq;
use std::collections::HashSet;

fn int_let(name: &str, value: Expr, body: Expr) -> Expr {
    Expr::let_(name, Ty::Int, value, body)
}

fn int_var(name: &str) -> Expr {
    Expr::var(name, Ty::Int)
}

fn var(name: &str) -> Atom {
    Atom::Var(name.to_string())
}

#[test]
fn straight_line_program_flattens_in_execution_order() {
    let prog = Program::new(int_let(
        "x_0",
        Expr::Int(5),
        int_let(
            "y_1",
            Expr::add(int_var("x_0"), Expr::Int(22)),
            Expr::write(int_var("y_1")),
        ),
    ));

    let flat = flatten(&prog).unwrap();

    assert_eq!(flat.vars, vec!["x_0", "add.0", "y_1", "wr.1"]);
    assert_eq!(
        flat.stmts,
        vec![
            FlatStmt {
                dest: "x_0".to_string(),
                op: FlatOp::Copy(Atom::Int(5)),
            },
            FlatStmt {
                dest: "add.0".to_string(),
                op: FlatOp::Add(var("x_0"), Atom::Int(22)),
            },
            FlatStmt {
                dest: "y_1".to_string(),
                op: FlatOp::Copy(var("add.0")),
            },
            FlatStmt {
                dest: "wr.1".to_string(),
                op: FlatOp::Write(var("y_1")),
            },
        ]
    );
    assert_eq!(flat.result, var("wr.1"));
}

#[test]
fn boolean_literals_become_zero_and_one() {
    let prog = Program::new(Expr::let_(
        "b_0",
        Ty::Bool,
        Expr::Bool(true),
        Expr::Int(0),
    ));

    let flat = flatten(&prog).unwrap();

    assert_eq!(flat.stmts[0].op, FlatOp::Copy(Atom::Int(1)));
}

#[test]
fn read_lowers_to_a_call_then_a_copy_from_the_return_register() {
    let prog = Program::new(Expr::Read);

    let flat = flatten(&prog).unwrap();

    assert_eq!(
        flat.stmts,
        vec![
            FlatStmt {
                dest: "read.0".to_string(),
                op: FlatOp::Read,
            },
            FlatStmt {
                dest: "rv.1".to_string(),
                op: FlatOp::Copy(Atom::Reg(Reg::Rax)),
            },
        ]
    );
    assert_eq!(flat.result, var("rv.1"));
}

#[test]
fn comparison_in_value_position_selects_one_or_zero() {
    let prog = Program::new(Expr::cmp(CmpKind::Lt, Expr::Int(5), Expr::Int(17)));

    let flat = flatten(&prog).unwrap();

    assert_eq!(flat.stmts.len(), 1);
    let FlatOp::If {
        kind,
        lhs,
        rhs,
        labels,
        then_stmts,
        then_result,
        else_stmts,
        else_result,
    } = &flat.stmts[0].op
    else {
        panic!("expected a conditional, got {}", flat.stmts[0]);
    };

    assert_eq!(*kind, CmpKind::Lt);
    assert_eq!(*lhs, Atom::Int(5));
    assert_eq!(*rhs, Atom::Int(17));
    assert_eq!(labels.entry, "cond_0");
    assert_eq!(labels.then, "then_1");
    assert_eq!(labels.els, "else_2");
    assert_eq!(labels.end, "end_3");
    assert!(then_stmts.is_empty());
    assert_eq!(*then_result, Atom::Int(1));
    assert!(else_stmts.is_empty());
    assert_eq!(*else_result, Atom::Int(0));
    assert_eq!(flat.result, var("if.4"));
}

#[test]
fn allocation_writes_every_field_in_index_order() {
    let prog = Program::new(Expr::Alloc {
        fields: vec![Expr::Int(7), Expr::Int(8)],
    });

    let flat = flatten(&prog).unwrap();

    assert_eq!(
        flat.stmts,
        vec![
            FlatStmt {
                dest: "vec.0".to_string(),
                op: FlatOp::Alloc(2),
            },
            FlatStmt {
                dest: "init.1".to_string(),
                op: FlatOp::VecWrite {
                    vec: var("vec.0"),
                    index: 0,
                    src: Atom::Int(7),
                },
            },
            FlatStmt {
                dest: "init.2".to_string(),
                op: FlatOp::VecWrite {
                    vec: var("vec.0"),
                    index: 1,
                    src: Atom::Int(8),
                },
            },
        ]
    );
    assert_eq!(flat.result, var("vec.0"));
}

#[test]
fn unexposed_vector_literal_is_rejected() {
    let prog = Program::new(Expr::Vec(vec![Expr::Int(1)]));

    assert!(matches!(
        flatten(&prog),
        Err(CompileError::NonFlatInput(_))
    ));
}

#[test]
fn non_comparison_condition_is_rejected() {
    let prog = Program::new(Expr::if_(Expr::Bool(true), Expr::Int(1), Expr::Int(2)));

    assert!(matches!(
        flatten(&prog),
        Err(CompileError::NonFlatInput(_))
    ));
}

#[test]
fn every_temporary_is_defined_before_use() {
    let prog = Program::new(int_let(
        "x_0",
        Expr::Read,
        Expr::if_(
            Expr::cmp(CmpKind::Lt, int_var("x_0"), Expr::Int(10)),
            Expr::write(Expr::add(int_var("x_0"), Expr::Int(1))),
            Expr::neg(Expr::Int(2)),
        ),
    ));

    let flat = flatten(&prog).unwrap();

    let mut defined = HashSet::new();
    check_defined(&flat.stmts, &mut defined);
    if let Atom::Var(name) = &flat.result {
        assert!(defined.contains(name), "undefined result `{}`", name);
    }
}

fn check_defined(stmts: &[FlatStmt], defined: &mut HashSet<String>) {
    let check = |atom: &Atom, defined: &HashSet<String>| {
        if let Atom::Var(name) = atom {
            assert!(defined.contains(name), "`{}` used before definition", name);
        }
    };

    for stmt in stmts {
        match &stmt.op {
            FlatOp::Copy(a) | FlatOp::Neg(a) | FlatOp::Write(a) => check(a, defined),
            FlatOp::Add(l, r) => {
                check(l, defined);
                check(r, defined);
            }
            FlatOp::Read | FlatOp::Alloc(_) => {}
            FlatOp::VecRead { vec, .. } => check(vec, defined),
            FlatOp::VecWrite { vec, src, .. } => {
                check(vec, defined);
                check(src, defined);
            }
            FlatOp::If {
                lhs,
                rhs,
                then_stmts,
                then_result,
                else_stmts,
                else_result,
                ..
            } => {
                check(lhs, defined);
                check(rhs, defined);

                let mut then_defined = defined.clone();
                check_defined(then_stmts, &mut then_defined);
                check(then_result, &then_defined);

                let mut else_defined = defined.clone();
                check_defined(else_stmts, &mut else_defined);
                check(else_result, &else_defined);
            }
        }
        defined.insert(stmt.dest.clone());
    }
}
