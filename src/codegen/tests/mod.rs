use crate::ast::CmpKind;
use crate::codegen::{
    assign_registers, patch, select, InterferenceGraph, RegisterBudget, ALLOCATABLE,
};
use crate::codegen::x86::{Arg, AsmProgram, Cc, Instr, Reg};
use crate::error::CompileError;
use crate::ir::{Atom, FlatOp, FlatProgram, FlatStmt, IfLabels};
use pretty_assertions::assert_eq;

fn stmt(dest: &str, op: FlatOp) -> FlatStmt {
    FlatStmt {
        dest: dest.to_string(),
        op,
    }
}

fn var(name: &str) -> Atom {
    Atom::Var(name.to_string())
}

fn flat(vars: &[&str], stmts: Vec<FlatStmt>, result: Atom) -> FlatProgram {
    FlatProgram {
        vars: vars.iter().map(|s| s.to_string()).collect(),
        stmts,
        result,
    }
}

fn movq(src: Arg, dest: Arg) -> Instr {
    Instr::Movq { src, dest }
}

fn arg_var(name: &str) -> Arg {
    Arg::Var(name.to_string())
}

#[test]
fn select_copy_then_result_in_rax() {
    let prog = flat(
        &["x.0"],
        vec![stmt("x.0", FlatOp::Copy(Atom::Int(5)))],
        var("x.0"),
    );

    let asm = select(&prog).unwrap();

    assert_eq!(
        asm.instrs,
        vec![
            movq(Arg::Imm(5), arg_var("x.0")),
            movq(arg_var("x.0"), Arg::Reg(Reg::Rax)),
        ]
    );
}

#[test]
fn select_add_moves_lhs_then_adds_rhs() {
    let prog = flat(
        &["x.0", "sum.0"],
        vec![
            stmt("x.0", FlatOp::Copy(Atom::Int(5))),
            stmt("sum.0", FlatOp::Add(var("x.0"), Atom::Int(22))),
        ],
        var("sum.0"),
    );

    let asm = select(&prog).unwrap();

    assert_eq!(
        asm.instrs[1..3],
        [
            movq(arg_var("x.0"), arg_var("sum.0")),
            Instr::Addq {
                src: Arg::Imm(22),
                dest: arg_var("sum.0"),
            },
        ]
    );
}

#[test]
fn select_neg_copies_then_negates_in_place() {
    let prog = flat(
        &["n.0"],
        vec![stmt("n.0", FlatOp::Neg(Atom::Int(7)))],
        var("n.0"),
    );

    let asm = select(&prog).unwrap();

    assert_eq!(
        asm.instrs[..2],
        [
            movq(Arg::Imm(7), arg_var("n.0")),
            Instr::Negq {
                dest: arg_var("n.0"),
            },
        ]
    );
}

#[test]
fn select_read_saves_callers_around_call() {
    let prog = flat(
        &["read.0", "rv.1"],
        vec![
            stmt("read.0", FlatOp::Read),
            stmt("rv.1", FlatOp::Copy(Atom::Reg(Reg::Rax))),
        ],
        var("rv.1"),
    );

    let asm = select(&prog).unwrap();

    let pushes = asm
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::Pushq(_)))
        .count();
    let pops = asm
        .instrs
        .iter()
        .filter(|i| matches!(i, Instr::Popq(_)))
        .count();
    assert_eq!(pushes, 8);
    assert_eq!(pops, 8);

    assert!(asm
        .instrs
        .contains(&Instr::Callq(Arg::Label("_read".to_string()))));
    // the copy picks the value out of the return register
    assert!(asm
        .instrs
        .contains(&movq(Arg::Reg(Reg::Rax), arg_var("rv.1"))));
}

#[test]
fn select_write_passes_rdi_and_yields_written_value() {
    let prog = flat(
        &["x.0", "w.0"],
        vec![
            stmt("x.0", FlatOp::Copy(Atom::Int(27))),
            stmt("w.0", FlatOp::Write(var("x.0"))),
        ],
        var("w.0"),
    );

    let asm = select(&prog).unwrap();

    assert!(asm
        .instrs
        .contains(&movq(arg_var("x.0"), Arg::Reg(Reg::Rdi))));
    assert!(asm
        .instrs
        .contains(&Instr::Callq(Arg::Label("_print".to_string()))));
    assert!(asm.instrs.contains(&movq(arg_var("x.0"), arg_var("w.0"))));
}

#[test]
fn select_alloc_requests_eight_bytes_per_field() {
    let prog = flat(
        &["vec.0"],
        vec![stmt("vec.0", FlatOp::Alloc(3))],
        var("vec.0"),
    );

    let asm = select(&prog).unwrap();

    assert!(asm.instrs.contains(&movq(Arg::Imm(24), Arg::Reg(Reg::Rdi))));
    assert!(asm
        .instrs
        .contains(&Instr::Callq(Arg::Label("_gc_malloc".to_string()))));
}

#[test]
fn select_vec_access_goes_through_scratch_base() {
    let prog = flat(
        &["vec.0", "vref.0"],
        vec![
            stmt("vec.0", FlatOp::Alloc(2)),
            stmt(
                "vref.0",
                FlatOp::VecRead {
                    vec: var("vec.0"),
                    index: 1,
                },
            ),
        ],
        var("vref.0"),
    );

    let asm = select(&prog).unwrap();

    let base = asm
        .instrs
        .iter()
        .position(|i| *i == movq(arg_var("vec.0"), Arg::Reg(Reg::R11)))
        .unwrap();
    assert_eq!(
        asm.instrs[base + 1],
        movq(
            Arg::Deref {
                base: Reg::R11,
                offset: 8,
            },
            arg_var("vref.0"),
        )
    );
}

#[test]
fn select_if_lowers_to_compare_and_labelled_branches() {
    let labels = IfLabels {
        entry: "cond_0".to_string(),
        then: "then_0".to_string(),
        els: "else_0".to_string(),
        end: "end_0".to_string(),
    };
    let prog = flat(
        &["a.0", "if.0"],
        vec![
            stmt("a.0", FlatOp::Copy(Atom::Int(5))),
            stmt(
                "if.0",
                FlatOp::If {
                    kind: CmpKind::Gt,
                    lhs: var("a.0"),
                    rhs: Atom::Int(17),
                    labels,
                    then_stmts: vec![],
                    then_result: Atom::Int(1),
                    else_stmts: vec![],
                    else_result: Atom::Int(0),
                },
            ),
        ],
        var("if.0"),
    );

    let asm = select(&prog).unwrap();

    assert_eq!(
        asm.instrs[1..],
        [
            Instr::Raw("cond_0:".to_string()),
            movq(arg_var("a.0"), Arg::Reg(Reg::Rax)),
            Instr::Cmpq {
                src: Arg::Imm(17),
                dest: Arg::Reg(Reg::Rax),
            },
            Instr::JmpIf {
                cc: Cc::G,
                target: Arg::Label("then_0".to_string()),
            },
            Instr::Jmp(Arg::Label("else_0".to_string())),
            Instr::Raw("then_0:".to_string()),
            movq(Arg::Imm(1), arg_var("if.0")),
            Instr::Jmp(Arg::Label("end_0".to_string())),
            Instr::Raw("else_0:".to_string()),
            movq(Arg::Imm(0), arg_var("if.0")),
            Instr::Jmp(Arg::Label("end_0".to_string())),
            Instr::Raw("end_0:".to_string()),
            movq(arg_var("if.0"), Arg::Reg(Reg::Rax)),
        ]
    );
}

#[test]
fn select_sum_kind_compares_operand_sum_against_zero() {
    let labels = IfLabels {
        entry: "cond_0".to_string(),
        then: "then_0".to_string(),
        els: "else_0".to_string(),
        end: "end_0".to_string(),
    };
    let prog = flat(
        &["a.0", "b.0", "or.0"],
        vec![
            stmt("a.0", FlatOp::Copy(Atom::Int(0))),
            stmt("b.0", FlatOp::Copy(Atom::Int(1))),
            stmt(
                "or.0",
                FlatOp::If {
                    kind: CmpKind::SumNonzero,
                    lhs: var("a.0"),
                    rhs: var("b.0"),
                    labels,
                    then_stmts: vec![],
                    then_result: Atom::Int(1),
                    else_stmts: vec![],
                    else_result: Atom::Int(0),
                },
            ),
        ],
        var("or.0"),
    );

    let asm = select(&prog).unwrap();

    assert!(asm.instrs.contains(&Instr::Addq {
        src: arg_var("b.0"),
        dest: Arg::Reg(Reg::Rax),
    }));
    assert!(asm.instrs.contains(&Instr::Cmpq {
        src: Arg::Imm(0),
        dest: Arg::Reg(Reg::Rax),
    }));
    assert!(asm.instrs.contains(&Instr::JmpIf {
        cc: Cc::Ne,
        target: Arg::Label("then_0".to_string()),
    }));
}

#[test]
fn select_register_placeholder_only_legal_in_copies() {
    let copy = flat(
        &["r.0"],
        vec![stmt("r.0", FlatOp::Copy(Atom::Reg(Reg::Rax)))],
        var("r.0"),
    );
    let asm = select(&copy).unwrap();
    assert_eq!(asm.instrs[0], movq(Arg::Reg(Reg::Rax), arg_var("r.0")));

    let add = flat(
        &["r.0"],
        vec![stmt("r.0", FlatOp::Add(Atom::Reg(Reg::Rax), Atom::Int(1)))],
        var("r.0"),
    );
    assert!(matches!(
        select(&add),
        Err(CompileError::UnsupportedOperand(_))
    ));
}

#[test]
fn overlapping_temporaries_interfere() {
    let vars = vec!["a".to_string(), "b".to_string()];
    let instrs = vec![
        movq(Arg::Imm(1), arg_var("a")),
        movq(Arg::Imm(2), arg_var("b")),
        Instr::Addq {
            src: arg_var("a"),
            dest: arg_var("b"),
        },
        movq(arg_var("b"), Arg::Reg(Reg::Rax)),
    ];

    let graph = InterferenceGraph::build(&vars, &instrs);

    assert!(graph.interferes(0, 1));
    assert_eq!(graph.color(), vec![0, 1]);
}

#[test]
fn disjoint_temporaries_share_a_color() {
    let vars = vec!["a".to_string(), "b".to_string()];
    let instrs = vec![
        movq(Arg::Imm(1), arg_var("a")),
        movq(arg_var("a"), Arg::Reg(Reg::Rax)),
        movq(Arg::Imm(2), arg_var("b")),
        movq(arg_var("b"), Arg::Reg(Reg::Rax)),
    ];

    let graph = InterferenceGraph::build(&vars, &instrs);

    assert!(!graph.interferes(0, 1));
    assert_eq!(graph.color(), vec![0, 0]);
}

#[test]
fn dead_destination_still_interferes_with_live_values() {
    // `sink` is written but never read, like a vector-initialization
    // temporary; it must not share a location with values that are
    // live across its write
    let vars = vec!["held".to_string(), "src".to_string(), "sink".to_string()];
    let instrs = vec![
        movq(Arg::Imm(1), arg_var("held")),
        movq(Arg::Imm(5), arg_var("src")),
        movq(arg_var("src"), arg_var("sink")),
        Instr::Addq {
            src: arg_var("src"),
            dest: arg_var("held"),
        },
        movq(arg_var("held"), Arg::Reg(Reg::Rax)),
    ];

    let graph = InterferenceGraph::build(&vars, &instrs);

    assert!(graph.interferes(0, 2), "held and sink must not share");
    // a move's destination may share with its own source
    assert!(!graph.interferes(1, 2));

    let colors = graph.color();
    assert_ne!(colors[0], colors[2]);
}

#[test]
fn coloring_never_shares_a_color_across_an_edge() {
    let vars: Vec<String> = (0..6).map(|i| format!("t{}", i)).collect();
    let mut graph = InterferenceGraph::new(&vars);
    graph.add_edge(0, 1);
    graph.add_edge(1, 2);
    graph.add_edge(2, 3);
    graph.add_edge(3, 4);
    graph.add_edge(0, 4);
    graph.add_edge(1, 5);

    let colors = graph.color();

    for u in 0..graph.len() {
        for &v in graph.neighbors(u) {
            assert_ne!(colors[u], colors[v], "{} and {} share a color", u, v);
        }
    }
}

#[test]
fn dot_rendering_names_every_temporary() {
    let vars = vec!["a".to_string(), "b".to_string()];
    let mut graph = InterferenceGraph::new(&vars);
    graph.add_edge(0, 1);

    let dot = graph.to_dot();

    assert!(dot.contains("\"a\""));
    assert!(dot.contains("\"b\""));
    assert!(dot.contains("--"));
}

#[test]
fn patch_routes_memory_to_memory_through_rax() {
    let mem = |offset| Arg::Deref {
        base: Reg::Rbp,
        offset,
    };
    let mut prog = AsmProgram {
        vars: vec![],
        instrs: vec![
            movq(mem(-8), mem(-16)),
            Instr::Addq {
                src: Arg::Imm(1),
                dest: mem(-16),
            },
        ],
    };

    patch(&mut prog);

    assert_eq!(
        prog.instrs,
        vec![
            movq(mem(-8), Arg::Reg(Reg::Rax)),
            movq(Arg::Reg(Reg::Rax), mem(-16)),
            Instr::Addq {
                src: Arg::Imm(1),
                dest: mem(-16),
            },
        ]
    );
}

#[test]
fn budget_locations_fall_off_into_the_frame() {
    let budget = RegisterBudget::CalleeSaved;

    assert_eq!(budget.location(0), Arg::Reg(Reg::R12));
    assert_eq!(budget.location(3), Arg::Reg(Reg::R15));
    assert_eq!(
        budget.location(4),
        Arg::Deref {
            base: Reg::Rbp,
            offset: -8,
        }
    );
    assert_eq!(
        budget.location(5),
        Arg::Deref {
            base: Reg::Rbp,
            offset: -16,
        }
    );

    assert_eq!(RegisterBudget::None.register_count(), 0);
    assert_eq!(RegisterBudget::Max.register_count(), ALLOCATABLE.len());
}

#[test]
fn assign_with_no_budget_spills_everything() {
    let mut prog = AsmProgram {
        vars: vec!["a".to_string(), "b".to_string()],
        instrs: vec![
            movq(Arg::Imm(1), arg_var("a")),
            movq(Arg::Imm(2), arg_var("b")),
            Instr::Addq {
                src: arg_var("a"),
                dest: arg_var("b"),
            },
            movq(arg_var("b"), Arg::Reg(Reg::Rax)),
        ],
    };

    assign_registers(&mut prog, RegisterBudget::None).unwrap();

    // two interfering spills, 16 bytes of frame
    assert!(prog.instrs.contains(&Instr::Subq {
        src: Arg::Imm(16),
        dest: Arg::Reg(Reg::Rsp),
    }));
    assert!(prog.instrs.contains(&movq(
        Arg::Imm(1),
        Arg::Deref {
            base: Reg::Rbp,
            offset: -8,
        }
    )));
    assert!(prog.instrs.contains(&movq(
        Arg::Imm(2),
        Arg::Deref {
            base: Reg::Rbp,
            offset: -16,
        }
    )));
    // no symbolic temporaries survive assignment
    assert!(!prog.instrs.iter().any(|i| i.to_string().contains('{')));
}

#[test]
fn assign_with_registers_wraps_in_calling_convention() {
    let mut prog = AsmProgram {
        vars: vec!["a".to_string()],
        instrs: vec![
            movq(Arg::Imm(42), arg_var("a")),
            movq(arg_var("a"), Arg::Reg(Reg::Rax)),
        ],
    };

    assign_registers(&mut prog, RegisterBudget::Max).unwrap();

    assert_eq!(
        prog.instrs,
        vec![
            Instr::Raw(".globl _main".to_string()),
            Instr::Raw("_main:".to_string()),
            Instr::Pushq(Arg::Reg(Reg::Rbp)),
            movq(Arg::Reg(Reg::Rsp), Arg::Reg(Reg::Rbp)),
            movq(Arg::Imm(42), Arg::Reg(Reg::R12)),
            movq(Arg::Reg(Reg::R12), Arg::Reg(Reg::Rax)),
            movq(Arg::Reg(Reg::Rbp), Arg::Reg(Reg::Rsp)),
            Instr::Popq(Arg::Reg(Reg::Rbp)),
            Instr::Retq,
        ]
    );
}

#[test]
fn spilled_program_survives_patching_with_one_memory_operand_per_instr() {
    let mut prog = AsmProgram {
        vars: vec!["a".to_string(), "b".to_string(), "c".to_string()],
        instrs: vec![
            movq(Arg::Imm(1), arg_var("a")),
            movq(arg_var("a"), arg_var("b")),
            movq(Arg::Imm(3), arg_var("c")),
            Instr::Addq {
                src: arg_var("b"),
                dest: arg_var("c"),
            },
            movq(arg_var("c"), Arg::Reg(Reg::Rax)),
        ],
    };

    assign_registers(&mut prog, RegisterBudget::None).unwrap();
    patch(&mut prog);

    for instr in &prog.instrs {
        let mems = match instr {
            Instr::Movq { src, dest }
            | Instr::Addq { src, dest }
            | Instr::Subq { src, dest }
            | Instr::Cmpq { src, dest } => {
                usize::from(src.is_mem()) + usize::from(dest.is_mem())
            }
            _ => 0,
        };
        assert!(mems <= 1, "two memory operands in `{}`", instr);
    }
}
