use super::liveness::live_sets;
use super::x86::Instr;
use graphviz_rust::dot_structures::{
    Attribute, Edge, EdgeTy, Graph, Id, Node, NodeId, Stmt, Vertex,
};
use graphviz_rust::printer::{DotPrinter, PrinterContext};
use std::collections::{HashMap, HashSet};

/// Interference graph over the program's temporaries, indexed in
/// declaration order. An edge means the two temporaries are
/// simultaneously live across some instruction boundary and must not
/// share a physical location.
pub struct InterferenceGraph {
    names: Vec<String>,
    index: HashMap<String, usize>,
    adj: Vec<HashSet<usize>>,
}

impl InterferenceGraph {
    pub fn new(vars: &[String]) -> Self {
        let names = vars.to_vec();
        let index = names
            .iter()
            .enumerate()
            .map(|(i, name)| (name.clone(), i))
            .collect();
        let adj = vec![HashSet::new(); names.len()];

        Self { names, index, adj }
    }

    /// Builds the graph from the liveness snapshots: every variable an
    /// instruction writes interferes with everything live after that
    /// instruction, except a move's own source. A destination whose
    /// value is never read appears in no live set, but its write still
    /// lands at runtime, so the write itself is what forbids sharing.
    pub fn build(vars: &[String], instrs: &[Instr]) -> Self {
        let mut graph = Self::new(vars);
        let live = live_sets(instrs);

        for (i, instr) in instrs.iter().enumerate() {
            let Some(dest) = instr.write_var_name() else {
                continue;
            };
            let Some(&u) = graph.index.get(dest) else {
                continue;
            };
            // live before the next instruction is live after this one;
            // nothing is live after the last
            let Some(live_after) = live.get(i + 1) else {
                continue;
            };

            let exempt = instr.move_source_var_name();
            let neighbors: Vec<usize> = live_after
                .iter()
                .filter(|name| Some(name.as_str()) != exempt)
                .filter_map(|name| graph.index.get(name.as_str()).copied())
                .collect();
            for v in neighbors {
                graph.add_edge(u, v);
            }
        }

        graph
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }

    pub fn add_edge(&mut self, u: usize, v: usize) {
        // symmetric, no self edges
        if u == v {
            return;
        }
        self.adj[u].insert(v);
        self.adj[v].insert(u);
    }

    pub fn interferes(&self, u: usize, v: usize) -> bool {
        self.adj[u].contains(&v)
    }

    pub fn neighbors(&self, u: usize) -> &HashSet<usize> {
        &self.adj[u]
    }

    /// Greedy sequential coloring in declaration order: each node takes
    /// the smallest color not used by an already-colored neighbor. Not
    /// optimal, just deterministic.
    pub fn color(&self) -> Vec<usize> {
        let mut colors: Vec<Option<usize>> = vec![None; self.names.len()];

        for u in 0..self.names.len() {
            let taken: HashSet<usize> = self.adj[u]
                .iter()
                .filter_map(|&v| colors[v])
                .collect();

            let mut color = 0;
            while taken.contains(&color) {
                color += 1;
            }
            colors[u] = Some(color);
        }

        colors.into_iter().flatten().collect()
    }

    /// DOT rendering of the graph for debugging allocator decisions.
    pub fn to_dot(&self) -> String {
        let mut stmts = Vec::new();

        for (u, name) in self.names.iter().enumerate() {
            let node = Node {
                id: node_id(name),
                attributes: vec![Attribute(
                    Id::Plain("shape".to_string()),
                    Id::Plain("box".to_string()),
                )],
            };
            stmts.push(Stmt::Node(node));

            for &v in &self.adj[u] {
                if u < v {
                    let edge = Edge {
                        ty: EdgeTy::Pair(
                            Vertex::N(node_id(name)),
                            Vertex::N(node_id(&self.names[v])),
                        ),
                        attributes: vec![],
                    };
                    stmts.push(Stmt::Edge(edge));
                }
            }
        }

        let graph = Graph::Graph {
            id: Id::Plain("interference".to_string()),
            strict: true,
            stmts,
        };

        graph.print(&mut PrinterContext::default())
    }
}

fn node_id(name: &str) -> NodeId {
    NodeId(Id::Escaped(format!("\"{}\"", name)), None)
}
