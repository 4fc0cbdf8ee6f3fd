use super::x86::Instr;
use std::collections::HashSet;

/// Backward liveness over symbolic temporaries. Entry `i` of the result
/// is the live set at the boundary just before instruction `i`, i.e.
/// `live_before = (live_after \ pure-writes) ∪ reads`. The same
/// snapshots feed interference-graph construction.
pub fn live_sets(instrs: &[Instr]) -> Vec<HashSet<String>> {
    let mut live: HashSet<String> = HashSet::new();
    let mut sets = vec![HashSet::new(); instrs.len()];

    for (i, instr) in instrs.iter().enumerate().rev() {
        transfer(instr, &mut live);
        sets[i] = live.clone();
    }

    sets
}

pub fn transfer(instr: &Instr, live: &mut HashSet<String>) {
    if let Some(name) = instr.pure_write_var_name() {
        live.remove(name);
    }
    for name in instr.read_var_names() {
        live.insert(name.to_string());
    }
}
