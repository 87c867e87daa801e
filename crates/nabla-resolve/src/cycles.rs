//! Detection of defs that are defined in terms of themselves.
//!
//! Only unguarded references count: a def whose schema is directly another
//! def, a refinement of one, or a union of such references. A reference
//! from inside a struct field or list element is guarded, since a value of
//! the outer schema need not contain one of the inner.

use crate::symbol::{DefId, DocumentId, SymbolTable};
use crate::types::{resolve_type_name, TypeRef};
use nabla_syntax::ast::{Expr, Single};
use std::collections::VecDeque;

/// Progress of a def through cycle detection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolveState {
    Unvisited,
    Visiting,
    Resolved,
    /// Lies on a reference cycle
    Cyclic,
}

pub struct CycleDetector {
    edges: Vec<Vec<DefId>>,
}

impl CycleDetector {
    pub fn new(table: &SymbolTable<'_>) -> Self {
        let edges = table
            .defs()
            .iter()
            .map(|entry| {
                let mut targets = Vec::new();
                let schema = entry.schema().into_iter();
                // The default of `def N: T = E` is evaluated when N is used.
                let default = entry.default_value().into_iter();
                for expr in schema.chain(default) {
                    unguarded_refs(table, entry.document, expr, &mut targets);
                }
                targets
            })
            .collect();
        Self { edges }
    }

    /// Find every def that lies on a reference cycle.
    ///
    /// Strongly connected components are found with Tarjan's algorithm,
    /// walked without recursion. A component is cyclic when it has more than
    /// one def or a def that refers to itself; all of its defs end up
    /// `Cyclic`, the rest `Resolved`.
    ///
    /// Also returns cycles covering every cyclic def, each the shortest path
    /// from its first def back to itself.
    pub fn run(&self) -> (Vec<ResolveState>, Vec<Vec<DefId>>) {
        let mut walk = Tarjan::new(self.edges.len());

        for root in 0..self.edges.len() {
            if walk.states[root] != ResolveState::Unvisited {
                continue;
            }
            walk.enter(root);
            let mut stack: Vec<(usize, usize)> = vec![(root, 0)];

            while let Some(top) = stack.len().checked_sub(1) {
                let (node, next) = stack[top];
                match self.edges[node].get(next) {
                    Some(&DefId(target)) => {
                        stack[top].1 += 1;
                        if walk.states[target] == ResolveState::Unvisited {
                            walk.enter(target);
                            stack.push((target, 0));
                        } else if walk.on_stack[target] {
                            walk.low[node] = walk.low[node].min(walk.index[target]);
                        }
                    }
                    None => {
                        stack.pop();
                        if let Some(&(parent, _)) = stack.last() {
                            walk.low[parent] = walk.low[parent].min(walk.low[node]);
                        }
                        if walk.low[node] == walk.index[node] {
                            let self_reference = self.edges[node].contains(&DefId(node));
                            walk.close_component(node, self_reference);
                        }
                    }
                }
            }
        }

        let states = walk.states;
        let mut covered = vec![false; states.len()];
        let mut cycles = Vec::new();
        for id in 0..states.len() {
            if states[id] != ResolveState::Cyclic || covered[id] {
                continue;
            }
            if let Some(cycle) = self.cycle_through(DefId(id)) {
                for member in &cycle {
                    covered[member.0] = true;
                }
                cycles.push(cycle);
            }
        }

        (states, cycles)
    }

    /// The shortest reference path from `id` back to itself, starting at `id`.
    pub fn cycle_through(&self, id: DefId) -> Option<Vec<DefId>> {
        let mut parent: Vec<Option<DefId>> = vec![None; self.edges.len()];
        let mut seen = vec![false; self.edges.len()];
        seen[id.0] = true;
        let mut queue = VecDeque::from([id]);

        while let Some(node) = queue.pop_front() {
            for &target in &self.edges[node.0] {
                if target == id {
                    let mut path = vec![node];
                    let mut current = node;
                    while current != id {
                        current = parent[current.0]?;
                        path.push(current);
                    }
                    path.reverse();
                    return Some(path);
                }
                if !seen[target.0] {
                    seen[target.0] = true;
                    parent[target.0] = Some(node);
                    queue.push_back(target);
                }
            }
        }
        None
    }
}

/// Bookkeeping of one Tarjan walk, indexed by def.
struct Tarjan {
    states: Vec<ResolveState>,
    /// Discovery order
    index: Vec<usize>,
    /// Lowest discovery index reachable while the def is on the stack
    low: Vec<usize>,
    on_stack: Vec<bool>,
    stack: Vec<usize>,
    next_index: usize,
}

impl Tarjan {
    fn new(len: usize) -> Self {
        Self {
            states: vec![ResolveState::Unvisited; len],
            index: vec![0; len],
            low: vec![0; len],
            on_stack: vec![false; len],
            stack: Vec::new(),
            next_index: 0,
        }
    }

    fn enter(&mut self, node: usize) {
        self.states[node] = ResolveState::Visiting;
        self.index[node] = self.next_index;
        self.low[node] = self.next_index;
        self.next_index += 1;
        self.stack.push(node);
        self.on_stack[node] = true;
    }

    /// Pop the component rooted at `root` and settle its defs.
    fn close_component(&mut self, root: usize, self_reference: bool) {
        let mut members = Vec::new();
        while let Some(member) = self.stack.pop() {
            self.on_stack[member] = false;
            members.push(member);
            if member == root {
                break;
            }
        }
        let state = if members.len() > 1 || self_reference {
            ResolveState::Cyclic
        } else {
            ResolveState::Resolved
        };
        for member in members {
            self.states[member] = state;
        }
    }
}

fn unguarded_refs(table: &SymbolTable<'_>, doc: DocumentId, expr: &Expr, out: &mut Vec<DefId>) {
    let alternatives: &[Single] = match expr {
        Expr::Union(union) => &union.alternatives,
        Expr::Single(single) => std::slice::from_ref(single),
        Expr::Error(_) => &[],
    };
    for single in alternatives {
        if let Single::Named(named) = single {
            if let Ok(TypeRef::Def(id)) = resolve_type_name(table, doc, named) {
                out.push(id);
            }
        }
    }
}
