//! Cycle detection over reference edges.
//!
//! Three-colour depth-first search. A back edge to a gray node closes a
//! cycle; the gray path from that node to the current one is reported in
//! evaluation-dependency order. The traversal keeps an explicit stack so
//! deep graphs do not exhaust the call stack.

use std::collections::{BTreeSet, HashMap};

use crate::error::GraphError;
use crate::ir::NodeId;
use crate::parse::graph::DependencyGraph;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Color {
    White,
    Gray,
    Black,
}

pub fn validate_acyclic(deps: &DependencyGraph, errors: &mut Vec<GraphError>) {
    for cycle in find_cycles(deps) {
        errors.push(GraphError::CycleDetected(cycle));
    }
}

/// Every distinct cycle closed by a back edge, each starting at the node
/// the search entered it through.
pub fn find_cycles(deps: &DependencyGraph) -> Vec<Vec<NodeId>> {
    let roots: BTreeSet<NodeId> = deps.node_indices.keys().copied().collect();
    let mut color: HashMap<NodeId, Color> = roots.iter().map(|&id| (id, Color::White)).collect();
    let mut seen = BTreeSet::new();
    let mut cycles = Vec::new();

    for &root in &roots {
        if color[&root] != Color::White {
            continue;
        }

        color.insert(root, Color::Gray);
        let mut stack: Vec<(NodeId, Vec<NodeId>, usize)> = vec![(root, deps.dependencies(root), 0)];

        while let Some((node, children, next)) = stack.last_mut() {
            if *next < children.len() {
                let child = children[*next];
                *next += 1;
                match color[&child] {
                    Color::White => {
                        color.insert(child, Color::Gray);
                        stack.push((child, deps.dependencies(child), 0));
                    }
                    Color::Gray => {
                        let Some(start) = stack.iter().position(|(n, _, _)| *n == child) else {
                            continue;
                        };
                        let cycle: Vec<NodeId> = stack[start..].iter().map(|(n, _, _)| *n).collect();
                        if seen.insert(canonical(&cycle)) {
                            cycles.push(cycle);
                        }
                    }
                    Color::Black => {}
                }
            } else {
                let done = *node;
                color.insert(done, Color::Black);
                stack.pop();
            }
        }
    }

    cycles
}

/// Rotation of a cycle starting at its smallest id.
fn canonical(cycle: &[NodeId]) -> Vec<NodeId> {
    let start = cycle
        .iter()
        .enumerate()
        .min_by_key(|(_, id)| **id)
        .map(|(i, _)| i)
        .unwrap_or(0);
    cycle[start..].iter().chain(&cycle[..start]).copied().collect()
}
