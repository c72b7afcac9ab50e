//! Key arity propagation and key position bounds.
//!
//! A node's key arity is the length of its concrete key. A node without
//! one inherits the widest key among the nodes it references,
//! transitively, so the order its inputs are listed in does not matter.
//! Data sources and placeholders without a concrete key have no known
//! arity.
//!
//! Two checks use the arities:
//! - every key position a node holds (in its node references and in bare
//!   lookup key entries) indexes the node's own key array and must fall
//!   inside it; negative positions are rejected even when the arity is
//!   unknown;
//! - a node reference binds one position per key slot of its target, so
//!   its `keyReference` length must equal the target's arity when known.

use std::collections::{HashMap, HashSet};

use crate::error::GraphError;
use crate::ir::{ComputeGraph, NodeId};

pub fn validate_key_references(graph: &ComputeGraph, errors: &mut Vec<GraphError>) {
    let arities = key_arities(graph);
    let arity = |id: NodeId| arities.get(&id).copied().flatten();

    for node in graph.nodes() {
        let own = arity(node.id());
        for (field, key) in node.own_key_positions() {
            let in_bounds = match own {
                Some(n) => key.fits(n),
                None => key.position >= 0,
            };
            if !in_bounds {
                errors.push(GraphError::KeyReferenceOutOfBounds {
                    node: node.id(),
                    field,
                    position: key.position,
                    arity: own,
                });
            }
        }

        for (field, reference) in node.node_references() {
            // Dangling targets are reported by the reference rules.
            let Some(expected) = arity(reference.id) else {
                continue;
            };
            if reference.key_reference.len() != expected {
                errors.push(GraphError::KeyArityMismatch {
                    node: node.id(),
                    field,
                    target: reference.id,
                    expected,
                    found: reference.key_reference.len(),
                });
            }
        }
    }
}

/// Key arity of every node in the graph; `None` where it cannot be
/// determined.
pub fn key_arities(graph: &ComputeGraph) -> HashMap<NodeId, Option<usize>> {
    let mut memo = HashMap::with_capacity(graph.len());
    let mut visiting = HashSet::new();
    for id in graph.node_ids() {
        arity_of(graph, id, &mut memo, &mut visiting);
    }
    memo
}

fn arity_of(
    graph: &ComputeGraph,
    id: NodeId,
    memo: &mut HashMap<NodeId, Option<usize>>,
    visiting: &mut HashSet<NodeId>,
) -> Option<usize> {
    if let Some(&arity) = memo.get(&id) {
        return arity;
    }
    let node = graph.get(id)?;
    // Inheritance loops back on itself: leave it to cycle detection.
    if !visiting.insert(id) {
        return None;
    }

    let arity = match node.concrete_key() {
        Some(key) => Some(key.arity()),
        None => node
            .node_references()
            .into_iter()
            .filter_map(|(_, reference)| arity_of(graph, reference.id, memo, visiting))
            .max(),
    };

    visiting.remove(&id);
    memo.insert(id, arity);
    arity
}
