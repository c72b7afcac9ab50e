//! Reference rewriting: swaps placeholder ids for their resolved targets.

use std::collections::BTreeMap;

use crate::ir::{AnyNode, LookupKeyPart, NodeId};

use super::TRACING_TARGET;

/// Rewrite every id slot of `node` that names a substituted placeholder:
/// node reference targets, the lookup node, and concrete key entries.
/// Returns the number of slots changed.
pub(crate) fn rewrite_node(node: &mut AnyNode, substitutions: &BTreeMap<NodeId, NodeId>) -> usize {
    let owner = node.id();
    let mut count = 0;
    let mut swap = |field: &'static str, id: &mut NodeId| {
        if let Some(&target) = substitutions.get(&*id) {
            tracing::trace!(
                target: TRACING_TARGET,
                node = %owner,
                field,
                from = %id,
                to = %target,
                "Rewrote placeholder reference"
            );
            *id = target;
            count += 1;
        }
    };

    match node {
        AnyNode::Aggregation(n) => swap("input", &mut n.input.id),
        AnyNode::Transformation(n) => {
            for input in &mut n.inputs {
                swap("inputs", &mut input.id);
            }
        }
        AnyNode::Lookup(n) => {
            for part in &mut n.lookup_key {
                if let LookupKeyPart::NodeReference(r) = part {
                    swap("lookupKey", &mut r.id);
                }
            }
            swap("lookupNode", &mut n.lookup_node);
        }
        AnyNode::DataSource(_) | AnyNode::External(_) => {}
    }

    if let Some(key) = node.concrete_key_mut() {
        for id in &mut key.key {
            swap("concreteKey", id);
        }
    }

    count
}
