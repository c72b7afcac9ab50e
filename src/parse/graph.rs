//! petgraph-based view of the reference edges in a compute graph.
//!
//! An edge `a -> b` means node `a` consumes node `b` (through a node
//! reference or as its lookup node). Concrete key entries are not edges.
//! References to ids missing from the graph are left out; the validator
//! reports them on its own.

use std::collections::{BTreeSet, HashMap};

use petgraph::Direction;
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::Bfs;

use crate::error::GraphError;
use crate::ir::{AnyNode, ComputeGraph, NodeId};
use crate::validate::cycle::find_cycles;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EdgeKind {
    /// A `NodeReference` in `input`, `inputs` or `lookupKey`.
    Reference,
    /// A Lookup's `lookupNode`.
    LookupNode,
}

pub struct DependencyGraph {
    pub graph: DiGraph<NodeId, EdgeKind>,
    pub node_indices: HashMap<NodeId, NodeIndex>,
}

impl DependencyGraph {
    pub fn build(compute: &ComputeGraph) -> Self {
        let mut graph = DiGraph::with_capacity(compute.len(), compute.len());
        let mut node_indices = HashMap::with_capacity(compute.len());

        for id in compute.node_ids() {
            let idx = graph.add_node(id);
            node_indices.insert(id, idx);
        }

        for node in compute.nodes() {
            let source = node_indices[&node.id()];
            for (_, reference) in node.node_references() {
                if let Some(&target) = node_indices.get(&reference.id) {
                    graph.add_edge(source, target, EdgeKind::Reference);
                }
            }
            if let AnyNode::Lookup(lookup) = node {
                if let Some(&target) = node_indices.get(&lookup.lookup_node) {
                    graph.add_edge(source, target, EdgeKind::LookupNode);
                }
            }
        }

        DependencyGraph {
            graph,
            node_indices,
        }
    }

    /// Direct dependencies of `id`, ascending and deduplicated.
    pub fn dependencies(&self, id: NodeId) -> Vec<NodeId> {
        let Some(&idx) = self.node_indices.get(&id) else {
            return vec![];
        };
        self.graph
            .neighbors_directed(idx, Direction::Outgoing)
            .map(|n| self.graph[n])
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// True when `to` is `from` or is transitively consumed by it.
    pub fn reaches(&self, from: NodeId, to: NodeId) -> bool {
        let (Some(&start), Some(&goal)) = (self.node_indices.get(&from), self.node_indices.get(&to))
        else {
            return false;
        };
        let mut bfs = Bfs::new(&self.graph, start);
        while let Some(nx) = bfs.next(&self.graph) {
            if nx == goal {
                return true;
            }
        }
        false
    }

    /// Node ids with every dependency ahead of its dependents. A cyclic
    /// graph yields `CycleDetected` carrying the first full cycle found.
    pub fn evaluation_order(&self) -> Result<Vec<NodeId>, GraphError> {
        match toposort(&self.graph, None) {
            Ok(indices) => Ok(indices.into_iter().rev().map(|idx| self.graph[idx]).collect()),
            Err(cycle) => {
                let at = self.graph[cycle.node_id()];
                let full = find_cycles(self).into_iter().next().unwrap_or_else(|| vec![at]);
                Err(GraphError::CycleDetected(full))
            }
        }
    }
}
