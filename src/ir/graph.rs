//! The compute graph container.
//!
//! Owns every node, keyed by id, plus the index from feature name to the
//! node computing it. Node order carries no meaning.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::node::AnyNode;
use super::types::NodeId;
use crate::error::{GraphError, Result};

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "GraphDocument", into = "GraphDocument")]
pub struct ComputeGraph {
    nodes: BTreeMap<NodeId, AnyNode>,
    feature_names: BTreeMap<String, NodeId>,
}

/// Serialized shape of a graph: a node array plus the feature index.
/// Both fields are required; their absence is reported rather than
/// defaulted.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GraphDocument {
    #[serde(default)]
    nodes: Option<Vec<AnyNode>>,
    #[serde(default)]
    feature_names: Option<BTreeMap<String, NodeId>>,
}

impl TryFrom<GraphDocument> for ComputeGraph {
    type Error = GraphError;

    fn try_from(doc: GraphDocument) -> Result<Self> {
        let nodes = doc.nodes.ok_or(GraphError::MissingRequiredField {
            field: "nodes",
            node: None,
        })?;
        let feature_names = doc.feature_names.ok_or(GraphError::MissingRequiredField {
            field: "featureNames",
            node: None,
        })?;
        ComputeGraph::from_parts(nodes, feature_names)
    }
}

impl From<ComputeGraph> for GraphDocument {
    fn from(graph: ComputeGraph) -> Self {
        GraphDocument {
            nodes: Some(graph.nodes.into_values().collect()),
            feature_names: Some(graph.feature_names),
        }
    }
}

impl ComputeGraph {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a graph from a node list and a feature index. Fails on the
    /// first duplicate id. The feature index is taken as given; whether
    /// it is consistent with the nodes is a validation concern.
    pub fn from_parts(
        nodes: impl IntoIterator<Item = AnyNode>,
        feature_names: BTreeMap<String, NodeId>,
    ) -> Result<Self> {
        let mut graph = ComputeGraph::new();
        for node in nodes {
            graph.insert(node)?;
        }
        graph.feature_names = feature_names;
        Ok(graph)
    }

    /// Add a node. Fails with `DuplicateId` and leaves the graph unchanged
    /// if the id is taken.
    pub fn insert(&mut self, node: impl Into<AnyNode>) -> Result<()> {
        let node = node.into();
        let id = node.id();
        if self.nodes.contains_key(&id) {
            return Err(GraphError::DuplicateId(id));
        }
        self.nodes.insert(id, node);
        Ok(())
    }

    pub fn lookup(&self, id: NodeId) -> Result<&AnyNode> {
        self.nodes.get(&id).ok_or(GraphError::NotFound(id))
    }

    pub fn get(&self, id: NodeId) -> Option<&AnyNode> {
        self.nodes.get(&id)
    }

    pub fn contains(&self, id: NodeId) -> bool {
        self.nodes.contains_key(&id)
    }

    /// Bind `name` to `id`. Rebinding a name to the same id is a no-op.
    pub fn index_feature(&mut self, name: impl Into<String>, id: NodeId) -> Result<()> {
        let name = name.into();
        match self.feature_names.get(&name) {
            Some(&existing) if existing != id => Err(GraphError::DuplicateFeatureName {
                name,
                existing,
                requested: id,
            }),
            Some(_) => Ok(()),
            None => {
                self.feature_names.insert(name, id);
                Ok(())
            }
        }
    }

    /// All nodes. Every call starts a fresh pass; the order is unspecified.
    pub fn nodes(&self) -> impl Iterator<Item = &AnyNode> + '_ {
        self.nodes.values()
    }

    pub fn node_ids(&self) -> impl Iterator<Item = NodeId> + '_ {
        self.nodes.keys().copied()
    }

    pub fn feature_names(&self) -> &BTreeMap<String, NodeId> {
        &self.feature_names
    }

    /// The node indexed under a feature name.
    pub fn feature_node(&self, name: &str) -> Option<&AnyNode> {
        self.feature_names
            .get(name)
            .and_then(|id| self.nodes.get(id))
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub(crate) fn nodes_mut(&mut self) -> impl Iterator<Item = &mut AnyNode> + '_ {
        self.nodes.values_mut()
    }

    pub(crate) fn feature_names_mut(&mut self) -> &mut BTreeMap<String, NodeId> {
        &mut self.feature_names
    }

    pub(crate) fn remove(&mut self, id: NodeId) -> Option<AnyNode> {
        self.nodes.remove(&id)
    }
}
