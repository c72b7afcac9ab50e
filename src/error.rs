//! Unified error type used by the container, resolver and validator.

use thiserror::Error;

use crate::ir::{NodeId, NodeKind};

/// Type alias for results of single-error operations.
pub type Result<T> = std::result::Result<T, GraphError>;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Load,
    Build,
    Resolve,
    Validate,
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Phase::Load => write!(f, "Load"),
            Phase::Build => write!(f, "Build"),
            Phase::Resolve => write!(f, "Resolve"),
            Phase::Validate => write!(f, "Validate"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GraphError {
    #[error("node id {0} is already present in the graph")]
    DuplicateId(NodeId),

    #[error("feature '{name}' is bound to node {existing}, cannot rebind it to node {requested}")]
    DuplicateFeatureName {
        name: String,
        existing: NodeId,
        requested: NodeId,
    },

    #[error("node {0} not found")]
    NotFound(NodeId),

    #[error("node {node} references node {target} through '{field}', but no such node exists")]
    DanglingReference {
        node: NodeId,
        field: &'static str,
        target: NodeId,
    },

    #[error("no binding for name '{name}' (placeholder node {node})")]
    UnresolvedReference { name: String, node: NodeId },

    #[error("missing required field '{field}'{}", .node.map(|n| format!(" on node {}", n)).unwrap_or_default())]
    MissingRequiredField {
        field: &'static str,
        node: Option<NodeId>,
    },

    #[error("node {node} uses key position {position} through '{field}', outside its key ({})", format_arity(.arity))]
    KeyReferenceOutOfBounds {
        node: NodeId,
        field: &'static str,
        position: i32,
        /// `None` when the node's key arity cannot be determined.
        arity: Option<usize>,
    },

    #[error("node {node} binds {found} key slot(s) of node {target} through '{field}', which is keyed by {expected}")]
    KeyArityMismatch {
        node: NodeId,
        field: &'static str,
        target: NodeId,
        expected: usize,
        found: usize,
    },

    #[error("reference cycle: {}", format_cycle(.0))]
    CycleDetected(Vec<NodeId>),

    #[error("feature '{name}' is indexed to node {node}, which is a {kind} and cannot represent a feature")]
    InvalidVariantForFeatureName {
        name: String,
        node: NodeId,
        kind: NodeKind,
    },

    #[error("feature '{name}' is indexed to node {node}, which declares feature name '{declared}'")]
    FeatureNameMismatch {
        name: String,
        node: NodeId,
        declared: String,
    },

    #[error("feature '{name}' is indexed to node {node}, which is not in the graph")]
    UnknownFeatureNode { name: String, node: NodeId },

    #[error("placeholder node {node} for '{name}' was never resolved")]
    ExternalNodeRemaining { node: NodeId, name: String },

    #[error("aggregation node {node} takes its input from node {input}, a {kind}; expected a DataSource")]
    InvalidAggregationInput {
        node: NodeId,
        input: NodeId,
        kind: NodeKind,
    },

    #[error("event source node {0} has no timestamp column")]
    MissingTimestampColumn(NodeId),

    #[error("node {node} is keyed by node {key}, which is neither a context source nor one of its inputs")]
    UnreachableConcreteKey { node: NodeId, key: NodeId },

    #[error("malformed graph document: {0}")]
    Malformed(String),
}

fn format_arity(arity: &Option<usize>) -> String {
    match arity {
        Some(n) => format!("{} slot(s)", n),
        None => "arity unknown".into(),
    }
}

fn format_cycle(ids: &[NodeId]) -> String {
    let mut parts: Vec<String> = ids.iter().map(|id| id.to_string()).collect();
    if let Some(first) = ids.first() {
        parts.push(first.to_string());
    }
    parts.join(" -> ")
}

impl GraphError {
    /// Stable diagnostic code.
    pub fn code(&self) -> &'static str {
        match self {
            GraphError::DuplicateId(_) => "G001",
            GraphError::DuplicateFeatureName { .. } => "G002",
            GraphError::NotFound(_) => "G003",
            GraphError::DanglingReference { .. } => "G004",
            GraphError::UnresolvedReference { .. } => "G005",
            GraphError::MissingRequiredField { .. } => "G006",
            GraphError::KeyReferenceOutOfBounds { .. } => "G007",
            GraphError::CycleDetected(_) => "G008",
            GraphError::InvalidVariantForFeatureName { .. } => "G009",
            GraphError::FeatureNameMismatch { .. } => "G010",
            GraphError::UnknownFeatureNode { .. } => "G011",
            GraphError::ExternalNodeRemaining { .. } => "G012",
            GraphError::InvalidAggregationInput { .. } => "G013",
            GraphError::MissingTimestampColumn(_) => "G014",
            GraphError::UnreachableConcreteKey { .. } => "G015",
            GraphError::Malformed(_) => "G016",
            GraphError::KeyArityMismatch { .. } => "G017",
        }
    }

    pub fn phase(&self) -> Phase {
        match self {
            GraphError::Malformed(_) | GraphError::MissingRequiredField { .. } => Phase::Load,
            GraphError::DuplicateId(_)
            | GraphError::DuplicateFeatureName { .. }
            | GraphError::NotFound(_) => Phase::Build,
            GraphError::UnresolvedReference { .. } => Phase::Resolve,
            _ => Phase::Validate,
        }
    }

    /// The node the diagnostic is about, if it concerns a single node.
    pub fn node_id(&self) -> Option<NodeId> {
        match self {
            GraphError::DuplicateId(id)
            | GraphError::NotFound(id)
            | GraphError::MissingTimestampColumn(id) => Some(*id),
            GraphError::DuplicateFeatureName { requested, .. } => Some(*requested),
            GraphError::DanglingReference { node, .. }
            | GraphError::UnresolvedReference { node, .. }
            | GraphError::KeyReferenceOutOfBounds { node, .. }
            | GraphError::KeyArityMismatch { node, .. }
            | GraphError::InvalidVariantForFeatureName { node, .. }
            | GraphError::FeatureNameMismatch { node, .. }
            | GraphError::UnknownFeatureNode { node, .. }
            | GraphError::ExternalNodeRemaining { node, .. }
            | GraphError::InvalidAggregationInput { node, .. }
            | GraphError::UnreachableConcreteKey { node, .. } => Some(*node),
            GraphError::MissingRequiredField { node, .. } => *node,
            GraphError::CycleDetected(ids) => ids.first().copied(),
            GraphError::Malformed(_) => None,
        }
    }
}
