//! The node variant model.
//!
//! [`AnyNode`] is closed over five variants. Each variant carries the
//! shared base fields (`id`, `concreteKey`) inline; there is no common
//! supertype to extend. A node's identity is its id: the graph container
//! keys on it, so two nodes with equal content but different ids are
//! distinct nodes.

use std::fmt;

use serde::{Deserialize, Serialize};

use super::reference::{ConcreteKey, KeyReference, LookupKeyPart, NodeReference};
use super::types::*;

// =============================================================================
// ANY NODE: tagged union over the five node kinds
// =============================================================================

/// Serialized as a union keyed by the member name, e.g.
/// `{"Transformation": {"id": 3, ...}}`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum AnyNode {
    DataSource(DataSource),
    Aggregation(Aggregation),
    Lookup(Lookup),
    Transformation(Transformation),
    External(External),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum NodeKind {
    DataSource,
    Aggregation,
    Lookup,
    Transformation,
    External,
}

impl fmt::Display for NodeKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NodeKind::DataSource => write!(f, "DataSource"),
            NodeKind::Aggregation => write!(f, "Aggregation"),
            NodeKind::Lookup => write!(f, "Lookup"),
            NodeKind::Transformation => write!(f, "Transformation"),
            NodeKind::External => write!(f, "External"),
        }
    }
}

// =============================================================================
// VARIANTS
// =============================================================================

/// Context, update or event data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DataSource {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_key: Option<ConcreteKey>,
    pub source_type: DataSourceType,
    /// Column name for CONTEXT sources, otherwise a path or URI.
    pub external_source_ref: String,
    /// Raw key expression; parsed by the execution engine.
    pub key_expression: String,
    pub key_expression_type: KeyExpressionType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub file_partition_format: Option<String>,
    /// Required for EVENT sources only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp_column_info: Option<TimestampCol>,
}

/// Windowed aggregation over a data source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Aggregation {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_key: Option<ConcreteKey>,
    /// Must reference a DataSource.
    pub input: NodeReference,
    pub function: AggregationFunction,
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub feature_version: FeatureVersion,
}

/// Sequential join: computes `lookupKey`, then fetches the expansion
/// feature computed by `lookupNode` under that key.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Lookup {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_key: Option<ConcreteKey>,
    pub lookup_key: Vec<LookupKeyPart>,
    pub lookup_node: NodeId,
    /// How multiple lookup results combine (UNION, SUM, ...). Opaque here.
    pub aggregation: String,
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub feature_version: FeatureVersion,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transformation {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_key: Option<ConcreteKey>,
    pub inputs: Vec<NodeReference>,
    pub function: TransformationFunction,
    #[serde(default)]
    pub feature_name: String,
    #[serde(default)]
    pub feature_version: FeatureVersion,
}

/// Placeholder for a feature referenced by name before its defining node
/// is linked. Must not survive resolution.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct External {
    pub id: NodeId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub concrete_key: Option<ConcreteKey>,
    pub name: String,
}

// =============================================================================
// VARIANT CONSTRUCTORS
// =============================================================================

impl DataSource {
    /// A CONTEXT source reading the observation column `column`.
    pub fn context(id: impl Into<NodeId>, column: impl Into<String>) -> Self {
        let column = column.into();
        DataSource {
            id: id.into(),
            concrete_key: None,
            source_type: DataSourceType::Context,
            key_expression: column.clone(),
            external_source_ref: column,
            key_expression_type: KeyExpressionType::Mvel,
            file_partition_format: None,
            timestamp_column_info: None,
        }
    }

    pub fn update(
        id: impl Into<NodeId>,
        path: impl Into<String>,
        key_expression: impl Into<String>,
    ) -> Self {
        DataSource {
            id: id.into(),
            concrete_key: None,
            source_type: DataSourceType::Update,
            external_source_ref: path.into(),
            key_expression: key_expression.into(),
            key_expression_type: KeyExpressionType::Mvel,
            file_partition_format: None,
            timestamp_column_info: None,
        }
    }

    pub fn event(
        id: impl Into<NodeId>,
        path: impl Into<String>,
        key_expression: impl Into<String>,
        timestamp: TimestampCol,
    ) -> Self {
        DataSource {
            id: id.into(),
            concrete_key: None,
            source_type: DataSourceType::Event,
            external_source_ref: path.into(),
            key_expression: key_expression.into(),
            key_expression_type: KeyExpressionType::Sql,
            file_partition_format: None,
            timestamp_column_info: Some(timestamp),
        }
    }
}

impl Aggregation {
    pub fn new(
        id: impl Into<NodeId>,
        feature_name: impl Into<String>,
        input: NodeReference,
        function: AggregationFunction,
    ) -> Self {
        Aggregation {
            id: id.into(),
            concrete_key: None,
            input,
            function,
            feature_name: feature_name.into(),
            feature_version: FeatureVersion::default(),
        }
    }
}

impl Lookup {
    pub fn new(
        id: impl Into<NodeId>,
        feature_name: impl Into<String>,
        lookup_key: Vec<LookupKeyPart>,
        lookup_node: impl Into<NodeId>,
        aggregation: impl Into<String>,
    ) -> Self {
        Lookup {
            id: id.into(),
            concrete_key: None,
            lookup_key,
            lookup_node: lookup_node.into(),
            aggregation: aggregation.into(),
            feature_name: feature_name.into(),
            feature_version: FeatureVersion::default(),
        }
    }
}

impl Transformation {
    pub fn new(
        id: impl Into<NodeId>,
        feature_name: impl Into<String>,
        inputs: Vec<NodeReference>,
        function: TransformationFunction,
    ) -> Self {
        Transformation {
            id: id.into(),
            concrete_key: None,
            inputs,
            function,
            feature_name: feature_name.into(),
            feature_version: FeatureVersion::default(),
        }
    }
}

impl External {
    pub fn new(id: impl Into<NodeId>, name: impl Into<String>) -> Self {
        External {
            id: id.into(),
            concrete_key: None,
            name: name.into(),
        }
    }
}

macro_rules! impl_from_variant {
    ($($variant:ident),*) => {
        $(
            impl From<$variant> for AnyNode {
                fn from(node: $variant) -> Self {
                    AnyNode::$variant(node)
                }
            }
        )*
    };
}

impl_from_variant!(DataSource, Aggregation, Lookup, Transformation, External);

// =============================================================================
// ACCESSORS
// =============================================================================

impl AnyNode {
    pub fn id(&self) -> NodeId {
        match self {
            AnyNode::DataSource(n) => n.id,
            AnyNode::Aggregation(n) => n.id,
            AnyNode::Lookup(n) => n.id,
            AnyNode::Transformation(n) => n.id,
            AnyNode::External(n) => n.id,
        }
    }

    pub fn kind(&self) -> NodeKind {
        match self {
            AnyNode::DataSource(_) => NodeKind::DataSource,
            AnyNode::Aggregation(_) => NodeKind::Aggregation,
            AnyNode::Lookup(_) => NodeKind::Lookup,
            AnyNode::Transformation(_) => NodeKind::Transformation,
            AnyNode::External(_) => NodeKind::External,
        }
    }

    pub fn concrete_key(&self) -> Option<&ConcreteKey> {
        match self {
            AnyNode::DataSource(n) => n.concrete_key.as_ref(),
            AnyNode::Aggregation(n) => n.concrete_key.as_ref(),
            AnyNode::Lookup(n) => n.concrete_key.as_ref(),
            AnyNode::Transformation(n) => n.concrete_key.as_ref(),
            AnyNode::External(n) => n.concrete_key.as_ref(),
        }
    }

    pub(crate) fn concrete_key_mut(&mut self) -> Option<&mut ConcreteKey> {
        match self {
            AnyNode::DataSource(n) => n.concrete_key.as_mut(),
            AnyNode::Aggregation(n) => n.concrete_key.as_mut(),
            AnyNode::Lookup(n) => n.concrete_key.as_mut(),
            AnyNode::Transformation(n) => n.concrete_key.as_mut(),
            AnyNode::External(n) => n.concrete_key.as_mut(),
        }
    }

    /// Sets the concrete key, replacing any existing one.
    pub fn with_concrete_key(mut self, key: ConcreteKey) -> Self {
        match &mut self {
            AnyNode::DataSource(n) => n.concrete_key = Some(key),
            AnyNode::Aggregation(n) => n.concrete_key = Some(key),
            AnyNode::Lookup(n) => n.concrete_key = Some(key),
            AnyNode::Transformation(n) => n.concrete_key = Some(key),
            AnyNode::External(n) => n.concrete_key = Some(key),
        }
        self
    }

    /// Whether this variant represents a named feature.
    pub fn is_feature(&self) -> bool {
        matches!(
            self,
            AnyNode::Aggregation(_) | AnyNode::Lookup(_) | AnyNode::Transformation(_)
        )
    }

    /// The declared feature name. Empty names count as absent.
    pub fn feature_name(&self) -> Option<&str> {
        let name = match self {
            AnyNode::Aggregation(n) => &n.feature_name,
            AnyNode::Lookup(n) => &n.feature_name,
            AnyNode::Transformation(n) => &n.feature_name,
            AnyNode::DataSource(_) | AnyNode::External(_) => return None,
        };
        (!name.is_empty()).then_some(name.as_str())
    }

    pub fn feature_version(&self) -> Option<&FeatureVersion> {
        match self {
            AnyNode::Aggregation(n) => Some(&n.feature_version),
            AnyNode::Lookup(n) => Some(&n.feature_version),
            AnyNode::Transformation(n) => Some(&n.feature_version),
            AnyNode::DataSource(_) | AnyNode::External(_) => None,
        }
    }

    /// Every node reference held by this node, labelled with its field.
    pub fn node_references(&self) -> Vec<(&'static str, &NodeReference)> {
        match self {
            AnyNode::Aggregation(n) => vec![("input", &n.input)],
            AnyNode::Transformation(n) => n.inputs.iter().map(|r| ("inputs", r)).collect(),
            AnyNode::Lookup(n) => n
                .lookup_key
                .iter()
                .filter_map(LookupKeyPart::node_reference)
                .map(|r| ("lookupKey", r))
                .collect(),
            AnyNode::DataSource(_) | AnyNode::External(_) => vec![],
        }
    }

    /// Ids this node needs evaluated first: reference targets plus the
    /// lookup node. Concrete key entries are not evaluation dependencies.
    pub fn dependencies(&self) -> Vec<NodeId> {
        let mut deps: Vec<NodeId> = self.node_references().iter().map(|(_, r)| r.id).collect();
        if let AnyNode::Lookup(n) = self {
            deps.push(n.lookup_node);
        }
        deps
    }

    /// Key positions that index into this node's own key array.
    pub fn own_key_positions(&self) -> Vec<(&'static str, KeyReference)> {
        let mut positions: Vec<(&'static str, KeyReference)> = self
            .node_references()
            .into_iter()
            .flat_map(|(field, r)| r.key_reference.iter().map(move |k| (field, *k)))
            .collect();
        if let AnyNode::Lookup(n) = self {
            for part in &n.lookup_key {
                if let LookupKeyPart::KeyReference(k) = part {
                    positions.push(("lookupKey", *k));
                }
            }
        }
        positions
    }
}
