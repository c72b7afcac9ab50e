//! Value types shared by the compute graph nodes.
//!
//! These mirror the feature-definition data model: ids, operator handles,
//! feature versions with their tensor formats, and the data source
//! descriptors. None of them carry behavior beyond construction helpers;
//! interpretation belongs to the execution engine.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Identifier of a node, unique within one graph.
///
/// Assigned by the graph producer. Treated as an opaque key: ids may be
/// sparse and carry no ordering meaning.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NodeId(pub i32);

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<i32> for NodeId {
    fn from(id: i32) -> Self {
        NodeId(id)
    }
}

/// Operator handle. Refers to an MVEL expression, a SQL expression or a UDF;
/// the core never interprets it.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct OperatorId(pub String);

impl OperatorId {
    pub fn new(operator: impl Into<String>) -> Self {
        OperatorId(operator.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for OperatorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// FUNCTIONS
// =============================================================================

/// Aggregation operator plus its free-form parameters
/// (`target_column`, `window_size`, `filter`, `groupBy`, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregationFunction {
    pub operator: OperatorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

/// Transformation operator plus its parameters (an MVEL expression, a UDF
/// class name, ...).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TransformationFunction {
    pub operator: OperatorId,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parameters: Option<BTreeMap<String, String>>,
}

impl AggregationFunction {
    pub fn new(operator: impl Into<String>) -> Self {
        AggregationFunction {
            operator: OperatorId::new(operator),
            parameters: None,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

impl TransformationFunction {
    pub fn new(operator: impl Into<String>) -> Self {
        TransformationFunction {
            operator: OperatorId::new(operator),
            parameters: None,
        }
    }

    pub fn with_parameter(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.parameters
            .get_or_insert_with(BTreeMap::new)
            .insert(key.into(), value.into());
        self
    }
}

// =============================================================================
// FEATURE VERSION
// =============================================================================

/// Version metadata attached to every node that computes a feature.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeatureVersion {
    #[serde(rename = "type", default)]
    pub feature_type: FrameFeatureType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub format: Option<TensorFeatureFormat>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_value: Option<FeatureValue>,
}

impl FeatureVersion {
    pub fn of(feature_type: FrameFeatureType) -> Self {
        FeatureVersion {
            feature_type,
            format: None,
            default_value: None,
        }
    }
}

/// High level semantic type of a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FrameFeatureType {
    Boolean,
    Numeric,
    Categorical,
    CategoricalSet,
    DenseVector,
    TermVector,
    Tensor,
    #[default]
    Unspecified,
}

/// Tensor layout of the feature data. The last column is the value, the
/// rest are dimensions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TensorFeatureFormat {
    pub tensor_category: TensorCategory,
    pub value_type: ValueType,
    pub dimensions: Vec<Dimension>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TensorCategory {
    Dense,
    Sparse,
    Ragged,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ValueType {
    Int,
    Long,
    Float,
    Double,
    String,
    Boolean,
    Bytes,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Dimension {
    #[serde(rename = "type")]
    pub dimension_type: DimensionType,
    /// Unset means the size is only known at runtime.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub shape: Option<i32>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DimensionType {
    Long,
    Int,
    String,
    Boolean,
}

/// Scalar default value for a feature. Closed over the primitive types.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FeatureValue {
    Boolean(bool),
    Int(i32),
    Long(i64),
    Float(f32),
    Double(f64),
    String(String),
    Bytes(Vec<u8>),
}

// =============================================================================
// DATA SOURCES
// =============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum DataSourceType {
    /// Keyed, non time-partitioned data (snapshot plus update log).
    Update,
    /// Append-only, time-partitioned event log.
    Event,
    /// Observation data entities: join keys and passthrough columns.
    Context,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum KeyExpressionType {
    Mvel,
    Sql,
    Udf,
}

/// Timestamp column of an event source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimestampCol {
    pub expression: String,
    /// e.g. `yyyy/MM/dd`, `epoch`, `epoch_millis`.
    pub format: String,
}
