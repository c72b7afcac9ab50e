//! Load phase: JSON document → `ComputeGraph`, and back.

pub mod graph;

pub use graph::DependencyGraph;

use std::collections::BTreeMap;

use serde::Deserialize;
use serde_json::Value;

use crate::error::GraphError;
use crate::ir::{AnyNode, ComputeGraph, NodeId};

/// Load-side document shape. Nodes stay as raw JSON until their required
/// fields have been checked, so a gap is reported with the node it is on.
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct RawDocument {
    #[serde(default)]
    nodes: Option<Vec<Value>>,
    #[serde(default)]
    feature_names: Option<BTreeMap<String, NodeId>>,
}

/// Deserialize a compute graph document.
///
/// A document without `nodes` or `featureNames`, or a node without one of
/// its variant's required fields, is rejected with `MissingRequiredField`;
/// repeated node ids with `DuplicateId`.
pub fn parse(json: &str) -> Result<ComputeGraph, GraphError> {
    let value: Value = serde_json::from_str(json).map_err(malformed)?;
    from_value(value)
}

/// Same as [`parse`], for an already decoded JSON value.
pub fn from_value(value: Value) -> Result<ComputeGraph, GraphError> {
    let doc: RawDocument = serde_json::from_value(value).map_err(malformed)?;
    let raw_nodes = doc.nodes.ok_or(GraphError::MissingRequiredField {
        field: "nodes",
        node: None,
    })?;
    let feature_names = doc.feature_names.ok_or(GraphError::MissingRequiredField {
        field: "featureNames",
        node: None,
    })?;

    let mut nodes = Vec::with_capacity(raw_nodes.len());
    for raw in raw_nodes {
        check_required_fields(&raw)?;
        nodes.push(serde_json::from_value::<AnyNode>(raw).map_err(malformed)?);
    }
    ComputeGraph::from_parts(nodes, feature_names)
}

/// Serialize a graph back into its document form.
pub fn to_json(graph: &ComputeGraph) -> Result<String, GraphError> {
    serde_json::to_string_pretty(graph).map_err(malformed)
}

fn malformed(e: serde_json::Error) -> GraphError {
    GraphError::Malformed(e.to_string())
}

/// Fields each node variant cannot do without.
fn required_fields(variant: &str) -> Option<&'static [&'static str]> {
    let fields: &'static [&'static str] = match variant {
        "DataSource" => &[
            "id",
            "sourceType",
            "externalSourceRef",
            "keyExpression",
            "keyExpressionType",
        ],
        "Aggregation" => &["id", "input", "function"],
        "Lookup" => &["id", "lookupKey", "lookupNode", "aggregation"],
        "Transformation" => &["id", "inputs", "function"],
        "External" => &["id", "name"],
        _ => return None,
    };
    Some(fields)
}

/// Unknown variants and non-object bodies are left for serde to reject.
fn check_required_fields(raw: &Value) -> Result<(), GraphError> {
    let Some((variant, body)) = raw
        .as_object()
        .filter(|o| o.len() == 1)
        .and_then(|o| o.iter().next())
    else {
        return Ok(());
    };
    let (Some(required), Some(body)) = (required_fields(variant), body.as_object()) else {
        return Ok(());
    };

    let node = body
        .get("id")
        .and_then(Value::as_i64)
        .and_then(|id| i32::try_from(id).ok())
        .map(NodeId);
    for &field in required {
        if body.get(field).is_none_or(Value::is_null) {
            return Err(GraphError::MissingRequiredField { field, node });
        }
    }
    Ok(())
}
