//! WASM entry points for browser use.

use std::collections::BTreeMap;

use wasm_bindgen::prelude::*;

use crate::error::GraphError;
use crate::ir::NodeId;
use crate::resolve::NoBindings;

/// Validate a compute graph JSON document as-is (no resolution).
/// Returns a JSON array of error objects.
#[wasm_bindgen]
pub fn validate_compute_graph(json: &str) -> JsValue {
    let result = validate_compute_graph_inner(json);
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn validate_compute_graph_inner(json: &str) -> Vec<ErrorDto> {
    let graph = match crate::parse::parse(json) {
        Ok(g) => g,
        Err(e) => return vec![ErrorDto::from(e)],
    };

    crate::validate::validate_graph(&graph)
        .into_iter()
        .map(ErrorDto::from)
        .collect()
}

/// Resolve placeholders and validate. `bindings_json` is an optional JSON
/// object mapping feature names to node ids in other graphs.
/// Returns `{status: "success", graph}` or `{status: "errors", errors}`.
#[wasm_bindgen]
pub fn resolve_compute_graph(json: &str, bindings_json: Option<String>) -> JsValue {
    let result = resolve_compute_graph_inner(json, bindings_json.as_deref());
    serde_wasm_bindgen::to_value(&result).unwrap_or(JsValue::NULL)
}

fn resolve_compute_graph_inner(json: &str, bindings_json: Option<&str>) -> ResolveResult {
    let bindings: Option<BTreeMap<String, NodeId>> = match bindings_json {
        Some(raw) => match serde_json::from_str(raw) {
            Ok(b) => Some(b),
            Err(e) => {
                return ResolveResult::Errors {
                    errors: vec![ErrorDto::from(GraphError::Malformed(format!(
                        "bindings: {}",
                        e
                    )))],
                };
            }
        },
        None => None,
    };

    let prepared = match &bindings {
        Some(b) => crate::pipeline::prepare_json(json, b),
        None => crate::pipeline::prepare_json(json, &NoBindings),
    };

    match prepared.and_then(|p| {
        serde_json::to_value(&p.graph)
            .map_err(|e| vec![GraphError::Malformed(e.to_string())])
    }) {
        Ok(graph) => ResolveResult::Success { graph },
        Err(errors) => ResolveResult::Errors {
            errors: errors.into_iter().map(ErrorDto::from).collect(),
        },
    }
}

// ---------------------------------------------------------------------------
// DTOs for serialization to JS
// ---------------------------------------------------------------------------

#[derive(serde::Serialize, serde::Deserialize)]
struct ErrorDto {
    code: String,
    phase: String,
    message: String,
    node_id: Option<i32>,
}

impl From<GraphError> for ErrorDto {
    fn from(e: GraphError) -> Self {
        ErrorDto {
            code: e.code().into(),
            phase: e.phase().to_string(),
            message: e.to_string(),
            node_id: e.node_id().map(|id| id.0),
        }
    }
}

#[derive(serde::Serialize, serde::Deserialize)]
#[serde(tag = "status")]
enum ResolveResult {
    #[serde(rename = "success")]
    Success { graph: serde_json::Value },
    #[serde(rename = "errors")]
    Errors { errors: Vec<ErrorDto> },
}
