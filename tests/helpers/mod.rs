use compute_graph::ir::*;

// =============================================================================
// Node builders
// =============================================================================

pub fn context(id: i32, column: &str) -> AnyNode {
    DataSource::context(id, column).into()
}

/// UPDATE source keyed by the given context nodes.
pub fn keyed_source(id: i32, path: &str, key: &[i32]) -> AnyNode {
    AnyNode::from(DataSource::update(id, path, "memberId"))
        .with_concrete_key(ConcreteKey::new(key.iter().copied()))
}

pub fn event_source(id: i32, path: &str, key: &[i32]) -> AnyNode {
    AnyNode::from(DataSource::event(
        id,
        path,
        "memberId",
        TimestampCol {
            expression: "timestamp".into(),
            format: "epoch_millis".into(),
        },
    ))
    .with_concrete_key(ConcreteKey::new(key.iter().copied()))
}

/// Transformation over identity-keyed single-slot inputs.
pub fn transform(id: i32, name: &str, inputs: &[i32]) -> AnyNode {
    Transformation::new(
        id,
        name,
        inputs.iter().map(|&i| NodeReference::new(i, [0])).collect(),
        TransformationFunction::new("feathr_mvel").with_parameter("expression", "x * 2"),
    )
    .into()
}

pub fn keyed_transform(id: i32, name: &str, inputs: &[i32], key: &[i32]) -> AnyNode {
    transform(id, name, inputs).with_concrete_key(ConcreteKey::new(key.iter().copied()))
}

pub fn sum_over(id: i32, name: &str, input: i32, key: &[i32]) -> AnyNode {
    AnyNode::from(Aggregation::new(
        id,
        name,
        NodeReference::new(input, [0]),
        AggregationFunction::new("SUM")
            .with_parameter("target_column", "clicks")
            .with_parameter("window_size", "7d"),
    ))
    .with_concrete_key(ConcreteKey::new(key.iter().copied()))
}

pub fn external(id: i32, name: &str) -> AnyNode {
    External::new(id, name).into()
}

// =============================================================================
// Graph builders
// =============================================================================

/// Graph from nodes, indexing every feature node under its declared name.
pub fn graph_of(nodes: Vec<AnyNode>) -> ComputeGraph {
    let mut graph = ComputeGraph::new();
    for node in nodes {
        let indexed = node.feature_name().map(|n| (n.to_string(), node.id()));
        graph.insert(node).expect("unique node ids");
        if let Some((name, id)) = indexed {
            graph.index_feature(name, id).expect("unique feature names");
        }
    }
    graph
}

/// memberId context → keyed profile source → aggregation → transformation.
pub fn member_features() -> ComputeGraph {
    graph_of(vec![
        context(1, "memberId"),
        event_source(2, "abfss://data/clicks", &[1]),
        sum_over(3, "f_click_sum", 2, &[1]),
        keyed_transform(4, "f_click_sum_x2", &[3], &[1]),
    ])
}
