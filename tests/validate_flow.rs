#[allow(dead_code)]
mod helpers;

use flow_builder::error::Phase;
use flow_builder::flow::*;
use flow_builder::validate::validate_flow;
use helpers::*;

fn codes(graph: &FlowGraph) -> Vec<String> {
    validate_flow(graph).into_iter().map(|e| e.code).collect()
}

// =============================================================================
// Compiled fixtures are always valid
// =============================================================================

#[test]
fn test_compiled_fixtures_are_valid() {
    for (name, json) in [
        ("linear", LINEAR),
        ("branching", BRANCHING),
        ("nested", NESTED),
        ("malformed", MALFORMED),
    ] {
        let errors = validate_flow(&compile(&load(json)));
        assert!(errors.is_empty(), "{}: expected no errors, got: {:?}", name, errors);
    }
}

#[test]
fn test_graph_survives_json_round_trip() {
    let graph = compile(&load(NESTED));
    let json = serde_json::to_string(&graph).unwrap();
    let back: FlowGraph = serde_json::from_str(&json).unwrap();
    assert_eq!(back, graph);
    assert!(validate_flow(&back).is_empty());
}

// =============================================================================
// Broken graphs
// =============================================================================

#[test]
fn test_f001_duplicate_node_id() {
    let mut graph = compile(&load(LINEAR));
    let copy = node(&graph, "0.1").clone();
    graph.nodes.push(copy);

    let errors = validate_flow(&graph);
    assert_eq!(errors.len(), 1, "{:?}", errors);
    assert_eq!(errors[0].code, "F001");
    assert_eq!(errors[0].phase, Phase::Validate);
    assert_eq!(errors[0].node_id.as_deref(), Some("0.1"));
    assert_eq!(
        errors[0].to_string(),
        "[Validate:F001] Duplicate node id '0.1' (node '0.1')"
    );
}

#[test]
fn test_f002_dangling_edge() {
    let mut graph = compile(&load(LINEAR));
    graph.edges.push(FlowEdge {
        id: "0.4-ghost".into(),
        source: "0.4".into(),
        target: "ghost".into(),
        kind: EdgeKind::Plain,
        data: None,
        source_handle: None,
        target_handle: None,
    });

    assert_eq!(codes(&graph), vec!["F002"]);
}

#[test]
fn test_f003_second_trigger() {
    let mut graph = compile(&load(LINEAR));
    let mut extra = node(&graph, "0").clone();
    extra.id = "1".into();
    graph.nodes.push(extra);

    let codes = codes(&graph);
    assert!(codes.contains(&"F003".to_string()), "{:?}", codes);
}

#[test]
fn test_f004_unreachable_nodes() {
    let mut graph = compile(&load(LINEAR));
    graph.edges.retain(|e| e.id != "0.2-0.3");

    let errors = validate_flow(&graph);
    let unreachable: Vec<&str> = errors
        .iter()
        .filter(|e| e.code == "F004")
        .filter_map(|e| e.node_id.as_deref())
        .collect();
    assert_eq!(unreachable, vec!["0.3", "0.4", "output"]);
}

#[test]
fn test_f005_output_with_outgoing_edge() {
    let mut graph = compile(&load(LINEAR));
    graph.edges.push(FlowEdge {
        id: "output-0.0".into(),
        source: OUTPUT_ID.into(),
        target: "0.0".into(),
        kind: EdgeKind::Plain,
        data: None,
        source_handle: None,
        target_handle: None,
    });

    assert_eq!(codes(&graph), vec!["F005"]);
}

#[test]
fn test_f006_duplicate_edge_id() {
    let mut graph = compile(&load(LINEAR));
    let copy = edge(&graph, "0.1-0.2").clone();
    graph.edges.push(copy);

    assert_eq!(codes(&graph), vec!["F006"]);
}

#[test]
fn test_f007_broken_interleaving() {
    let mut graph = compile(&load(BRANCHING));
    if let Some(n) = graph.nodes.iter_mut().find(|n| n.id == "0.1.0.1") {
        n.kind = NodeKind::Empty;
    }
    if let Some(n) = graph.nodes.iter_mut().find(|n| n.id == "0.2") {
        n.data.index = Some(2);
    }

    let errors = validate_flow(&graph);
    let flagged: Vec<&str> = errors
        .iter()
        .filter(|e| e.code == "F007")
        .filter_map(|e| e.node_id.as_deref())
        .collect();
    assert_eq!(flagged, vec!["0.1.0.1", "0.2"]);
}

// =============================================================================
// Graph index
// =============================================================================

#[test]
fn test_flow_index_neighbours() {
    let graph = compile(&load(BRANCHING));
    let index = FlowIndex::build(&graph).unwrap();

    let mut successors: Vec<&str> = index.successors("0.1").into_iter().map(|(id, _)| id).collect();
    successors.sort();
    assert_eq!(successors, vec!["0.1.0.0", "0.1.1.0", "0.1.2.0"]);

    let mut predecessors = index.predecessors("0.2");
    predecessors.sort();
    assert_eq!(predecessors, vec!["0.1.0.2", "0.1.1.2"]);

    assert_eq!(index.incoming_count("0"), 0);
    assert_eq!(index.outgoing_count(OUTPUT_ID), 0);
    assert!(index.successors("nope").is_empty());
}
