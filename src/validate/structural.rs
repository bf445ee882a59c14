//! Flow-level structural rules (F001–F007).

use std::collections::HashSet;

use petgraph::visit::Bfs;

use crate::document::Nested;
use crate::error::BuilderError;
use crate::flow::{FlowGraph, FlowIndex, NodeKind};

/// Run all structural rules. Dangling edges (F002) are reported by
/// [`FlowIndex::build`].
pub fn validate_structural(flow: &FlowGraph, index: &FlowIndex) -> Vec<BuilderError> {
    let mut errors = Vec::new();

    f001_unique_node_ids(flow, &mut errors);
    f003_single_trigger_root(flow, index, &mut errors);
    f004_all_reachable_from_trigger(flow, index, &mut errors);
    f005_single_output_sink(flow, index, &mut errors);
    f006_unique_edge_ids(flow, &mut errors);
    f007_placeholders_interleaved(flow, &mut errors);

    errors
}

fn f001_unique_node_ids(flow: &FlowGraph, errors: &mut Vec<BuilderError>) {
    let mut seen = HashSet::new();
    for node in &flow.nodes {
        if !seen.insert(node.id.as_str()) {
            errors.push(BuilderError::validate(
                "F001",
                format!("Duplicate node id '{}'", node.id),
                Some(node.id.clone()),
            ));
        }
    }
}

fn f003_single_trigger_root(flow: &FlowGraph, index: &FlowIndex, errors: &mut Vec<BuilderError>) {
    let triggers: Vec<_> = flow.nodes_of_kind(NodeKind::Trigger).collect();
    if triggers.len() != 1 {
        errors.push(BuilderError::validate(
            "F003",
            format!("Flow must have exactly 1 trigger node, found {}", triggers.len()),
            None,
        ));
    }
    for trigger in triggers {
        if index.incoming_count(&trigger.id) > 0 {
            errors.push(BuilderError::validate(
                "F003",
                "Trigger node must not have incoming edges",
                Some(trigger.id.clone()),
            ));
        }
    }
}

fn f004_all_reachable_from_trigger(
    flow: &FlowGraph,
    index: &FlowIndex,
    errors: &mut Vec<BuilderError>,
) {
    let Some(trigger) = flow.nodes_of_kind(NodeKind::Trigger).next() else {
        return;
    };
    let Some(&trigger_idx) = index.node_indices.get(&trigger.id) else {
        return;
    };

    let mut reachable = HashSet::new();
    let mut bfs = Bfs::new(&index.graph, trigger_idx);
    while let Some(idx) = bfs.next(&index.graph) {
        reachable.insert(index.graph[idx].clone());
    }

    for node in &flow.nodes {
        if !reachable.contains(&node.id) {
            errors.push(BuilderError::validate(
                "F004",
                format!("Node '{}' is not reachable from the trigger", node.id),
                Some(node.id.clone()),
            ));
        }
    }
}

fn f005_single_output_sink(flow: &FlowGraph, index: &FlowIndex, errors: &mut Vec<BuilderError>) {
    let outputs: Vec<_> = flow.nodes_of_kind(NodeKind::Output).collect();
    if outputs.len() != 1 {
        errors.push(BuilderError::validate(
            "F005",
            format!("Flow must have exactly 1 output node, found {}", outputs.len()),
            None,
        ));
    }
    for output in outputs {
        if index.outgoing_count(&output.id) > 0 {
            errors.push(BuilderError::validate(
                "F005",
                "Output node must not have outgoing edges",
                Some(output.id.clone()),
            ));
        }
    }
}

fn f006_unique_edge_ids(flow: &FlowGraph, errors: &mut Vec<BuilderError>) {
    let mut seen = HashSet::new();
    for edge in &flow.edges {
        if !seen.insert(edge.id.as_str()) {
            errors.push(BuilderError::validate(
                "F006",
                format!("Duplicate edge id '{}'", edge.id),
                None,
            ));
        }
    }
}

/// In every instruction column, even positions are placeholders and odd
/// positions are instructions, and `index` is the position halved.
fn f007_placeholders_interleaved(flow: &FlowGraph, errors: &mut Vec<BuilderError>) {
    for node in &flow.nodes {
        let is_list_item = matches!(
            node.kind,
            NodeKind::Empty | NodeKind::Instruction | NodeKind::Conditions | NodeKind::Repeat
        );
        let Some(parent) = node.data.parent.as_ref() else {
            continue;
        };
        let in_parallel = parent
            .0
            .last()
            .is_some_and(|step| step.into == Nested::Parallel);
        if !is_list_item || in_parallel {
            continue;
        }
        let Some(position) = node.id.rsplit('.').next().and_then(|s| s.parse::<usize>().ok()) else {
            continue;
        };

        let expects_placeholder = position % 2 == 0;
        if expects_placeholder != (node.kind == NodeKind::Empty) || node.data.index != Some(position / 2) {
            errors.push(BuilderError::validate(
                "F007",
                format!(
                    "Node '{}' breaks placeholder interleaving (position {}, index {:?})",
                    node.id, position, node.data.index
                ),
                Some(node.id.clone()),
            ));
        }
    }
}
