//! petgraph-based index over a compiled flow graph.

use std::collections::HashMap;

use petgraph::Direction;
use petgraph::graph::{DiGraph, NodeIndex};
use petgraph::visit::EdgeRef;

use super::types::{EdgeKind, FlowGraph};
use crate::error::BuilderError;

pub struct FlowIndex {
    pub graph: DiGraph<String, EdgeKind>,
    pub node_indices: HashMap<String, NodeIndex>,
}

impl FlowIndex {
    /// Index every node and edge. Edges pointing at unknown nodes are errors.
    pub fn build(flow: &FlowGraph) -> Result<Self, Vec<BuilderError>> {
        let mut graph = DiGraph::new();
        let mut node_indices = HashMap::new();
        let mut errors = Vec::new();

        for node in &flow.nodes {
            let idx = graph.add_node(node.id.clone());
            node_indices.entry(node.id.clone()).or_insert(idx);
        }

        for edge in &flow.edges {
            match (node_indices.get(&edge.source), node_indices.get(&edge.target)) {
                (Some(&s), Some(&t)) => {
                    graph.add_edge(s, t, edge.kind);
                }
                (None, _) => errors.push(BuilderError::validate(
                    "F002",
                    format!("Edge '{}' references unknown source node '{}'", edge.id, edge.source),
                    None,
                )),
                (_, None) => errors.push(BuilderError::validate(
                    "F002",
                    format!("Edge '{}' references unknown target node '{}'", edge.id, edge.target),
                    None,
                )),
            }
        }

        if !errors.is_empty() {
            return Err(errors);
        }

        Ok(FlowIndex { graph, node_indices })
    }

    pub fn successors(&self, node_id: &str) -> Vec<(&str, EdgeKind)> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Outgoing)
            .map(|e| (self.graph[e.target()].as_str(), *e.weight()))
            .collect()
    }

    pub fn predecessors(&self, node_id: &str) -> Vec<&str> {
        let Some(&idx) = self.node_indices.get(node_id) else {
            return vec![];
        };
        self.graph
            .edges_directed(idx, Direction::Incoming)
            .map(|e| self.graph[e.source()].as_str())
            .collect()
    }

    pub fn incoming_count(&self, node_id: &str) -> usize {
        self.predecessors(node_id).len()
    }

    pub fn outgoing_count(&self, node_id: &str) -> usize {
        self.successors(node_id).len()
    }
}
