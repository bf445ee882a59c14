use flow_builder::context::{InstalledApp, SchemaRegistry, SiblingAutomation};
use flow_builder::document::*;
use flow_builder::flow::*;
use serde_json::{Value, json};

// =============================================================================
// Fixtures
// =============================================================================

pub const LINEAR: &str = include_str!("../fixtures/linear.json");
pub const BRANCHING: &str = include_str!("../fixtures/branching.json");
pub const NESTED: &str = include_str!("../fixtures/nested.json");
pub const MALFORMED: &str = include_str!("../fixtures/malformed.json");

pub fn load(json: &str) -> AutomationDocument {
    parse(json).expect("fixture should parse")
}

pub fn doc(value: Value) -> AutomationDocument {
    serde_json::from_value(value).expect("document should deserialize")
}

/// Round-trip a document back to the JSON the host form receives.
pub fn to_json(doc: &AutomationDocument) -> Value {
    serde_json::to_value(doc).expect("document should serialize")
}

// =============================================================================
// Instruction builders
// =============================================================================

pub fn emit(event: &str) -> Instruction {
    Instruction::from_value(json!({ "emit": { "event": event } }))
}

pub fn set(name: &str, value: Value) -> Instruction {
    Instruction::from_value(json!({ "set": { "name": name, "value": value } }))
}

// =============================================================================
// Paths
// =============================================================================

pub fn branch(index: usize, key: &str) -> ListPath {
    ListPath::root().child(index, Nested::Branch { key: key.into() })
}

pub fn body(index: usize) -> ListPath {
    ListPath::root().child(index, Nested::Body)
}

// =============================================================================
// Graph lookups
// =============================================================================

pub fn node<'a>(graph: &'a FlowGraph, id: &str) -> &'a FlowNode {
    graph
        .node(id)
        .unwrap_or_else(|| panic!("no node '{}' in {:?}", id, node_ids(graph)))
}

pub fn edge<'a>(graph: &'a FlowGraph, id: &str) -> &'a FlowEdge {
    graph
        .edge(id)
        .unwrap_or_else(|| panic!("no edge '{}' in {:?}", id, edge_ids(graph)))
}

pub fn node_ids(graph: &FlowGraph) -> Vec<&str> {
    graph.nodes.iter().map(|n| n.id.as_str()).collect()
}

pub fn edge_ids(graph: &FlowGraph) -> Vec<&str> {
    graph.edges.iter().map(|e| e.id.as_str()).collect()
}

pub fn at(graph: &FlowGraph, id: &str) -> (f64, f64) {
    let position = node(graph, id).position;
    (position.x, position.y)
}

// =============================================================================
// Registry
// =============================================================================

/// Workspace with two sibling automations and one installed app.
pub fn registry() -> SchemaRegistry {
    SchemaRegistry {
        workspace_name: Some("Shop".into()),
        ..SchemaRegistry::default()
    }
    .with_automations(vec![
        SiblingAutomation {
            slug: "sendInvoice".into(),
            name: Some("Send invoice".into()),
            description: None,
            arguments: Some(json!({ "orderId": { "type": "string" } })),
        },
        SiblingAutomation {
            slug: "route-orders".into(),
            name: Some("Route orders".into()),
            description: None,
            arguments: None,
        },
    ])
    .with_apps(vec![InstalledApp {
        slug: "crm".into(),
        display_name: Some("CRM".into()),
        icon: Some("https://cdn.example.com/crm.svg".into()),
        instructions: [(
            "createContact".to_string(),
            json!({
                "type": "object",
                "properties": { "email": { "type": "string" } }
            }),
        )]
        .into_iter()
        .collect(),
    }])
    .with_current_automation("route-orders")
}
