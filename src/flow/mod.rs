//! Flow compiler: AutomationDocument → FlowGraph.
//!
//! The graph is rebuilt from scratch on every document change. Compilation
//! never fails; malformed parts of the document degrade to generic nodes.

pub mod builder;
pub mod endpoint;
pub mod graph;
pub mod layout;
pub mod types;

pub use builder::{OUTPUT_ID, TRIGGER_ID};
pub use endpoint::{EndpointResolver, WorkspaceEndpoints};
pub use graph::FlowIndex;
pub use layout::{CompileOptions, Layout};
pub use types::*;

use tracing::debug;

use crate::document::{AutomationDocument, Endpoint, ListPath};
use builder::FlowBuilder;

/// Compile with the default layout and no endpoint resolution.
pub fn compile(doc: &AutomationDocument) -> FlowGraph {
    Compiler::default().compile(doc)
}

#[derive(Default)]
pub struct Compiler {
    layout: Layout,
    endpoints: Option<Box<dyn EndpointResolver>>,
    automation_slug: Option<String>,
}

impl Compiler {
    pub fn new(layout: Layout) -> Self {
        Compiler {
            layout,
            ..Compiler::default()
        }
    }

    pub fn with_endpoints(mut self, resolver: impl EndpointResolver + 'static) -> Self {
        self.endpoints = Some(Box::new(resolver));
        self
    }

    pub fn with_automation_slug(mut self, slug: impl Into<String>) -> Self {
        self.automation_slug = Some(slug.into());
        self
    }

    pub fn layout(&self) -> &Layout {
        &self.layout
    }

    pub fn compile(&self, doc: &AutomationDocument) -> FlowGraph {
        let mut builder = FlowBuilder::new(&self.layout);

        // 1. Trigger at the origin
        let origin = Position::default();
        builder.push_node(
            TRIGGER_ID.to_string(),
            NodeKind::Trigger,
            NodeData {
                label: Some("trigger".into()),
                value: doc.trigger.as_ref().map(|t| t.to_value()),
                endpoint: self.endpoint_url(doc),
                ..NodeData::default()
            },
            origin,
        );

        // 2. Root instruction list, whose first slot is always `0.0`
        let first = format!("{}.0", TRIGGER_ID);
        builder.connect(TRIGGER_ID, &first, EdgeKind::Plain, None, None, None);
        let root = builder.build_instructions(&doc.instructions, TRIGGER_ID, &ListPath::root(), origin);

        // 3. Terminal output
        builder.push_output(&root, doc.instructions.len(), doc.output.as_ref());

        let graph = builder.into_graph();
        debug!(
            nodes = graph.nodes.len(),
            edges = graph.edges.len(),
            "compiled automation flow"
        );
        graph
    }

    fn endpoint_url(&self, doc: &AutomationDocument) -> Option<String> {
        let resolver = self.endpoints.as_ref()?;
        let slug = match doc.trigger.as_ref()?.endpoint()? {
            Endpoint::Slug(slug) => slug,
            Endpoint::Enabled => doc
                .slug()
                .map(str::to_string)
                .or_else(|| self.automation_slug.clone())?,
        };
        Some(resolver.endpoint_url(&slug))
    }
}
