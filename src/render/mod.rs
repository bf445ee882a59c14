//! View models for the flow editor's node and edge components.
//!
//! Each component reads a compiled node or edge plus the builder context and
//! decides what to show and which affordances to offer.

use serde::{Deserialize, Serialize};

use crate::context::BuilderContext;
use crate::document::{DEFAULT_BRANCH, InstructionPath, ListPath};
use crate::flow::{EdgeData, EdgeKind, FlowEdge, FlowNode, NodeKind};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeView {
    pub id: String,
    pub kind: NodeKind,
    pub title: String,
    /// Owning app, for instruction nodes.
    pub app: Option<String>,
    pub icon: Option<String>,
    pub subtitle: Option<String>,
    /// Offers an edit panel.
    pub editable: bool,
    /// Offers a delete button.
    pub removable: bool,
    /// Insertion slot behind a "+" button.
    pub insert_at: Option<(ListPath, usize)>,
}

impl NodeView {
    pub fn from_node(node: &FlowNode, ctx: &BuilderContext) -> Self {
        let data = &node.data;
        let mut view = NodeView {
            id: node.id.clone(),
            kind: node.kind,
            title: data.label.clone().unwrap_or_default(),
            app: None,
            icon: None,
            subtitle: None,
            editable: false,
            removable: false,
            insert_at: None,
        };

        match node.kind {
            NodeKind::Trigger => {
                view.editable = true;
                view.subtitle = data.endpoint.clone().or_else(|| trigger_summary(ctx));
            }
            NodeKind::Instruction | NodeKind::Conditions | NodeKind::Repeat | NodeKind::AllChild => {
                let kind = data.label.as_deref().unwrap_or_default();
                let app = ctx.get_app(kind);
                view.title = kind.to_string();
                view.app = Some(app.display_name);
                view.icon = app.icon;
                view.editable = ctx.is_editable(kind);
                view.removable = data.location().is_some();
            }
            NodeKind::Empty => {
                if data.with_button {
                    view.insert_at = data.parent.clone().zip(data.index);
                }
            }
            NodeKind::Output => {
                view.editable = true;
                view.insert_at = data.parent.clone().zip(data.index);
            }
        }

        view
    }
}

fn trigger_summary(ctx: &BuilderContext) -> Option<String> {
    let trigger = ctx.document().trigger.as_ref()?;
    let mut parts: Vec<String> = trigger.events().into_iter().map(str::to_string).collect();
    parts.extend(trigger.schedules().into_iter().map(|s| format!("every {}", s)));
    if parts.is_empty() { None } else { Some(parts.join(", ")) }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum EdgeAction {
    None,
    /// "+" button inserting into `parent` at `index`.
    Insert { parent: ListPath, index: usize },
    /// Clickable condition label. `key == None` adds a condition.
    Condition {
        at: InstructionPath,
        key: Option<String>,
        removable: bool,
    },
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EdgeView {
    pub id: String,
    pub label: Option<String>,
    pub action: EdgeAction,
}

impl EdgeView {
    pub fn from_edge(edge: &FlowEdge) -> Self {
        let (label, action) = match (&edge.kind, &edge.data) {
            (EdgeKind::ConditionBranch, Some(EdgeData::Condition { label, parent, key })) => (
                label.clone(),
                EdgeAction::Condition {
                    at: parent.clone(),
                    key: key.clone(),
                    removable: key.as_deref().is_some_and(|k| k != DEFAULT_BRANCH),
                },
            ),
            (_, Some(EdgeData::Insert { parent, index })) => (
                None,
                EdgeAction::Insert {
                    parent: parent.clone(),
                    index: *index,
                },
            ),
            _ => (None, EdgeAction::None),
        };
        EdgeView {
            id: edge.id.clone(),
            label,
            action,
        }
    }
}
