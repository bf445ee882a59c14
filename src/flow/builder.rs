//! Node/edge builder: walk an instruction tree depth-first, left to right,
//! and lay it out as a column of nodes with block constructs fanning out to
//! the right.

use serde_json::Value;

use crate::document::{
    Conditions, DEFAULT_BRANCH, Instruction, InstructionPath, ListPath, Nested, Repeat,
};

use super::layout::Layout;
use super::types::*;

/// Handle ids on `repeat` nodes.
const LOOP_ENTRY: &str = "0";
const LOOP_BACK: &str = "1";
const LOOP_EXIT: &str = "2";

/// An outgoing connection waiting for the next node of the enclosing list.
#[derive(Debug, Clone)]
struct Exit {
    source: String,
    source_handle: Option<String>,
    kind: EdgeKind,
}

impl Exit {
    fn plain(source: &str) -> Self {
        Exit {
            source: source.to_string(),
            source_handle: None,
            kind: EdgeKind::Plain,
        }
    }

    /// Exit from a nested list back into its parent list.
    fn insert(source: &str, source_handle: Option<&str>) -> Self {
        Exit {
            source: source.to_string(),
            source_handle: source_handle.map(str::to_string),
            kind: EdgeKind::InstructionInsert,
        }
    }
}

/// A compiled instruction list.
#[derive(Debug, Clone)]
pub struct Column {
    pub first: String,
    pub last: String,
    /// `y` of the lowest node in the column, nested blocks included.
    pub bottom: f64,
}

pub struct FlowBuilder<'a> {
    layout: &'a Layout,
    pub nodes: Vec<FlowNode>,
    pub edges: Vec<FlowEdge>,
}

impl<'a> FlowBuilder<'a> {
    pub fn new(layout: &'a Layout) -> Self {
        FlowBuilder {
            layout,
            nodes: Vec::new(),
            edges: Vec::new(),
        }
    }

    pub fn into_graph(self) -> FlowGraph {
        FlowGraph {
            nodes: self.nodes,
            edges: self.edges,
        }
    }

    pub fn push_node(&mut self, id: String, kind: NodeKind, data: NodeData, position: Position) {
        self.nodes.push(FlowNode {
            id,
            kind,
            data,
            position,
        });
    }

    pub fn connect(
        &mut self,
        source: &str,
        target: &str,
        kind: EdgeKind,
        data: Option<EdgeData>,
        source_handle: Option<&str>,
        target_handle: Option<&str>,
    ) {
        self.edges.push(FlowEdge {
            id: edge_id(source, target, source_handle, target_handle),
            source: source.to_string(),
            target: target.to_string(),
            kind,
            data,
            source_handle: source_handle.map(str::to_string),
            target_handle: target_handle.map(str::to_string),
        });
    }

    /// Lay out `list` below `start`, interleaving a placeholder before,
    /// between and after every instruction. Item `k` of the interleaved
    /// sequence gets id `{parent_id}.{k}`. The caller wires the edge into
    /// `Column::first`; the column always ends on a placeholder.
    pub fn build_instructions(
        &mut self,
        list: &[Instruction],
        parent_id: &str,
        path: &ListPath,
        start: Position,
    ) -> Column {
        let x = start.x;
        let mut y = start.y;
        let mut pending: Vec<Exit> = Vec::new();
        let mut last = String::new();

        for k in 0..=(list.len() * 2) {
            let id = format!("{}.{}", parent_id, k);
            let index = k / 2;

            if k % 2 == 0 {
                y += self.layout.placeholder_height();
                self.push_node(
                    id.clone(),
                    NodeKind::Empty,
                    NodeData {
                        parent: Some(path.clone()),
                        index: Some(index),
                        with_button: true,
                        ..NodeData::default()
                    },
                    Position::new(x, y),
                );
                self.wire(&pending, &id, path, index);
                pending = vec![Exit::plain(&id)];
                last = id;
                continue;
            }

            y += self.layout.row_height;
            let instruction = &list[index];
            let position = Position::new(x, y);
            self.push_node(
                id.clone(),
                node_kind(instruction),
                NodeData {
                    label: Some(instruction.kind().to_string()),
                    value: Some(instruction.payload()),
                    parent: Some(path.clone()),
                    index: Some(index),
                    with_button: true,
                    endpoint: None,
                },
                position,
            );
            self.wire(&pending, &id, path, index);

            let at = path.at(index);
            pending = match instruction {
                Instruction::Conditions(conditions) => {
                    let (exits, bottom) = self.build_conditions(&id, &at, conditions, position);
                    y = y.max(bottom);
                    exits
                }
                Instruction::Repeat(repeat) => {
                    let (exits, bottom) = self.build_repeat(&id, &at, repeat, position);
                    y = y.max(bottom);
                    exits
                }
                Instruction::All(children) => self.build_all(&id, &at, children, position),
                _ => vec![Exit::plain(&id)],
            };
            last = id;
        }

        Column {
            first: format!("{}.0", parent_id),
            last,
            bottom: y,
        }
    }

    /// Connect every pending exit to `target`, the item at `index` of `path`.
    /// Exits leaving a nested list carry the slot they land on.
    fn wire(&mut self, pending: &[Exit], target: &str, path: &ListPath, index: usize) {
        for exit in pending {
            let data = match exit.kind {
                EdgeKind::InstructionInsert => Some(EdgeData::Insert {
                    parent: path.clone(),
                    index,
                }),
                _ => None,
            };
            self.connect(
                &exit.source,
                target,
                exit.kind,
                data,
                exit.source_handle.as_deref(),
                None,
            );
        }
    }

    /// One column per branch starting one row below the conditions node:
    /// expressions in stored order, then `default`, then the "add condition"
    /// column. Returns the branch exits and the tallest column's bottom.
    fn build_conditions(
        &mut self,
        id: &str,
        at: &InstructionPath,
        conditions: &Conditions,
        origin: Position,
    ) -> (Vec<Exit>, f64) {
        let mut keys: Vec<Option<&str>> = conditions.ordered_keys().into_iter().map(Some).collect();
        if conditions.branch(DEFAULT_BRANCH).is_none() {
            keys.push(Some(DEFAULT_BRANCH));
        }
        keys.push(None);

        let mut exits = Vec::new();
        let mut bottom = origin.y;

        for (column, key) in keys.into_iter().enumerate() {
            let column_id = format!("{}.{}", id, column);
            let start = Position::new(
                origin.x + column as f64 * self.layout.block_width,
                origin.y + self.layout.placeholder_height(),
            );

            let first = match key {
                Some(key) => {
                    let branch = conditions.branch(key).unwrap_or(&[]);
                    let branch_path = at.parent.child(at.index, Nested::Branch { key: key.to_string() });
                    let built = self.build_instructions(branch, &column_id, &branch_path, start);
                    exits.push(Exit::insert(&built.last, None));
                    bottom = bottom.max(built.bottom);
                    built.first
                }
                None => {
                    let add_id = format!("{}.0", column_id);
                    let y = start.y + self.layout.placeholder_height();
                    self.push_node(
                        add_id.clone(),
                        NodeKind::Empty,
                        NodeData::default(),
                        Position::new(start.x, y),
                    );
                    bottom = bottom.max(y);
                    add_id
                }
            };

            self.connect(
                id,
                &first,
                EdgeKind::ConditionBranch,
                Some(EdgeData::Condition {
                    label: key.map(str::to_string),
                    parent: at.clone(),
                    key: key.map(str::to_string),
                }),
                None,
                None,
            );
        }

        (exits, bottom)
    }

    /// Loop body one column to the right. Three edges: entry into the body,
    /// body back to the loop, and the fallthrough exit.
    fn build_repeat(
        &mut self,
        id: &str,
        at: &InstructionPath,
        repeat: &Repeat,
        origin: Position,
    ) -> (Vec<Exit>, f64) {
        let body_path = at.parent.child(at.index, Nested::Body);
        let start = Position::new(origin.x + self.layout.block_width, origin.y);
        let body = self.build_instructions(&repeat.body, &format!("{}.0", id), &body_path, start);

        self.connect(id, &body.first, EdgeKind::Plain, None, Some(LOOP_ENTRY), None);
        self.connect(&body.last, id, EdgeKind::Plain, None, None, Some(LOOP_BACK));

        (vec![Exit::insert(id, Some(LOOP_EXIT))], body.bottom)
    }

    /// Each parallel child is a single node to the right of the `all` node,
    /// plus a trailing "add" placeholder. Children fan in to the next slot.
    fn build_all(
        &mut self,
        id: &str,
        at: &InstructionPath,
        children: &[Instruction],
        origin: Position,
    ) -> Vec<Exit> {
        let all_path = at.parent.child(at.index, Nested::Parallel);
        let mut exits = Vec::new();

        for (i, child) in children.iter().enumerate() {
            let child_id = format!("{}.{}", id, i);
            self.push_node(
                child_id.clone(),
                NodeKind::AllChild,
                NodeData {
                    label: Some(child.kind().to_string()),
                    value: Some(child.payload()),
                    parent: Some(all_path.clone()),
                    index: Some(i),
                    with_button: true,
                    endpoint: None,
                },
                Position::new(origin.x + (i + 1) as f64 * self.layout.block_width, origin.y),
            );
            self.connect(id, &child_id, EdgeKind::Plain, None, None, None);
            exits.push(Exit::insert(&child_id, None));
        }

        let add_index = children.len();
        let add_id = format!("{}.{}", id, add_index);
        self.push_node(
            add_id.clone(),
            NodeKind::Empty,
            NodeData {
                parent: Some(all_path.clone()),
                index: Some(add_index),
                with_button: true,
                ..NodeData::default()
            },
            Position::new(
                origin.x + (add_index + 1) as f64 * self.layout.block_width,
                origin.y,
            ),
        );
        self.connect(
            id,
            &add_id,
            EdgeKind::InstructionInsert,
            Some(EdgeData::Insert {
                parent: all_path,
                index: add_index,
            }),
            None,
            None,
        );

        // Nothing runs in parallel: the flow continues from the block itself
        if exits.is_empty() {
            exits.push(Exit::plain(id));
        }
        exits
    }

    pub fn push_output(&mut self, from: &Column, root_len: usize, output: Option<&Value>) {
        let y = from.bottom + self.layout.placeholder_height();
        self.push_node(
            OUTPUT_ID.to_string(),
            NodeKind::Output,
            NodeData {
                label: Some("output".into()),
                value: output.cloned(),
                parent: Some(ListPath::root()),
                index: Some(root_len),
                ..NodeData::default()
            },
            Position::new(0.0, y),
        );
        self.connect(
            &from.last,
            OUTPUT_ID,
            EdgeKind::Plain,
            Some(EdgeData::Insert {
                parent: ListPath::root(),
                index: root_len,
            }),
            None,
            None,
        );
    }
}

pub const TRIGGER_ID: &str = "0";
pub const OUTPUT_ID: &str = "output";

fn node_kind(instruction: &Instruction) -> NodeKind {
    match instruction {
        Instruction::Conditions(_) => NodeKind::Conditions,
        Instruction::Repeat(_) => NodeKind::Repeat,
        Instruction::Emit(_)
        | Instruction::Wait(_)
        | Instruction::Set(_)
        | Instruction::Delete(_)
        | Instruction::All(_)
        | Instruction::Opaque { .. }
        | Instruction::Malformed(_) => NodeKind::Instruction,
    }
}

/// `{source}-{target}`, with `:{handle}` on whichever end has a handle.
pub fn edge_id(
    source: &str,
    target: &str,
    source_handle: Option<&str>,
    target_handle: Option<&str>,
) -> String {
    let source = match source_handle {
        Some(handle) => format!("{}:{}", source, handle),
        None => source.to_string(),
    };
    let target = match target_handle {
        Some(handle) => format!("{}:{}", target, handle),
        None => target.to_string(),
    };
    format!("{}-{}", source, target)
}
